//! Errors and warnings raised by the nvsmi plugin

use std::path::PathBuf;
use thiserror::Error;

/// Failure of one stage of the query/parse/emit pipeline
///
/// Every variant aborts the read cycle it was raised in.
#[derive(Error, Debug)]
pub enum NvsmiError {
    #[error("unknown converter: {0}")]
    UnknownConverter(String),

    #[error("converter {converter} cannot handle value {raw:?}")]
    MalformedInput {
        converter: &'static str,
        raw: String,
    },

    #[error("failed to launch {}: {source}", bin.display())]
    Launch {
        bin: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}: {stderr}", bin.display())]
    Subprocess {
        bin: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("unexpected output: {0}")]
    OutputValidation(String),

    #[error("failed to dispatch sample: {0}")]
    Dispatch(String),
}

impl NvsmiError {
    /// True for errors caused by the tool failing to run or exiting badly
    pub fn is_subprocess(&self) -> bool {
        matches!(self, NvsmiError::Launch { .. } | NvsmiError::Subprocess { .. })
    }
}

pub type Result<T> = std::result::Result<T, NvsmiError>;

/// Non-fatal problems found while resolving the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The configured binary does not exist; reads will fail until it does
    MissingBinary(PathBuf),
    /// No fields configured; reads are skipped
    EmptyFieldList,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingBinary(bin) => {
                write!(f, "the path ({}) provided for bin does not exist", bin.display())
            }
            ConfigWarning::EmptyFieldList => write!(f, "no fields configured with querygpu"),
        }
    }
}
