//! Resolve the configured query list into per-field conversion and type info

use super::catalog;
use super::converter::Converter;
use super::error::ConfigWarning;
use nvsmi_types::MetricType;
use std::path::{Path, PathBuf};

/// Default tool binary, looked up on `PATH`
pub const DEFAULT_BIN: &str = "nvidia-smi";

/// Default identity field
///
/// Enumeration order is not guaranteed to be stable across reboots, the PCI
/// bus id is.
pub const DEFAULT_ID_FIELD: &str = "pci.bus";

/// One configured field with its conversion and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub converter: Option<Converter>,
    pub metric_type: MetricType,
}

impl FieldSpec {
    /// Build the spec for `name` from the field catalog
    pub fn from_catalog(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            converter: catalog::converter_for(&name),
            metric_type: catalog::metric_type_for(&name),
            name,
        }
    }
}

/// How each output line's first column becomes a device identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySpec {
    /// Field queried first to identify the device
    pub field: String,
    /// Converter applied to the raw identity, `None` leaves it as printed
    pub converter: Option<Converter>,
}

impl IdentitySpec {
    /// True when the identity is a hex numeral converted to decimal, which is
    /// the only configuration the output prefix check understands
    pub fn is_hex(&self) -> bool {
        self.converter == Some(Converter::HexToDecimal)
            && catalog::converter_for(&self.field) == Some(Converter::HexToDecimal)
    }
}

impl Default for IdentitySpec {
    fn default() -> Self {
        Self {
            field: DEFAULT_ID_FIELD.to_string(),
            converter: Some(Converter::HexToDecimal),
        }
    }
}

/// Immutable configuration consumed by every read cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    bin: PathBuf,
    fields: Vec<FieldSpec>,
    identity: IdentitySpec,
}

impl ResolvedConfig {
    /// Resolve `query_list` against the field catalog
    ///
    /// Field order is preserved: it is the column order of the tool's output.
    pub fn resolve<I, S>(
        bin: impl Into<PathBuf>,
        query_list: I,
        identity: IdentitySpec,
    ) -> (Self, Vec<ConfigWarning>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bin = bin.into();
        let fields: Vec<FieldSpec> = query_list.into_iter().map(FieldSpec::from_catalog).collect();

        let mut warnings = Vec::new();
        if !binary_exists(&bin) {
            warnings.push(ConfigWarning::MissingBinary(bin.clone()));
        }
        if fields.is_empty() {
            warnings.push(ConfigWarning::EmptyFieldList);
        }

        (
            Self {
                bin,
                fields,
                identity,
            },
            warnings,
        )
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn identity(&self) -> &IdentitySpec {
        &self.identity
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names, in query order
    pub fn query_list(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Metric types, parallel to `query_list`
    pub fn type_list(&self) -> Vec<MetricType> {
        self.fields.iter().map(|f| f.metric_type).collect()
    }

    /// Converters, parallel to `query_list`
    pub fn converters(&self) -> Vec<Option<Converter>> {
        self.fields.iter().map(|f| f.converter).collect()
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            bin: PathBuf::from(DEFAULT_BIN),
            fields: Vec::new(),
            identity: IdentitySpec::default(),
        }
    }
}

/// Check that `bin` names an existing file
///
/// A bare command name is searched for on `PATH`, the way the subprocess
/// launch will resolve it.
fn binary_exists(bin: &Path) -> bool {
    if bin.components().count() > 1 || bin.is_absolute() {
        return bin.is_file();
    }

    match std::env::var_os("PATH") {
        Some(paths) => std::env::split_paths(&paths).any(|dir| dir.join(bin).is_file()),
        None => false,
    }
}
