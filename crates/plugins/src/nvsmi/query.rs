//! Query nvidia-smi and parse its CSV output into per-device readings

use super::error::{NvsmiError, Result};
use super::resolver::{FieldSpec, IdentitySpec, ResolvedConfig};
use log::{debug, trace, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Stdio};

/// Output format requested from the tool
pub const FORMAT_ARG: &str = "--format=csv,noheader,nounits";

/// Captured result of one subprocess run
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    /// Human-readable exit status, e.g. "exit status: 9"
    pub status: String,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Runs the external tool
///
/// The real implementation spawns a process; tests substitute canned output.
pub trait CommandRunner: Send + Sync {
    /// Run `bin` with `args`, blocking until it exits
    fn run(&self, bin: &Path, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// Runs the tool as a child process
///
/// There is no timeout: a hung tool hangs the read cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, bin: &Path, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = Command::new(bin)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Values of one read cycle, keyed by device identity
///
/// Each value list is aligned with the configured field list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reading {
    devices: HashMap<String, Vec<String>>,
}

impl Reading {
    pub fn get(&self, device: &str) -> Option<&[String]> {
        self.devices.get(device).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.devices.iter()
    }

    pub fn into_inner(self) -> HashMap<String, Vec<String>> {
        self.devices
    }
}

/// Build the tool's argument list: identity field first, then every field
pub fn build_args(identity_field: &str, fields: &[FieldSpec]) -> Vec<String> {
    let query: Vec<&str> = std::iter::once(identity_field)
        .chain(fields.iter().map(|f| f.name.as_str()))
        .collect();

    vec![format!("--query-gpu={}", query.join(",")), FORMAT_ARG.to_string()]
}

/// Run one query and parse its output
pub fn query_gpu(runner: &dyn CommandRunner, config: &ResolvedConfig) -> Result<Reading> {
    let args = build_args(&config.identity().field, config.fields());
    debug!("running {} {}", config.bin().display(), args.join(" "));

    let output = runner
        .run(config.bin(), &args)
        .map_err(|source| NvsmiError::Launch {
            bin: config.bin().to_path_buf(),
            source,
        })?;

    if !output.success {
        return Err(NvsmiError::Subprocess {
            bin: config.bin().to_path_buf(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| NvsmiError::OutputValidation(format!("output is not UTF-8: {}", e)))?;
    trace!("raw output: {:?}", stdout);

    if config.identity().is_hex() {
        check_hex_prefix(&stdout)?;
    }

    parse_output(&stdout, config.identity(), config.fields())
}

/// Reject output whose lines do not each start with a hex numeral
///
/// A cheap guard against garbled or partial output when the identity is the
/// PCI bus. Only meaningful for hex identities.
pub fn check_hex_prefix(output: &str) -> Result<()> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    if lines.peek().is_none() {
        return Err(NvsmiError::OutputValidation(
            "expected a hex device id, got empty output".to_string(),
        ));
    }

    for line in lines {
        let first = line.split(',').next().unwrap_or_default().trim();
        let digits = first
            .strip_prefix("0x")
            .or_else(|| first.strip_prefix("0X"))
            .unwrap_or(first);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(NvsmiError::OutputValidation(format!(
                "expected a hex device id at the start of {:?}",
                line
            )));
        }
    }
    Ok(())
}

/// Parse CSV output into a Reading
///
/// One non-empty line per device; values are comma separated with optional
/// surrounding whitespace. If two lines yield the same identity the later
/// one replaces the earlier.
pub fn parse_output(
    output: &str,
    identity: &IdentitySpec,
    fields: &[FieldSpec],
) -> Result<Reading> {
    let mut devices = HashMap::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut values = line.split(',').map(str::trim);

        // split always yields at least one item
        let raw_id = values.next().unwrap_or_default();
        let device_id = match identity.converter {
            Some(converter) => converter.apply(raw_id)?,
            None => raw_id.to_string(),
        };

        let values: Vec<&str> = values.collect();
        if values.len() != fields.len() {
            return Err(NvsmiError::OutputValidation(format!(
                "device {} has {} values for {} fields: {:?}",
                device_id,
                values.len(),
                fields.len(),
                line
            )));
        }

        let converted = fields
            .iter()
            .zip(values)
            .map(|(field, raw)| match field.converter {
                Some(converter) => converter.apply(raw),
                None => Ok(raw.to_string()),
            })
            .collect::<Result<Vec<String>>>()?;

        if devices.insert(device_id.clone(), converted).is_some() {
            warn!(
                "device id {} ({}) appears more than once, keeping the last line",
                device_id, identity.field
            );
        }
    }

    Ok(Reading { devices })
}
