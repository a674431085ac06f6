//! nvidia-smi read plugin
//!
//! Each read cycle runs `nvidia-smi --query-gpu=...` once, normalizes the
//! values of every device and dispatches one sample per (device, field).
//!
//! Configuration block declarations:
//! - `bin <path>`: tool binary, defaults to `nvidia-smi` on `PATH`
//! - `querygpu <field> [<field> ...]`: fields to query, may be repeated
//! - `idquery <field>`: field identifying each device, defaults to `pci.bus`
//! - `idconverter <name>`: converter for the identity, `none` to disable

pub mod catalog;
pub mod converter;
pub mod emitter;
pub mod error;
pub mod query;
pub mod resolver;

pub use converter::Converter;
pub use emitter::{emit, PLUGIN_NAME};
pub use error::{ConfigWarning, NvsmiError};
pub use query::{query_gpu, CommandOutput, CommandRunner, ProcessRunner, Reading};
pub use resolver::{FieldSpec, IdentitySpec, ResolvedConfig, DEFAULT_BIN, DEFAULT_ID_FIELD};

use anyhow::{anyhow, Result};
use log::{info, warn};
use nvsmi_core::{ConfigItem, Dispatcher, PluginMetadata, ReadPlugin};
use std::path::PathBuf;

/// What a read cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Nothing configured, the tool was not run
    Skipped,
    /// The tool ran and this many samples were dispatched
    Emitted(usize),
}

/// The nvidia-smi read plugin
pub struct NvsmiPlugin {
    metadata: PluginMetadata,
    config: ResolvedConfig,
    runner: Box<dyn CommandRunner>,
}

impl NvsmiPlugin {
    pub fn new() -> Self {
        Self::with_runner(Box::new(ProcessRunner))
    }

    /// Create the plugin with a custom way of running the tool
    pub fn with_runner(runner: Box<dyn CommandRunner>) -> Self {
        Self {
            metadata: PluginMetadata {
                name: PLUGIN_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: "GPU metrics from nvidia-smi --query-gpu".to_string(),
            },
            config: ResolvedConfig::default(),
            runner,
        }
    }

    /// Current resolved configuration
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Resolve a new configuration from block declarations
    ///
    /// Returns the non-fatal warnings found, after logging them.
    pub fn apply(&mut self, items: &[ConfigItem]) -> Result<Vec<ConfigWarning>> {
        let mut bin = PathBuf::from(DEFAULT_BIN);
        let mut query_list: Vec<String> = Vec::new();
        let mut identity = IdentitySpec::default();

        for item in items {
            if item.is("bin") {
                bin = PathBuf::from(required_value(item)?);
            } else if item.is("querygpu") {
                query_list.extend(item.values.iter().cloned());
            } else if item.is("idquery") {
                identity.field = required_value(item)?.to_string();
            } else if item.is("idconverter") {
                let name = required_value(item)?;
                identity.converter = if name.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(Converter::from_name(name)?)
                };
            } else {
                info!("{}: Unknown config key \"{}\". Ignoring.", PLUGIN_NAME, item.key);
            }
        }

        let (config, warnings) = ResolvedConfig::resolve(bin, query_list, identity);
        for warning in &warnings {
            warn!("{}: {}", PLUGIN_NAME, warning);
        }

        info!("{}: bin: {}", PLUGIN_NAME, config.bin().display());
        info!("{}: query_list: {}", PLUGIN_NAME, config.query_list().join(","));
        info!(
            "{}: type_list: {}",
            PLUGIN_NAME,
            config
                .type_list()
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );

        self.config = config;
        Ok(warnings)
    }

    /// Run the tool once and return the parsed reading without dispatching
    pub fn query(&self) -> std::result::Result<Reading, NvsmiError> {
        query_gpu(self.runner.as_ref(), &self.config)
    }

    /// Run one full cycle: query, then emit
    ///
    /// Nothing is dispatched unless the whole query succeeded.
    pub fn read_cycle(
        &self,
        dispatcher: &dyn Dispatcher,
    ) -> std::result::Result<ReadOutcome, NvsmiError> {
        if self.config.is_empty() {
            // The host's log may not be set up to show this; say it on stderr
            eprintln!("{}: Nothing to query with.", PLUGIN_NAME);
            return Ok(ReadOutcome::Skipped);
        }

        let reading = self.query()?;
        let dispatched = emit(&reading, &self.config, dispatcher)?;
        Ok(ReadOutcome::Emitted(dispatched))
    }
}

impl Default for NvsmiPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadPlugin for NvsmiPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn configure(&mut self, items: &[ConfigItem]) -> Result<()> {
        self.apply(items).map(|_| ())
    }

    fn read(&self, dispatcher: &dyn Dispatcher) -> Result<()> {
        self.read_cycle(dispatcher)?;
        Ok(())
    }
}

fn required_value(item: &ConfigItem) -> Result<&str> {
    item.first_value()
        .ok_or_else(|| anyhow!("{}: {} requires a value", PLUGIN_NAME, item.key))
}
