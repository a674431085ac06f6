//! Plugin host: configures plugins and fans dispatched samples out to writers

use crate::config::AppConfig;
use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, error, info, warn};
use nvsmi_core::{BoxedReadPlugin, BoxedWritePlugin, Dispatcher, Registry, Sample};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Name used when neither the config nor the system provides a host name
const FALLBACK_HOSTNAME: &str = "localhost";

/// Result of one read cycle over all plugins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Number of read plugins that ran
    pub plugins: usize,
    /// Names of the plugins whose read failed
    pub failed: Vec<String>,
    /// Samples dispatched during the cycle
    pub dispatched: usize,
}

/// Owns the configured plugins for the lifetime of the process
pub struct PluginHost {
    reads: Vec<BoxedReadPlugin>,
    writers: Vec<BoxedWritePlugin>,
    hostname: String,
    dispatched: AtomicUsize,
}

impl PluginHost {
    /// Create a host with no plugins
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            reads: Vec::new(),
            writers: Vec::new(),
            hostname: hostname.into(),
            dispatched: AtomicUsize::new(0),
        }
    }

    /// Create and configure every plugin named in `config`
    ///
    /// Blocks naming an unregistered plugin are logged and skipped. A plugin
    /// rejecting its configuration is fatal.
    pub fn from_config(registry: &Registry, config: &AppConfig) -> Result<Self> {
        let hostname = config
            .hostname
            .clone()
            .or_else(sysinfo::System::host_name)
            .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string());
        let mut host = Self::new(hostname);

        for block in &config.plugins {
            if !registry.has_read(&block.name) {
                warn!("Unknown plugin \"{}\" in configuration. Ignoring.", block.name);
                continue;
            }

            let mut plugin = registry.create_read(&block.name)?;
            plugin
                .configure(&block.children)
                .with_context(|| format!("Failed to configure plugin {}", block.name))?;
            info!("Loaded plugin {}", plugin.metadata().name);
            host.add_read(plugin);
        }

        if config.write_info {
            host.add_writer(registry.create_write("write_info")?);
        }

        Ok(host)
    }

    pub fn add_read(&mut self, plugin: BoxedReadPlugin) {
        self.reads.push(plugin);
    }

    pub fn add_writer(&mut self, writer: BoxedWritePlugin) {
        self.writers.push(writer);
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn read_plugin_count(&self) -> usize {
        self.reads.len()
    }

    /// Run every read plugin once, in load order
    ///
    /// A failing plugin is logged and does not stop the others.
    pub fn read_all(&self) -> CycleSummary {
        let before = self.dispatched.load(Ordering::SeqCst);
        let mut summary = CycleSummary {
            plugins: self.reads.len(),
            ..CycleSummary::default()
        };

        for plugin in &self.reads {
            let name = &plugin.metadata().name;
            match plugin.read(self) {
                Ok(()) => debug!("{}: read complete", name),
                Err(e) => {
                    error!("{}: read failed: {:#}", name, e);
                    summary.failed.push(name.clone());
                }
            }
        }

        summary.dispatched = self.dispatched.load(Ordering::SeqCst) - before;
        summary
    }
}

impl Dispatcher for PluginHost {
    fn dispatch(&self, mut sample: Sample) -> Result<()> {
        if sample.host.is_empty() {
            sample.host = self.hostname.clone();
        }
        if sample.time.is_none() {
            sample.time = Some(Utc::now());
        }

        for writer in &self.writers {
            if let Err(e) = writer.write(&sample) {
                error!(
                    "{}: failed to write {}: {:#}",
                    writer.metadata().name,
                    sample.identifier(),
                    e
                );
            }
        }

        self.dispatched.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
