use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use nvsmi_collect::config::AppConfig;
use nvsmi_collect::core::{PluginHost, UpdateManager};
use nvsmi_core::{ConfigItem, Registry};
use nvsmi_plugins::nvsmi::catalog;
use nvsmi_plugins::NvsmiPlugin;
use std::path::PathBuf;

/// nvsmi-collect - GPU metrics from nvidia-smi as labeled metric samples
#[derive(Parser, Debug)]
#[command(name = "nvsmi-collect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(
        short = 'd',
        long = "debug",
        value_name = "LEVEL",
        default_value = "0",
        global = true
    )]
    debug: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read and dispatch samples at the configured interval (default)
    Run {
        /// Run a single read cycle and exit
        #[arg(long)]
        once: bool,

        /// Override the configured interval
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,

        /// Log every dispatched sample
        #[arg(long)]
        write_info: bool,
    },

    /// Query the tool once and print the parsed values as JSON
    Query {
        /// nvidia-smi binary
        #[arg(long, value_name = "PATH")]
        bin: Option<PathBuf>,

        /// Field identifying each device
        #[arg(long, value_name = "FIELD")]
        id_query: Option<String>,

        /// Converter for the identity field, or "none"
        #[arg(long, value_name = "NAME")]
        id_converter: Option<String>,

        /// Fields to query
        #[arg(value_name = "FIELD", required = true)]
        fields: Vec<String>,
    },

    /// List the fields with known conversions and metric types
    Fields,

    /// Write an example configuration file
    InitConfig {
        /// Destination (defaults to the platform config directory)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info, also makes write_info output visible
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Command::Run {
        once: false,
        interval_ms: None,
        write_info: false,
    });

    match command {
        Command::Run {
            once,
            interval_ms,
            write_info,
        } => {
            let mut config = load_config(cli.config.as_ref())?;
            if let Some(ms) = interval_ms {
                config.interval_ms = ms;
            }
            config.write_info |= write_info;
            run_collector(config, once)
        }
        Command::Query {
            bin,
            id_query,
            id_converter,
            fields,
        } => query_once(bin, id_query, id_converter, fields),
        Command::Fields => {
            list_fields();
            Ok(())
        }
        Command::InitConfig { path, force } => init_config(path, force),
    }
}

/// Load configuration from the given file, or from the default location
fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let config = AppConfig::load_from_path(path)?;
            info!("Loaded configuration from: {}", path.display());
            Ok(config)
        }
        None => {
            let config = AppConfig::load()?;
            if config.plugins.is_empty() {
                warn!(
                    "No plugins configured (run `nvsmi-collect init-config` to create {})",
                    AppConfig::config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "a configuration".to_string())
                );
            }
            Ok(config)
        }
    }
}

fn run_collector(config: AppConfig, once: bool) -> Result<()> {
    warn!("Starting nvsmi-collect v{}", env!("CARGO_PKG_VERSION"));

    let mut registry = Registry::new();
    nvsmi_plugins::register_all(&mut registry);

    let host = PluginHost::from_config(&registry, &config)?;
    info!("Dispatching samples as host {}", host.hostname());
    let manager = UpdateManager::new(host, config.interval());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let result = runtime.block_on(async {
        if once {
            let summary = manager.run_once().await?;
            info!(
                "Dispatched {} sample(s) from {} plugin(s)",
                summary.dispatched, summary.plugins
            );
            if !summary.failed.is_empty() {
                bail!("read failed for: {}", summary.failed.join(", "));
            }
            Ok(())
        } else {
            manager.run().await
        }
    });

    // An interrupted cycle may still be blocked on the tool
    runtime.shutdown_background();
    result
}

fn query_once(
    bin: Option<PathBuf>,
    id_query: Option<String>,
    id_converter: Option<String>,
    fields: Vec<String>,
) -> Result<()> {
    let mut items = Vec::new();
    if let Some(bin) = bin {
        items.push(ConfigItem::new("bin", [bin.to_string_lossy().into_owned()]));
    }
    if let Some(field) = id_query {
        items.push(ConfigItem::new("idquery", [field]));
    }
    if let Some(name) = id_converter {
        items.push(ConfigItem::new("idconverter", [name]));
    }
    items.push(ConfigItem::new("querygpu", fields));

    let mut plugin = NvsmiPlugin::new();
    plugin.apply(&items)?;
    let reading = plugin.query()?;

    println!("{}", serde_json::to_string_pretty(&reading)?);
    Ok(())
}

fn list_fields() {
    println!("{:<52} {:<12} {}", "FIELD", "CONVERTER", "TYPE");
    for field in catalog::fields() {
        println!(
            "{:<52} {:<12} {}",
            field.id,
            field.converter.as_deref().unwrap_or("-"),
            field.metric_type
        );
    }
    println!();
    println!("Other fields are queried unconverted and published as gauge.");
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => AppConfig::config_path()?,
    };

    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::example().save_to_path(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
