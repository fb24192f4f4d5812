use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gsrest::{Repository, RepositoryConfig, ResourceConfig, ResourceKind, StyleScope};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Overrides `--log-level` with a full filter, e.g. `gsrest=debug,reqwest=trace`
const LOG_FILTER_ENV: &str = "GSREST_LOG";

/// Manage GeoServer resources over REST
#[derive(Parser, Debug)]
#[command(name = "gsrest", version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

/// Identifies one resource
#[derive(clap::Args, Debug)]
struct Target {
    /// Resource type (workspace, datastore, featuretype, layer, ...)
    kind: String,
    /// Resource name; workspace and datastore fall back to the configured defaults
    name: Option<String>,
    #[arg(short, long)]
    workspace: Option<String>,
    /// Parent store (datastore, coverage store, WMS/WMTS store)
    #[arg(short, long)]
    store: Option<String>,
}

impl Target {
    fn resolve(&self) -> Result<(ResourceKind, ResourceConfig)> {
        let kind: ResourceKind = self.kind.parse()?;
        let config = ResourceConfig {
            name: self.name.clone(),
            workspace: self.workspace.clone(),
            store: self.store.clone(),
            ..Default::default()
        };
        Ok((kind, config))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exit 0 if the resource exists, 1 otherwise
    Exists(Target),
    /// Print the resource as JSON
    Get(Target),
    /// Delete the resource if it exists
    Delete(Target),
    /// Create a workspace unless it exists
    CreateWorkspace { name: String },
    /// Create a datastore from the configured database parameters
    CreateDatastore {
        name: String,
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Create a style if needed and upload its SLD
    UploadStyle {
        name: String,
        /// SLD file to upload
        file: PathBuf,
        /// Register the style in this workspace instead of globally
        #[arg(short, long)]
        workspace: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Only this crate logs at the chosen level; HTTP internals stay at warn
fn log_filter(level: Option<Level>) -> Option<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_ENV) {
        return Some(filter);
    }
    let level = level?;
    let directives = format!("warn,gsrest={}", level.to_string().to_lowercase());
    Some(EnvFilter::new(directives))
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(filter) = log_filter(level.to_tracing_level()) else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gsrest {} started with log level: {:?}", env!("CARGO_PKG_VERSION"), level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gsrest").join("gsrest.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gsrest").join("gsrest.log");
    }
    PathBuf::from("gsrest.log")
}

fn load_config(path: Option<PathBuf>) -> Result<RepositoryConfig> {
    let path = path
        .or_else(RepositoryConfig::default_path)
        .context("No configuration file given and no config directory found")?;

    RepositoryConfig::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let _guard = setup_logging(args.log_level)?;

    let config = load_config(args.config)?;
    let repo = Repository::new(config).context("Failed to initialize GeoServer client")?;

    match args.command {
        Command::Exists(target) => {
            let (kind, config) = target.resolve()?;
            let present = repo.exists(kind, &config).await?;
            println!("{}", present);
            if !present {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Get(target) => {
            let (kind, config) = target.resolve()?;
            let value = repo.get(kind, &config).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Delete(target) => {
            let (kind, config) = target.resolve()?;
            let outcome = repo.delete(kind, &config).await?;
            println!("{:?}", outcome);
        }
        Command::CreateWorkspace { name } => {
            let outcome = repo.workspaces().create(&ResourceConfig::named(name)).await?;
            println!("{:?}", outcome);
        }
        Command::CreateDatastore { name, workspace } => {
            let mut config = ResourceConfig::named(name);
            config.workspace = workspace;
            let outcome = repo.datastores().create(&config).await?;
            println!("{:?}", outcome);
        }
        Command::UploadStyle {
            name,
            file,
            workspace,
        } => {
            let sld = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let scope = match workspace {
                Some(ws) => StyleScope::Workspace(ws),
                None => StyleScope::Global,
            };
            repo.styles().create_with_content(&scope, &name, &sld).await?;
            println!("uploaded {}", name);
        }
    }

    Ok(ExitCode::SUCCESS)
}
