use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::TcpListener;

use admin_db::{
    absolutize_sqlite_dsn, expand_env_vars, redact_credentials_in_dsn, ConnectOpts, DbHandle,
};
use crud_admin::domain::shape::EntityRegistry;
use crud_admin::{CrudAdmin, CrudAdminConfig};
use runtime::{AppConfig, CliArgs, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Section of `modules` holding the admin configuration.
const ADMIN_MODULE: &str = "crud_admin";

/// FastAdmin Server - CRUD admin pages for flat record tables
#[derive(Parser)]
#[command(name = "fastadmin-server")]
#[command(about = "FastAdmin Server - CRUD admin pages for flat record tables")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("FastAdmin Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Final DSN: env references expanded, relative SQLite paths anchored at `base_dir`.
fn resolve_dsn(db_config: &DatabaseConfig, base_dir: &Path, create_dirs: bool) -> Result<String> {
    let raw = db_config.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    let dsn = expand_env_vars(raw)?;
    DbHandle::detect(&dsn)?;
    Ok(absolutize_sqlite_dsn(&dsn, base_dir, create_dirs)?)
}

fn admin_config(config: &AppConfig) -> Result<CrudAdminConfig> {
    let admin_cfg: CrudAdminConfig = config.module_config(ADMIN_MODULE)?;
    EntityRegistry::new(admin_cfg.entities.clone()).context("invalid entity configuration")?;
    Ok(admin_cfg)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let admin_cfg = admin_config(&config)?;
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("Database URL not configured"))?;

    let base_dir = PathBuf::from(&config.server.home_dir);
    let dsn = resolve_dsn(&db_config, &base_dir, true)?;

    let connect_opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!("Connecting to database: {}", redact_credentials_in_dsn(&dsn));
    let db = DbHandle::connect(&dsn, connect_opts).await?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    let admin = CrudAdmin::new(db.sea(), admin_cfg)?;
    admin.init_schema().await?;

    let router = admin.router(Duration::from_secs(config.server.timeout_sec));

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(runtime::shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped, closing database");
    db.close().await;
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let admin_cfg = admin_config(&config)?;
    if let Some(db_config) = &config.database {
        let base_dir = PathBuf::from(&config.server.home_dir);
        resolve_dsn(db_config, &base_dir, false)?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!(
        "Entities: {}",
        admin_cfg
            .entities
            .iter()
            .map(|e| e.slug.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("{}", config.to_yaml()?);
    Ok(())
}
