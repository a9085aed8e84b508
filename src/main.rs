use clap::{Parser, Subcommand};
use std::sync::Arc;

use herald_bot::application::diagnostics::MemorySink;
use herald_bot::application::errors::BotError;
use herald_bot::application::Bootstrap;
use herald_bot::domain::traits::CommandRegistrar;
use herald_bot::infrastructure::adapters::{ConsoleGateway, ConsoleResponder, LogRegistrar, RestRegistrar};
use herald_bot::infrastructure::config::Config;
use herald_bot::infrastructure::plugins::ModuleLoader;
use herald_bot::plugins::builtin_catalog;

#[derive(Parser)]
#[command(name = "herald-bot")]
#[command(about = "A module-driven chat bot runtime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Load and validate modules, print the commands that would be registered
    Check,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(&cli.config, cli.token);
        }
        Commands::Check => {
            check_modules(&cli.config);
        }
        Commands::Version => {
            println!("herald-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn tokio_runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_bot(config_path: &str, token_override: Option<String>) {
    let mut config = Config::load_or_default(config_path);
    if let Some(token) = token_override {
        config.bot.token = Some(token);
    }

    tracing::info!("Starting {}", config.bot.name);

    let rt = tokio_runtime();
    if let Err(e) = rt.block_on(start(config)) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn registrar(config: &Config) -> Arc<dyn CommandRegistrar> {
    match (&config.bot.token, config.has_credentials()) {
        (Some(token), true) => Arc::new(RestRegistrar::new(token.clone()).with_api_base(config.bot.api_base.clone())),
        _ => {
            tracing::warn!("No token or application id configured, commands will only be logged");
            Arc::new(LogRegistrar)
        }
    }
}

fn bootstrap(config: &Config) -> Bootstrap {
    Bootstrap::new(
        config.bootstrap_options(),
        ModuleLoader::standard(Arc::new(builtin_catalog(config))),
        Arc::new(ConsoleGateway::new()),
        Arc::new(ConsoleResponder),
        registrar(config),
    )
}

async fn start(config: Config) -> Result<(), BotError> {
    config.validate()?;
    let runtime = bootstrap(&config).start().await?;

    let token = config.bot.token.clone().unwrap_or_default();
    runtime.serve(&token).await;

    if let Some(outcome) = runtime.registration().borrow().as_ref() {
        tracing::debug!(success = outcome.success, count = outcome.count, "Command sync finished");
    }
    Ok(())
}

fn check_modules(config_path: &str) {
    let config = Config::load_or_default(config_path);
    let sink = Arc::new(MemorySink::new());
    let rt = tokio_runtime();
    let discovery = rt.block_on(bootstrap(&config).with_diagnostics(sink.clone()).discover());

    for diagnostic in sink.entries() {
        eprintln!("[{}] {}: {}", diagnostic.kind, diagnostic.unit, diagnostic.message);
    }
    tracing::info!(
        accepted = discovery.registry.len(),
        shadowed = discovery.tally.replaced,
        rejected = discovery.tally.rejected + discovery.tally.unloaded,
        diagnostics = sink.entries().len(),
        "Module check finished"
    );

    match serde_json::to_string_pretty(&discovery.registry.describe_all()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("Failed to render commands: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}
