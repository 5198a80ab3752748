use clap::{Parser, Subcommand};

mod domain;
mod application;
mod infrastructure;

use application::errors::BotError;
use application::messaging::{Dispatcher, PeriodicScheduler, RateLimiter};
use application::services::{register_builtins, ChatService, DynamicCommandStore};
use domain::entities::CommandRegistry;
use domain::traits::ChatConnection;
use infrastructure::adapters::{ChattersSource, IrcConnection};
use infrastructure::config::Config;
use infrastructure::storage::JsonCommandFile;

#[derive(Parser)]
#[command(name = "bcb-bot")]
#[command(about = "A chat-command bot for a single IRC channel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Chat password / oauth token (overrides config)
    #[arg(short, long)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and start processing commands
    Run,
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

    // Handler panics are caught at dispatch, keep their reports in the log
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("{}", info);
    }));

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.password) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("bcb-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn load_config(config_path: &str, password_override: Option<String>) -> Result<Config, BotError> {
    let mut config = if std::path::Path::new(config_path).exists() {
        let mut config = Config::load(config_path)?;
        config.apply_env();
        config
    } else {
        tracing::warn!("Config file {} not found, using defaults and environment", config_path);
        Config::load_env()
    };

    if let Some(password) = password_override {
        config.connection.password = Some(password);
    }

    config.validate()?;
    Ok(config)
}

fn build_dispatcher(config: &Config) -> Result<Dispatcher, BotError> {
    let mut registry = CommandRegistry::new();
    register_builtins(&mut registry, &config.commands.control_name);

    let store = JsonCommandFile::new(&config.commands.store_path);
    let mut dynamic = DynamicCommandStore::new(Box::new(store));
    dynamic.load(&mut registry);

    let roster_source = ChattersSource::new(config.roster.url_for(&config.bot.channel))?;

    Ok(Dispatcher::new(registry, dynamic, Box::new(roster_source))
        .with_rate_limiter(RateLimiter::new(config.rate_limit.window(), config.rate_limit.max_rate))
        .with_scheduler(PeriodicScheduler::new(config.roster.refresh_interval())))
}

fn run_bot(config_path: &str, password_override: Option<String>) -> Result<(), BotError> {
    let config = load_config(config_path, password_override)?;
    tracing::info!("Starting bcb-bot as {} in #{}", config.bot.username, config.bot.channel);

    let dispatcher = build_dispatcher(&config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    rt.block_on(async {
        let mut connection = IrcConnection::connect(
            &config.connection.host,
            config.connection.port,
            config.bot.channel.clone(),
        )
        .await?;

        if let Err(e) = connection.login(config.connection.password.as_deref(), &config.bot.username).await {
            connection.close().await;
            return Err(e);
        }

        tracing::info!("Listening to #{}", config.bot.channel);
        let mut service = ChatService::new(connection, dispatcher);
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        };

        service.run(shutdown).await
    })
}

fn init_config() {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => eprintln!("Failed to render default config: {}", e),
    }
}
