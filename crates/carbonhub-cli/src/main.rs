/*
[INPUT]:  CLI arguments, YAML configuration file, environment, OS signals
[OUTPUT]: Wallet sign-in, session management and dashboard operations
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or shutdown handling
*/

mod cli;

use anyhow::{Context, Result, anyhow};
use carbonhub_adapter::{AccountType, Side, SwapDirection};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use carbonhub_cli::{App, AppConfig, commands};

#[derive(Parser, Debug)]
#[command(name = "carbonhub", version, about = "CarbonHub wallet sign-in and trading client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: String,
    /// Override `api_host` from the config file and environment
    #[arg(long = "api-host", value_name = "URL", global = true)]
    api_host: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH", default_value = "carbonhub.yaml")]
        output: PathBuf,
    },
    /// Create (or show) the local wallet key
    Keygen,
    /// Sign in with the local wallet
    Login {
        #[arg(long = "account-type", value_name = "TYPE")]
        account_type: Option<AccountType>,
    },
    /// Show wallet, session and dashboard access
    Status,
    /// Forget the stored session
    Logout,
    Balance,
    Price {
        /// Keep refreshing until interrupted
        #[arg(long)]
        watch: bool,
    },
    Swap {
        /// sol_to_credit (buy) or credit_to_sol (sell)
        #[arg(long)]
        direction: SwapDirection,
        #[arg(long)]
        amount: Decimal,
    },
    /// Show the emission quota
    Quota,
    Withdraw {
        #[arg(long)]
        amount: Decimal,
    },
    /// Record a simulated order
    Order {
        #[arg(long)]
        side: Side,
        #[arg(long)]
        size: Decimal,
        #[arg(long = "price", value_name = "PRICE")]
        limit_price: Option<Decimal>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let Cli {
        config_path,
        api_host,
        command,
        ..
    } = args;
    let load_app = || -> Result<App> {
        let config =
            AppConfig::load(config_path.as_deref(), api_host.clone()).context("load config")?;
        info!(api_host = %config.api_host, "configuration loaded");
        App::new(config)
    };

    let output = match command {
        Command::Init { output } => return cli::init::run_init(output),
        Command::Order {
            side,
            size,
            limit_price,
        } => commands::order(side, size, limit_price)?,
        Command::Keygen => commands::keygen(&load_app()?)?,
        Command::Login { account_type } => {
            let app = load_app()?;
            let account_type = account_type.unwrap_or(app.config().account_type);
            commands::login(&app, account_type).await?
        }
        Command::Status => commands::status(&load_app()?)?,
        Command::Logout => commands::logout(&load_app()?)?,
        Command::Balance => commands::balance(&load_app()?).await?,
        Command::Price { watch: false } => commands::price(&load_app()?).await?,
        Command::Price { watch: true } => {
            let app = load_app()?;
            let shutdown = CancellationToken::new();
            setup_signal_handlers(shutdown.clone());
            commands::watch_price(&app, shutdown).await?;
            return Ok(());
        }
        Command::Swap { direction, amount } => {
            commands::swap(&load_app()?, direction, amount).await?
        }
        Command::Quota => commands::quota(&load_app()?).await?,
        Command::Withdraw { amount } => commands::withdraw(&load_app()?, amount).await?,
    };
    println!("{output}");

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
