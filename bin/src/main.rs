//! iexcloud CLI - Query IEX Cloud market data from the command line.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use iexcloud_lib::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "iexcloud")]
#[command(about = "Query IEX Cloud market data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Secret API token for production data
    #[arg(long, env = "IEX_SECRET_KEY", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Secret API token for sandbox data
    #[arg(long, env = "IEX_SANDBOX_SECRET_KEY", hide_env_values = true, global = true)]
    sandbox_token: Option<String>,

    /// Query the sandbox instead of production data
    #[arg(long, global = true)]
    sandbox: bool,

    /// Override the API host (e.g. for a local mock)
    #[arg(long, global = true, hide = true)]
    base_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    format: Format,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the API system status
    Status,

    /// List every symbol IEX Cloud supports
    Symbols,

    /// Show the latest quote for one or more symbols
    Quote {
        /// Ticker symbols (e.g., aapl msft)
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Show the company profile for one or more symbols
    Company {
        /// Ticker symbols (e.g., aapl msft)
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Fetch any URL returning JSON with the rate-limited engine
    Get {
        /// URL without query string
        base: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = commands::get::parse_param)]
        params: Vec<(String, String)>,

        /// Maximum parallel connections (0 for no limit)
        #[arg(long, default_value = "0")]
        max_connections: usize,

        /// Maximum retries per request
        #[arg(long, default_value = "0")]
        retries: u32,

        /// HTTP status that triggers a retry (repeatable)
        #[arg(long = "retry-on")]
        retry_on: Vec<u16>,

        /// Retry when the response body is empty
        #[arg(long)]
        retry_empty: bool,

        /// Delay before each retry, in milliseconds
        #[arg(long, default_value = "40")]
        backoff_ms: u64,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

impl Cli {
    fn options(&self) -> EndpointOptions {
        if self.sandbox {
            EndpointOptions::sandbox()
        } else {
            EndpointOptions::default()
        }
    }

    fn client(&self) -> Result<IexClient> {
        let (token, name) = if self.sandbox {
            (&self.sandbox_token, "--sandbox-token or IEX_SANDBOX_SECRET_KEY")
        } else {
            (&self.token, "--token or IEX_SECRET_KEY")
        };
        if token.as_deref().is_none_or(str::is_empty) {
            bail!("Missing API token: pass {name}");
        }

        let keys = Keys {
            secret_key: self.token.clone().unwrap_or_default(),
            secret_sandbox_key: self.sandbox_token.clone().unwrap_or_default(),
            ..Keys::default()
        };
        let config = self
            .base_url
            .as_ref()
            .map_or_else(ApiConfig::default, ApiConfig::with_base_url);

        IexClient::new(keys, config).context("Failed to create IEX Cloud client")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Show help if no command provided
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let options = cli.options();
    match command {
        Commands::Status => {
            commands::basic::show(&cli.client()?, Endpoint::SystemStatus, &options, cli.format)
        }
        Commands::Symbols => {
            commands::basic::show(&cli.client()?, Endpoint::Symbols, &options, cli.format)
        }
        Commands::Quote { symbols } => {
            commands::stock::show(&cli.client()?, Endpoint::Quote, symbols, &options, cli.format)
        }
        Commands::Company { symbols } => {
            commands::stock::show(&cli.client()?, Endpoint::Company, symbols, &options, cli.format)
        }
        Commands::Get {
            base,
            params,
            max_connections,
            retries,
            retry_on,
            retry_empty,
            backoff_ms,
        } => {
            let policy = RetryBehavior::default()
                .with_max_retries(*retries)
                .with_responses_to_retry(retry_on.iter().copied())
                .with_retry_if_empty(*retry_empty)
                .with_timeout(std::time::Duration::from_millis(*backoff_ms));
            commands::get::get(base, params, *max_connections, &policy, cli.format)
        }
    }
}
