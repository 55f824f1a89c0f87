//! Newsstand CLI - terminal client for the portal backend.
//!
//! # Usage
//!
//! ```bash
//! # Log in (stores the session and the refresh cookie jar locally)
//! ns-cli login -e editor@example.com -p 'secret'
//!
//! # Show the current session
//! ns-cli whoami
//!
//! # Ask the guard whether a path would render or redirect
//! ns-cli check /admin/dashboard
//!
//! # Log out and clear the session
//! ns-cli logout
//! ```
//!
//! Configuration comes from the environment (`NEWSSTAND_API_BASE_URL`,
//! optionally `NEWSSTAND_SESSION_FILE`, `NEWSSTAND_COOKIE_FILE`, and
//! `SENTRY_DSN`); a `.env` file is honored.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use newsstand_portal::config::PortalConfig;

mod commands;

#[derive(Parser)]
#[command(name = "ns-cli")]
#[command(author, version, about = "Newsstand portal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the portal backend
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the stored session
    Whoami,
    /// Run the route guard for a path and report the outcome
    Check {
        /// Path to check (e.g., /admin/dashboard)
        path: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &PortalConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let config = match PortalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber.
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "newsstand_portal=info,ns_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&config, &email, password).await
        }
        Commands::Logout => commands::session::logout(&config).await,
        Commands::Whoami => commands::session::whoami(&config),
        Commands::Check { path } => commands::session::check(&config, &path).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
