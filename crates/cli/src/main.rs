//! ForvrMurr CLI - cart and catalog client for the storefront backend.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! fm-cli cart show
//!
//! # Add two samples of a product
//! fm-cli cart add 64f1c0de -q 2
//!
//! # Order summary with shipping and tax
//! fm-cli cart summary
//!
//! # Product card with six highlighted notes
//! fm-cli product grand-soir --notes 6 --seed 42
//! ```
//!
//! # Commands
//!
//! - `cart` - Show, add, remove, update, clear and summarize the cart
//! - `product` - Show one product card
//! - `products` - List a catalog page
//!
//! Configuration comes from `FORVRMURR_*` environment variables. The guest
//! token and access token persist in `FORVRMURR_STORAGE_PATH` between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use forvrmurr_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fm-cli")]
#[command(author, version, about = "ForvrMurr storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and change the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show a product card
    Product {
        /// Product slug
        slug: String,

        /// How many scent notes to highlight
        #[arg(short, long, default_value_t = 6)]
        notes: usize,

        /// Seed for the note selection
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },
    /// List a page of the catalog
    Products {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart contents
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: String,

        /// Number of samples
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart line ID
        line_id: String,
    },
    /// Set the quantity of a cart line
    Update {
        /// Cart line ID
        line_id: String,

        /// New quantity (must be at least 1)
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Show the checkout order summary
    Summary,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

    tracing::debug!("Sentry initialized");
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
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry must be up before the subscriber so the layer has a client
    let _sentry_guard = init_sentry(&config);

    // stdout is reserved for command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "forvrmurr_storefront=info,fm_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            e.report();
            commands::print_error(&e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: Cli,
    config: StorefrontConfig,
) -> forvrmurr_storefront::error::Result<ExitCode> {
    match cli.command {
        Commands::Cart { action } => {
            let session = commands::Session::open(&config)?;
            let code = match action {
                CartAction::Show => commands::cart::show(&session).await,
                CartAction::Add {
                    product_id,
                    quantity,
                } => commands::cart::add(&session, &product_id, quantity).await,
                CartAction::Remove { line_id } => commands::cart::remove(&session, &line_id).await,
                CartAction::Update { line_id, quantity } => {
                    commands::cart::update(&session, &line_id, quantity).await
                }
                CartAction::Clear => commands::cart::clear(&session).await,
                CartAction::Summary => commands::cart::summary(&session, &config.pricing).await,
            };
            Ok(code)
        }
        Commands::Product { slug, notes, seed } => {
            commands::product::show(&config, &slug, notes, seed).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Products { page } => {
            commands::product::list(&config, page).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
