//! Paperback CLI - Terminal front end for the book storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! paperback books list
//! paperback books show 64f1c0ffee
//!
//! # Place an order for two books
//! paperback checkout --email ada@example.com --form shipping.yaml --book b1 --book b2
//!
//! # Order history
//! paperback orders list --email ada@example.com
//!
//! # Admin dashboard
//! paperback admin login --username admin
//! paperback admin add-book --title "Ledger" --category business --new-price 12.50
//! paperback admin logout
//! ```
//!
//! # Commands
//!
//! - `books` - List the catalog or show one book
//! - `orders` - Order history for a buyer
//! - `checkout` - Fill a cart, validate the shipping form, submit the order
//! - `admin` - Log in, inspect the session, add books, log out

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use paperback_storefront::{AppState, ClientConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "paperback")]
#[command(author, version, about = "Paperback book storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Books {
        #[command(subcommand)]
        action: BooksAction,
    },
    /// Look up orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Place an order
    Checkout {
        /// Buyer email (the signed-in identity)
        #[arg(short, long)]
        email: String,

        /// YAML file with the shipping form
        #[arg(short, long)]
        form: PathBuf,

        /// Book id to put in the cart (repeatable)
        #[arg(short, long = "book", required = true)]
        books: Vec<String>,
    },
    /// Admin session and inventory
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum BooksAction {
    /// List every book
    List,
    /// Show one book
    Show {
        /// Book id
        id: String,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders placed by a buyer
    List {
        /// Buyer email
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Exchange admin credentials for a session token
    Login {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin password (falls back to `PAPERBACK_ADMIN_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Purge the stored session token
    Logout,
    /// Show whether a session token is present
    Status,
    /// Add a book to the inventory
    AddBook {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// business, technology, fiction, horror or adventure
        #[arg(long)]
        category: String,

        #[arg(long)]
        new_price: String,

        #[arg(long)]
        old_price: Option<String>,

        #[arg(long)]
        trending: bool,

        /// Cover image file name or URL
        #[arg(long)]
        cover_image: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "paperback_storefront=info,paperback_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    tracing::debug!(api = %config.api_base_url, environment = ?config.environment, "Configuration loaded");

    let state = AppState::new(config);

    if let Err(e) = run(cli, &state).await {
        commands::report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, state: &AppState) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Books { action } => match action {
            BooksAction::List => commands::books::list(state).await?,
            BooksAction::Show { id } => commands::books::show(state, &id).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { email } => commands::orders::list(state, &email).await?,
        },
        Commands::Checkout {
            email,
            form,
            books,
        } => commands::checkout::run(state, &email, &form, &books).await?,
        Commands::Admin { action } => match action {
            AdminAction::Login { username, password } => {
                commands::admin::login(state, &username, password).await?;
            }
            AdminAction::Logout => commands::admin::logout(state)?,
            AdminAction::Status => commands::admin::status(state),
            AdminAction::AddBook {
                title,
                description,
                category,
                new_price,
                old_price,
                trending,
                cover_image,
            } => {
                let input = commands::admin::AddBookInput {
                    title,
                    description,
                    category,
                    new_price,
                    old_price,
                    trending,
                    cover_image,
                };
                commands::admin::add_book(state, input).await?;
            }
        },
    }
    Ok(())
}
