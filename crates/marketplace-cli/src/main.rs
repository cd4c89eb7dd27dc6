//! Marketplace CLI - a terminal client for the marketplace backend.
//!
//! # Usage
//!
//! ```bash
//! marketplace login
//! marketplace products --search basil --sort price
//! marketplace cart add 7
//! marketplace closet list
//! ```
//!
//! Set `RUST_LOG=debug` for request logging and `MARKETPLACE_LOG_DIR` to
//! also write a daily log file.

mod commands;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marketplace_core::ApiError;

/// Directory for the optional rolling log file
const ENV_LOG_DIR: &str = "MARKETPLACE_LOG_DIR";

#[derive(Parser)]
#[command(name = "marketplace")]
#[command(author, version, about = "Marketplace client: catalog, cart, closet and events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with username and password
    Login {
        /// Username (prompted when omitted)
        username: Option<String>,
    },
    /// Sign in with a Google ID token
    GoogleLogin {
        id_token: String,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
    },
    /// Sign out and delete stored tokens
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Update account details
    Profile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// List products
    Products {
        /// Only products in this category id
        #[arg(short, long)]
        category: Option<i64>,
        /// Case-insensitive text search on name and description
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        in_stock: bool,
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
        #[arg(long)]
        desc: bool,
    },
    /// List product categories
    Categories,
    /// List recipes
    Recipes {
        #[arg(short, long)]
        category: Option<i64>,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// List past orders
    Orders,
    /// Manage closet items
    Closet {
        #[command(subcommand)]
        action: ClosetAction,
    },
    /// Manage planned events
    Events {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Manage outfit recommendations
    Recommendations {
        #[command(subcommand)]
        action: RecommendationAction,
    },
    /// Load profile, catalog, cart and recipes together
    Overview,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Price,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Set the quantity of a product (0 removes it)
    Set { product: i64, quantity: u32 },
    /// Add one of a product
    Add { product: i64 },
    /// Remove one of a product
    Remove { product: i64 },
}

#[derive(Subcommand)]
enum ClosetAction {
    List,
    Add {
        name: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        season: Option<String>,
    },
    /// Remove one or more items by id
    Remove {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[derive(Subcommand)]
enum EventAction {
    List,
    Add {
        title: String,
        /// Date as YYYY-MM-DD
        date: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        dress_code: Option<String>,
    },
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum RecommendationAction {
    List,
    Create {
        /// Closet item ids making up the outfit
        #[arg(required = true)]
        items: Vec<i64>,
        #[arg(long)]
        event: Option<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    Remove { id: i64 },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os(ENV_LOG_DIR) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(PathBuf::from(dir), "marketplace.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let cli = Cli::parse();
    info!("Marketplace CLI starting");

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ApiError>() {
            Some(api_error) if api_error.requires_login() => {
                eprintln!("{} Run `marketplace login`.", api_error.user_message());
            }
            Some(api_error) => eprintln!("Error: {}", api_error.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Context::load()?;

    match cli.command {
        Commands::Login { username } => commands::account::login(&ctx, username).await?,
        Commands::GoogleLogin { id_token } => {
            commands::account::google_login(&ctx, &id_token).await?
        }
        Commands::Signup { username, email } => {
            commands::account::signup(&ctx, username, email).await?
        }
        Commands::Logout => commands::account::logout(&ctx)?,
        Commands::Whoami => commands::account::whoami(&ctx).await?,
        Commands::Profile {
            email,
            first_name,
            last_name,
        } => commands::account::update_profile(&ctx, email, first_name, last_name).await?,
        Commands::Products {
            category,
            search,
            max_price,
            in_stock,
            sort,
            desc,
        } => {
            let query = marketplace_core::catalog::ProductQuery {
                category,
                search,
                max_price,
                in_stock_only: in_stock,
                sort: match sort {
                    SortArg::Name => marketplace_core::catalog::ProductSortColumn::Name,
                    SortArg::Price => marketplace_core::catalog::ProductSortColumn::Price,
                },
                descending: desc,
            };
            commands::catalog::products(&ctx, &query).await?
        }
        Commands::Categories => commands::catalog::categories(&ctx).await?,
        Commands::Recipes { category, search } => {
            let query = marketplace_core::catalog::RecipeQuery { category, search };
            commands::catalog::recipes(&ctx, &query).await?
        }
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Set { product, quantity } => {
                commands::cart::set_quantity(&ctx, product, quantity).await?
            }
            CartAction::Add { product } => commands::cart::increment(&ctx, product).await?,
            CartAction::Remove { product } => commands::cart::decrement(&ctx, product).await?,
        },
        Commands::Orders => commands::cart::orders(&ctx).await?,
        Commands::Closet { action } => match action {
            ClosetAction::List => commands::wardrobe::closet(&ctx).await?,
            ClosetAction::Add {
                name,
                category,
                color,
                season,
            } => {
                let item = marketplace_core::models::NewClosetItem {
                    name,
                    category,
                    color,
                    season,
                };
                commands::wardrobe::add_closet_item(&ctx, &item).await?
            }
            ClosetAction::Remove { ids } => commands::wardrobe::remove_closet_items(&ctx, &ids).await?,
        },
        Commands::Events { action } => match action {
            EventAction::List => commands::wardrobe::events(&ctx).await?,
            EventAction::Add {
                title,
                date,
                location,
                dress_code,
            } => {
                let event = marketplace_core::models::NewEvent {
                    title,
                    date,
                    location,
                    description: None,
                    dress_code,
                };
                commands::wardrobe::add_event(&ctx, &event).await?
            }
            EventAction::Remove { id } => commands::wardrobe::remove_event(&ctx, id).await?,
        },
        Commands::Recommendations { action } => match action {
            RecommendationAction::List => commands::wardrobe::recommendations(&ctx).await?,
            RecommendationAction::Create { items, event, note } => {
                let recommendation = marketplace_core::models::NewRecommendation { event, items, note };
                commands::wardrobe::create_recommendation(&ctx, &recommendation).await?
            }
            RecommendationAction::Remove { id } => {
                commands::wardrobe::remove_recommendation(&ctx, id).await?
            }
        },
        Commands::Overview => commands::catalog::overview(&ctx).await?,
    }

    info!("Marketplace CLI finished");
    Ok(())
}
