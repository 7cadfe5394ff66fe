//! Vitrine CLI - drive the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! vitrine products list --page 1 --limit 12
//! vitrine products show 65f0c2
//!
//! # Fill the cart
//! vitrine cart add 65f0c2 --size M
//! vitrine cart update 65f0c2 --size M --quantity 2
//! vitrine cart list
//!
//! # Check out
//! vitrine checkout --cep 01310-100 --lookup --number 1578 \
//!     --shipping sedex --payment pix --coupon WELCOME10
//!
//! # Session
//! vitrine auth login -e cliente@example.com
//! vitrine auth whoami
//! ```
//!
//! Configuration comes from `VITRINE_*` environment variables (or `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use vitrine_core::{PaymentMethod, ProductId, ShippingMethod, Size};
use vitrine_storefront::config::{LogFormat, StorefrontConfig};
use vitrine_storefront::{AppError, AppState, telemetry};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Run the checkout and place an order
    Checkout(CheckoutArgs),
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsCommand,
    },
    /// Browse the lookbook gallery
    Lookbook {
        #[command(subcommand)]
        action: LookbookCommand,
    },
    /// Log in, register or inspect the session
    Auth {
        #[command(subcommand)]
        action: AuthCommand,
    },
    /// Postal code (CEP) tools
    Cep {
        #[command(subcommand)]
        action: CepCommand,
    },
}

#[derive(Subcommand)]
enum CartCommand {
    /// Add one unit of a product
    Add {
        /// Product ID
        product: ProductId,

        /// Size (PP, P, M, G, GG, XG or U)
        #[arg(short, long, default_value = "U")]
        size: Size,
    },
    /// Remove a product line
    Remove {
        product: ProductId,

        #[arg(short, long)]
        size: Size,
    },
    /// Set the quantity of a product line (values below 1 are ignored)
    Update {
        product: ProductId,

        #[arg(short, long)]
        size: Size,

        #[arg(short, long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Show the cart
    List,
    /// Empty the cart
    Clear,
}

#[derive(clap::Args)]
struct CheckoutArgs {
    /// Postal code
    #[arg(long)]
    cep: String,

    /// Fill street, neighborhood, city and state from the CEP
    #[arg(long)]
    lookup: bool,

    #[arg(long, default_value = "")]
    street: String,

    #[arg(long, default_value = "")]
    number: String,

    #[arg(long)]
    complement: Option<String>,

    #[arg(long, default_value = "")]
    neighborhood: String,

    #[arg(long, default_value = "")]
    city: String,

    #[arg(long, default_value = "")]
    state: String,

    /// Shipping service (pac or sedex)
    #[arg(long)]
    shipping: Option<ShippingMethod>,

    /// Payment method (pix, credit_card or boleto)
    #[arg(long)]
    payment: Option<PaymentMethod>,

    /// Coupon code
    #[arg(long)]
    coupon: Option<String>,
}

#[derive(Subcommand)]
enum ProductsCommand {
    /// List products
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long, default_value_t = 12)]
        limit: u32,

        #[arg(short, long)]
        category: Option<String>,

        /// Keep loading pages until the catalog is exhausted (Ctrl+C stops)
        #[arg(long)]
        all: bool,
    },
    /// Show one product
    Show { product: ProductId },
}

#[derive(Subcommand)]
enum LookbookCommand {
    /// List lookbook photos
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long, default_value_t = 12)]
        limit: u32,

        /// Keep loading pages until the gallery is exhausted (Ctrl+C stops)
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Log in (the password is read from stdin when omitted)
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Whoami,
}

#[derive(Subcommand)]
enum CepCommand {
    /// Look up the address of a CEP
    Lookup { cep: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_tracing(LogFormat::default());
            tracing::error!(error = %e, "Failed to load configuration");
            output::failure(&AppError::from(e));
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(config.log_format);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_user_error() {
                tracing::debug!(error = %e, "Command rejected");
            } else {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Command failed");
            }
            output::failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let state = AppState::new(config, Arc::new(output::ConsoleNotifier))?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartCommand::Add { product, size } => {
                commands::cart::add(&state, &product, size).await?;
            }
            CartCommand::Remove { product, size } => commands::cart::remove(&state, &product, size),
            CartCommand::Update {
                product,
                size,
                quantity,
            } => commands::cart::update(&state, &product, size, quantity),
            CartCommand::List => commands::cart::list(&state),
            CartCommand::Clear => commands::cart::clear(&state),
        },
        Commands::Checkout(args) => commands::checkout::run(&state, args).await?,
        Commands::Products { action } => match action {
            ProductsCommand::List {
                page,
                limit,
                category,
                all,
            } => commands::catalog::list_products(&state, page, limit, category, all).await?,
            ProductsCommand::Show { product } => {
                commands::catalog::show_product(&state, &product).await?;
            }
        },
        Commands::Lookbook { action } => match action {
            LookbookCommand::List { page, limit, all } => {
                commands::catalog::list_lookbook(&state, page, limit, all).await?;
            }
        },
        Commands::Auth { action } => match action {
            AuthCommand::Login { email, password } => {
                commands::auth::login(&state, &email, password).await?;
            }
            AuthCommand::Register {
                name,
                email,
                password,
            } => commands::auth::register(&state, &name, &email, password).await?,
            AuthCommand::Logout => commands::auth::logout(&state)?,
            AuthCommand::Whoami => commands::auth::whoami(&state),
        },
        Commands::Cep { action } => match action {
            CepCommand::Lookup { cep } => commands::cep::lookup(&state, &cep).await?,
        },
    }
    Ok(())
}
