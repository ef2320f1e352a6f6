//! The command surface.

pub mod auth;
pub mod browse;
pub mod cart;
pub mod checkout;
pub mod comment;

use clap::{Parser, Subcommand};

use shopfront_client::PaymentMethod;
use shopfront_core::{Category, ProductId};

use crate::app::App;

#[derive(Debug, Parser)]
#[command(name = "shopfront")]
#[command(about = "Storefront CLI: browse the catalog, manage a cart, check out")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the products in one category.
    Browse { category: Category },
    /// Show one product with its comments.
    Show { category: Category, id: ProductId },
    /// Inspect or mutate the cart.
    Cart {
        #[command(subcommand)]
        command: CartCommand,
    },
    /// Sign in and persist the session.
    Login {
        username: String,
        /// Prompted for on stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a customer account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        /// Prompted for on stdin when omitted.
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = "customer")]
        customer_type: String,
        #[arg(long, default_value = "")]
        phone_number: String,
    },
    /// Sign out and drop the stored session.
    Logout,
    /// Place an order for the cart, pay for it, and empty the cart.
    Checkout {
        /// `credit-card` or `paypal`.
        #[arg(long, default_value = "credit-card")]
        method: PaymentMethod,
    },
    /// Post a comment on a product.
    Comment {
        category: Category,
        id: ProductId,
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Print the cart with its checkout totals.
    Show,
    /// Add a product to the cart; adding the same product again merges
    /// quantities.
    Add {
        category: Category,
        id: ProductId,
        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity; zero or below removes the line.
    Update {
        category: Category,
        id: ProductId,
        quantity: i64,
    },
    /// Remove a line; removing an absent line succeeds.
    Remove { category: Category, id: ProductId },
    /// Empty the cart.
    Clear,
}

/// Dispatch one parsed command against the wired application.
pub async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Browse { category } => browse::list(app, category).await,
        Command::Show { category, id } => browse::show(app, category, id).await,
        Command::Cart { command } => cart::run(app, command).await,
        Command::Login { username, password } => auth::login(app, &username, password).await,
        Command::Register {
            email,
            username,
            password,
            customer_type,
            phone_number,
        } => auth::register(app, email, username, password, customer_type, phone_number).await,
        Command::Logout => auth::logout(app),
        Command::Checkout { method } => checkout::run(app, method).await,
        Command::Comment { category, id, text } => {
            comment::post(app, category, id, text.join(" ")).await
        }
    }
}
