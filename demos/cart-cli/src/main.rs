//! `shopcart` - browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List the bundled catalog without touching the network
//! shopcart --offline list
//!
//! # Search by name or category
//! shopcart --offline search audio
//!
//! # Add product 1, then look at the cart
//! shopcart --offline add 1
//! shopcart cart
//! ```
//!
//! The cart persists between runs in the storage directory.

mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shopcart_sdk::{Product, ShopSdk, ShopSdkBuilder, StorageBackend};
use tracing_subscriber::EnvFilter;

use error::CliError;

#[derive(Parser)]
#[command(name = "shopcart")]
#[command(author, version, about = "Storefront catalog and cart demo")]
struct Cli {
    /// Use the bundled catalog instead of the online one
    #[arg(long, global = true)]
    offline: bool,

    /// Where the cart is stored
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Storage backend: file, duckdb or memory
    #[arg(long, global = true)]
    backend: Option<StorageBackend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every product
    List,
    /// Search products by name or category
    Search { query: String },
    /// Show one product with specs and reviews
    Show { id: i64 },
    /// Add a product to the cart
    Add { id: i64 },
    /// Remove a product from the cart
    Remove { id: i64 },
    /// Show the cart and its total
    Cart,
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut builder = ShopSdkBuilder::from_env()?;
    if cli.offline {
        builder = builder.offline(true);
    }
    if let Some(dir) = cli.storage_dir {
        builder = builder.storage_dir(dir);
    }
    if let Some(backend) = cli.backend {
        builder = builder.backend(backend);
    }
    let sdk = builder.build().await?;

    match cli.command {
        Commands::List => print_products(&sdk.products().await?),
        Commands::Search { query } => print_products(&sdk.search(&query).await?),
        Commands::Show { id } => print_detail(&sdk.product(id).await?),
        Commands::Add { id } => {
            let product = sdk.add_to_cart(id).await?;
            println!("Added {} to cart", product.name);
        }
        Commands::Remove { id } => {
            sdk.remove_from_cart(id);
            println!("Removed {id} from cart");
        }
        Commands::Cart => print_cart(&sdk),
        Commands::Clear => {
            sdk.cart().clear().await;
            println!("Cart cleared");
        }
    }

    sdk.close().await;
    Ok(())
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for p in products {
        let stock = if p.in_stock { "" } else { "  (out of stock)" };
        println!("{:>4}  {:<40} {:>10}  {}{}", p.id, p.name, format!("${:.2}", p.price), p.category, stock);
    }
}

fn print_detail(p: &Product) {
    println!("{} (#{})", p.name, p.id);
    println!("${:.2} - {}", p.price, if p.in_stock { p.category.as_str() } else { "Out of Stock" });
    println!();
    println!("{}", p.description);
    println!();
    for (name, value) in &p.specs {
        println!("  {name}: {value}");
    }
    if let Some(avg) = p.average_rating() {
        println!();
        println!("Reviews ({:.1} average)", avg);
        for r in &p.reviews {
            println!("  {} {}: {}", "*".repeat(usize::from(r.rating)), r.user, r.comment);
        }
    }
}

fn print_cart(sdk: &ShopSdk) {
    let cart = sdk.cart().snapshot();
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }
    print_products(cart.items());
    println!("{:>57}", format!("Total: ${:.2}", cart.total()));
}
