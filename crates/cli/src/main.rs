//! Legora CLI - cart, wishlist and checkout from the terminal.
//!
//! Operates on the same file-backed state directory the storefront server
//! uses, so a cart built here is the cart the server serves.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of a product
//! legora cart add --id p1 --title "Lawn Suit" --price "PKR 2,500" --qty 2
//!
//! # Add several sizes at once
//! legora cart add --id p2 --title Kurta --price 1200 --size-qty M=1 --size-qty L=2
//!
//! # Show the cart
//! legora cart show
//!
//! # Place a cash-on-delivery order
//! legora checkout --name "Ayesha Khan" --email ayesha@example.com \
//!     --phone 0300-1234567 --address "12 Mall Road" --city Lahore --postal-code 54000
//! ```
//!
//! # Commands
//!
//! - `cart` - show, add, remove, inc, dec, clear
//! - `wishlist` - show, add, remove, clear
//! - `checkout` - place an order for the current cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "legora")]
#[command(author, version, about = "Legora storefront CLI")]
struct Cli {
    /// State directory (defaults to `LEGORA_STATE_DIR`, then `.legora`)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect or change the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Place a cash-on-delivery order for the current cart
    Checkout(CheckoutArgs),
}

/// Product details as shown on a product card.
#[derive(Args)]
struct ProductArgs {
    /// Product ID
    #[arg(long)]
    id: String,

    /// Product title
    #[arg(long)]
    title: String,

    /// Display price; anything but digits and `.` is ignored ("PKR 1,200")
    #[arg(long)]
    price: String,

    /// Image URL
    #[arg(long)]
    image: Option<String>,

    /// Size variant
    #[arg(long)]
    size: Option<String>,
}

/// Identifies lines by product and, optionally, size.
#[derive(Args)]
struct SelectorArgs {
    /// Product ID
    #[arg(long)]
    id: String,

    /// Only the given size; without it every size of the product matches
    #[arg(long)]
    size: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print lines, count and total
    Show,
    /// Add a product
    Add {
        #[command(flatten)]
        product: ProductArgs,

        /// Quantity
        #[arg(long, default_value_t = 1)]
        qty: u32,

        /// Add several sizes at once, as SIZE=QTY (repeatable)
        #[arg(long = "size-qty", value_parser = commands::cart::parse_size_qty)]
        sizes: Vec<(String, u32)>,
    },
    /// Remove matching lines
    Remove(SelectorArgs),
    /// Increase quantity by one
    Inc(SelectorArgs),
    /// Decrease quantity by one, removing at zero
    Dec(SelectorArgs),
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Print saved items
    Show,
    /// Save a product
    Add(ProductArgs),
    /// Remove matching items
    Remove(SelectorArgs),
    /// Remove every item
    Clear,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Full name
    #[arg(long)]
    name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Phone number
    #[arg(long)]
    phone: String,

    /// Street address
    #[arg(long)]
    address: String,

    /// City
    #[arg(long)]
    city: String,

    /// Postal code
    #[arg(long)]
    postal_code: String,

    /// Delivery notes
    #[arg(long)]
    notes: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::load(cli.state_dir)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add {
                product,
                qty,
                sizes,
            } => commands::cart::add(&ctx, &product.into(), qty, &sizes),
            CartAction::Remove(sel) => commands::cart::remove(&ctx, &sel.into()),
            CartAction::Inc(sel) => commands::cart::increment(&ctx, &sel.into()),
            CartAction::Dec(sel) => commands::cart::decrement(&ctx, &sel.into()),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&ctx),
            WishlistAction::Add(product) => commands::wishlist::add(&ctx, product.into()),
            WishlistAction::Remove(sel) => commands::wishlist::remove(&ctx, &sel.into()),
            WishlistAction::Clear => commands::wishlist::clear(&ctx),
        },
        Commands::Checkout(args) => commands::checkout::place(&ctx, &args.into()).await?,
    }
    Ok(())
}

impl From<ProductArgs> for legora_core::ProductSnapshot {
    fn from(args: ProductArgs) -> Self {
        Self {
            id: args.id.into(),
            title: args.title,
            price: legora_core::parse_display_price(&args.price),
            image: args.image,
            size: args.size,
        }
    }
}

impl From<ProductArgs> for legora_core::WishlistItem {
    fn from(args: ProductArgs) -> Self {
        legora_core::ProductSnapshot::from(args).into()
    }
}

impl From<SelectorArgs> for legora_core::LineSelector {
    fn from(args: SelectorArgs) -> Self {
        Self {
            id: args.id.into(),
            size: args.size,
        }
    }
}

impl From<CheckoutArgs> for legora_storefront::checkout::CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            full_name: args.name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            postal_code: args.postal_code,
            notes: args.notes,
        }
    }
}
