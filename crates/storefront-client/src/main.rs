//! Storefront admin command line
//!
//! Lists, adds, edits and deletes catalog products and shows the current
//! balance inquiry, using the same controller the web server uses.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use storefront_client::{
    BalanceBoard, BalanceView, CatalogController, ClientError, ClientResult, Notice, Operation,
    PendingDeletion,
};
use storefront_core::{Config, ImageUpload, LogFormat, Price, ProductDraft, ProductId};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

/// Command line interface for the storefront admin
#[derive(Parser)]
#[command(
    name = "storefront-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Manage the restaurant storefront catalog and check balances"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Manage catalog products
    Products {
        /// Product subcommand
        #[command(subcommand)]
        action: ProductCommands,
    },

    /// Show the balance inquiry
    Balance,

    /// Inspect configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Product subcommands
#[derive(Subcommand)]
enum ProductCommands {
    /// List every product, newest first
    List,

    /// Add a product
    Add {
        /// Product name
        #[arg(long)]
        name: String,

        /// Price
        #[arg(long)]
        price: String,

        /// Shared optional fields
        #[command(flatten)]
        extra: ExtraFields,
    },

    /// Edit a product; fields left out keep their current values
    Edit {
        /// Product id
        id: ProductId,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New price
        #[arg(long)]
        price: Option<String>,

        /// Shared optional fields
        #[command(flatten)]
        extra: ExtraFields,
    },

    /// Delete a product
    Delete {
        /// Product id
        id: ProductId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Optional product fields
#[derive(Args)]
struct ExtraFields {
    /// Description
    #[arg(long)]
    description: Option<String>,

    /// Image file to upload
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ClientResult<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        // It's okay if .env doesn't exist
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = LogFormat::Json;
    }
    storefront_core::init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        catalog = %config.catalog.base_url,
        "Storefront admin starting"
    );

    match cli.command {
        Commands::Products { action } => {
            let controller = CatalogController::from_config(&config.catalog)?;
            handle_products(&controller, &config, action).await
        }
        Commands::Balance => show_balance(&config).await,
        Commands::Config { show } => {
            if show {
                show_config(&config)?;
            }
            Ok(())
        }
    }
}

/// Print a notice for `err` and pass it on
fn report(operation: Operation, err: ClientError) -> ClientError {
    eprintln!("{}", Notice::from_error(operation, &err));
    err
}

async fn handle_products(
    controller: &CatalogController,
    config: &Config,
    action: ProductCommands,
) -> ClientResult<()> {
    match action {
        ProductCommands::List => {
            controller
                .refresh()
                .await
                .map_err(|e| report(Operation::Refresh, e))?;
            list_products(controller, config).await;
            Ok(())
        }
        ProductCommands::Add { name, price, extra } => {
            let mut draft = ProductDraft::new(name, price)
                .with_description(extra.description.unwrap_or_default());
            if let Some(path) = extra.image {
                draft = draft.with_image(read_image(&path).await?);
            }

            let mutation = controller
                .create(&draft)
                .await
                .map_err(|e| report(Operation::Save, e))?;
            println!("{}", Notice::saved(mutation.message));
            Ok(())
        }
        ProductCommands::Edit {
            id,
            name,
            price,
            extra,
        } => {
            controller
                .refresh()
                .await
                .map_err(|e| report(Operation::Refresh, e))?;
            let mut form = controller
                .begin_edit(id)
                .await
                .map_err(|e| report(Operation::Save, e))?;

            if let Some(name) = name {
                form.name = name;
            }
            if let Some(price) = price {
                form.price = price;
            }
            if let Some(description) = extra.description {
                form.description = description;
            }
            if let Some(path) = extra.image {
                form.image = Some(read_image(&path).await?);
            }

            let mutation = controller
                .submit(&form)
                .await
                .map_err(|e| report(Operation::Save, e))?;
            println!("{}", Notice::saved(mutation.message));
            Ok(())
        }
        ProductCommands::Delete { id, yes } => {
            let pending = controller.request_delete(id);
            if !yes && !confirm(&pending).await? {
                println!("Cancelled");
                return Ok(());
            }

            let mutation = controller
                .delete(pending.confirm())
                .await
                .map_err(|e| report(Operation::Delete, e))?;
            println!("{}", Notice::deleted(mutation.message));
            Ok(())
        }
    }
}

async fn list_products(controller: &CatalogController, config: &Config) {
    let image_base = config.catalog.image_base_url();
    let products = controller.products().await;

    println!("{:>6}  {:<32}  {:>14}  IMAGE", "ID", "NAME", "PRICE");
    for product in &products {
        println!(
            "{:>6}  {:<32}  {:>14}  {}",
            product.id,
            product.name,
            product.price.map_or_else(|| "-".to_string(), Price::display_rupiah),
            product.image_url(&image_base).unwrap_or_default()
        );
    }
    println!("{} products", products.len());
}

async fn read_image(path: &Path) -> ClientResult<ImageUpload> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
    Ok(ImageUpload::new(file_name, bytes))
}

/// Ask on the terminal whether to go ahead with a delete
async fn confirm(pending: &PendingDeletion) -> ClientResult<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            format!(
                "{} {} Delete product {}? [{}: y/N] ",
                PendingDeletion::TITLE,
                PendingDeletion::TEXT,
                pending.id(),
                PendingDeletion::CONFIRM_LABEL
            )
            .as_bytes(),
        )
        .await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn show_balance(config: &Config) -> ClientResult<()> {
    let board = BalanceBoard::from_config(&config.balance)?;
    board
        .refresh()
        .await
        .map_err(|e| report(Operation::Balance, e))?;

    if let BalanceView::Ready {
        inquiry,
        tables,
        fetched_at,
    } = board.view().await
    {
        println!("{} ({})", inquiry.name, inquiry.account_no);
        println!("Fetched at {}", fetched_at.to_rfc3339());
        for table in tables {
            println!();
            println!("{} [status {}]", table.balance_type, table.status);
            for row in table.rows {
                println!("{:>3}. {:<20} {:>18} {}", row.index, row.label, row.value, row.currency);
            }
        }
    }
    Ok(())
}

fn show_config(config: &Config) -> ClientResult<()> {
    let config_toml = toml::to_string_pretty(config).map_err(|e| {
        ClientError::configuration(format!("Failed to serialize configuration: {e}"))
    })?;
    println!("{config_toml}");
    Ok(())
}
