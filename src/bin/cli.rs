//! Product-scout command line
//!
//! Extract products from a page, summarise them, and approve them into a catalog file.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use product_scout::browser::LaunchOptions;
use product_scout::dom::DomTree;
use product_scout::extract::{Product, ProductExtractor};
use product_scout::pipeline::{ChromePageLoader, ExtractionOutcome, Scout};
use product_scout::store::{JsonFileStore, ProductStore};
use product_scout::summary::OpenAiSummarizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "product-scout")]
#[command(version)]
#[command(about = "Find product listings on e-commerce pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a page in Chrome and print the products found
    Extract {
        /// Page URL
        url: String,

        #[command(flatten)]
        summary: SummaryArgs,

        /// Print JSON instead of one line per product
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Extract products from a saved HTML file
    ExtractFile {
        /// HTML file
        path: PathBuf,

        /// URL relative links are resolved against
        #[arg(long)]
        base_url: Option<String>,

        /// Print JSON instead of one line per product
        #[arg(long)]
        json: bool,
    },

    /// Extract a page and save one of its products to the catalog
    Approve {
        /// Page URL
        url: String,

        /// Position of the product in the extract output (0-based)
        #[arg(long)]
        index: usize,

        /// JSON Lines catalog file
        #[arg(long, default_value = "approved-products.jsonl")]
        store: PathBuf,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Print the approved products in a catalog file
    List {
        /// JSON Lines catalog file
        #[arg(long, default_value = "approved-products.jsonl")]
        store: PathBuf,
    },
}

#[derive(Args)]
struct BrowserArgs {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value = "30000")]
    navigation_timeout: u64,
}

#[derive(Args)]
struct SummaryArgs {
    /// Summarise the products (needs OPENAI_API_KEY)
    #[arg(long)]
    summary: bool,

    /// Term the summary should focus on
    #[arg(long, requires = "summary")]
    search_term: Option<String>,

    /// Model used for summaries
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    openai_model: String,
}

impl BrowserArgs {
    fn scout(&self) -> Scout {
        let mut options = LaunchOptions::new()
            .headless(!self.headed)
            .navigation_timeout(self.navigation_timeout);
        if let Some(path) = &self.executable_path {
            options = options.chrome_path(path);
        }
        Scout::new(Arc::new(ChromePageLoader::new(options)))
    }
}

fn print_products(products: &[Product], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(products)?);
    } else {
        for (i, product) in products.iter().enumerate() {
            println!("[{}] {}", i, product.details_line());
        }
    }
    Ok(())
}

async fn extract(url: &str, summary: &SummaryArgs, json: bool, browser: &BrowserArgs) -> Result<()> {
    let mut scout = browser.scout();

    if summary.summary {
        let summarizer = OpenAiSummarizer::from_env()
            .context("--summary needs OPENAI_API_KEY")?
            .with_model(&summary.openai_model);
        scout = scout.with_summarizer(Arc::new(summarizer));

        let report = scout.fetch_products_and_summary(url, summary.search_term.as_deref()).await?;
        if report.navigation_failed {
            eprintln!("Warning: {} could not be loaded", report.url);
        }
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_products(&report.products, false)?;
            if let Some(text) = &report.summary {
                println!();
                println!("{}", text);
            }
        }
        return Ok(());
    }

    match scout.extract(url).await? {
        ExtractionOutcome::Products(products) => {
            if products.is_empty() {
                eprintln!("No products found at {}", url);
            }
            print_products(&products, json)
        }
        ExtractionOutcome::NavigationFailed(reason) => bail!("Failed to load {}: {}", url, reason),
    }
}

fn extract_file(path: &Path, base_url: Option<&str>, json: bool) -> Result<()> {
    let html = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let tree = DomTree::from_html(&html, base_url)?;
    let products = ProductExtractor::default().extract(&tree);
    print_products(&products, json)
}

async fn approve(url: &str, index: usize, store: PathBuf, browser: &BrowserArgs) -> Result<()> {
    let store = Arc::new(JsonFileStore::new(store));
    let scout = browser.scout().with_store(store.clone());

    let mut queue = scout.products_for_approval(url).await?;
    if queue.is_empty() {
        bail!("No products found at {}", url);
    }

    let id = scout
        .approve(&mut queue, index)
        .await
        .with_context(|| format!("{} products available", queue.len()))?;
    let item = &queue.items[index];
    println!("Approved {} as {} ({})", item.product.name, id, store.path().display());
    Ok(())
}

async fn list(store: PathBuf) -> Result<()> {
    let store = JsonFileStore::new(store);
    for product in store.list().await? {
        println!(
            "{} {} | {} | {} | approved {}",
            product.id,
            product.name,
            product.price,
            product.link,
            product.approved_at.to_rfc3339()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract { url, summary, json, browser } => extract(&url, &summary, json, &browser).await,
        Command::ExtractFile { path, base_url, json } => extract_file(&path, base_url.as_deref(), json),
        Command::Approve { url, index, store, browser } => approve(&url, index, store, &browser).await,
        Command::List { store } => list(store).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_accepts_summary_flags() {
        let cli = Cli::try_parse_from([
            "product-scout",
            "extract",
            "https://shop.test/",
            "--summary",
            "--search-term",
            "mug",
            "--openai-model",
            "gpt-4o",
        ])
        .unwrap();

        match cli.command {
            Command::Extract { summary, .. } => {
                assert!(summary.summary);
                assert_eq!(summary.search_term.as_deref(), Some("mug"));
                assert_eq!(summary.openai_model, "gpt-4o");
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_approve_has_no_summary_flags() {
        let result = Cli::try_parse_from([
            "product-scout",
            "approve",
            "https://shop.test/",
            "--index",
            "1",
            "--openai-model",
            "gpt-4o",
        ]);
        assert!(result.is_err());
    }
}
