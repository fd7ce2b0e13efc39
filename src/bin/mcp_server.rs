//! Product-scout MCP Server
//!
//! This binary provides a Model Context Protocol (MCP) server for product extraction.
//! It exposes extraction, summary and approval tools to AI assistants and other MCP clients.

use product_scout::browser::{ConnectionOptions, LaunchOptions};
use product_scout::mcp::ProductServer;
use product_scout::pipeline::{ChromePageLoader, Scout};
use product_scout::store::{JsonFileStore, MemoryStore, ProductStore};
use product_scout::summary::OpenAiSummarizer;
use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;

use rmcp::transport::{
    sse_server::{SseServer, SseServerConfig},
    streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager},
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// Server-Sent Events transport
    Sse,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "product-scout-mcp")]
#[command(version)]
#[command(about = "Product extraction MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// WebSocket endpoint URL of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value = "30000")]
    navigation_timeout: u64,

    /// JSON Lines file for approved products (default: in-memory)
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// API key for summaries; summaries are disabled without one
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Model used for summaries
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    openai_model: String,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for SSE or HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// SSE endpoint path (default: /sse)
    #[arg(long, default_value = "/sse")]
    sse_path: String,

    /// SSE POST path for messages (default: /message)
    #[arg(long, default_value = "/message")]
    sse_post_path: String,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

impl Cli {
    fn build_scout(&self) -> Scout {
        let mut options = LaunchOptions::new()
            .headless(!self.headed)
            .navigation_timeout(self.navigation_timeout);
        if let Some(path) = &self.executable_path {
            options = options.chrome_path(path);
        }
        if let Some(dir) = &self.user_data_dir {
            options = options.user_data_dir(dir);
        }

        let loader = match &self.ws_endpoint {
            Some(ws) => ChromePageLoader::new(options).with_connection(ConnectionOptions::new(ws)),
            None => ChromePageLoader::new(options),
        };

        let store: Arc<dyn ProductStore> = match &self.store {
            Some(path) => Arc::new(JsonFileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };

        let mut scout = Scout::new(Arc::new(loader)).with_store(store);
        if let Some(key) = &self.openai_api_key {
            scout = scout.with_summarizer(Arc::new(OpenAiSummarizer::new(key).with_model(&self.openai_model)));
        }
        scout
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let scout = cli.build_scout();

    log::info!("Product-scout MCP Server v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Browser mode: {}", if cli.headed { "headed" } else { "headless" });
    if let Some(ref endpoint) = cli.ws_endpoint {
        log::info!("WebSocket endpoint: {}", endpoint);
    }
    match &cli.store {
        Some(path) => log::info!("Approved products file: {}", path.display()),
        None => log::info!("Approved products kept in memory"),
    }
    log::info!("Summaries: {}", if scout.has_summarizer() { "enabled" } else { "disabled" });

    // Route to appropriate transport
    match cli.transport {
        Transport::Stdio => {
            log::info!("Transport: stdio");
            let server = ProductServer::new(scout).serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
        }
        Transport::Sse => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let config = SseServerConfig {
                bind: bind_addr.parse()?,
                sse_path: cli.sse_path.clone(),
                post_path: cli.sse_post_path.clone(),
                ct: CancellationToken::new(),
                sse_keep_alive: None,
            };

            let (sse_server, router) = SseServer::new(config);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.sse_path);

            // Register service factory for each connection
            let _cancellation_token = sse_server.with_service(move || ProductServer::new(scout.clone()));

            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            axum::serve(listener, router.into_make_service()).await?;
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let service_factory = move || Ok(ProductServer::new(scout.clone()));

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
