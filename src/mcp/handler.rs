use crate::pipeline::{ChromePageLoader, Scout};
use crate::browser::LaunchOptions;
use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::Arc;

/// MCP server exposing product extraction, summaries and approval as tools
#[derive(Clone)]
pub struct ProductServer {
    scout: Arc<Scout>,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl ProductServer {
    /// Create a server around a configured [`Scout`]
    pub fn new(scout: Scout) -> Self {
        Self { scout: Arc::new(scout), tool_router: Self::tool_router() }
    }

    /// Create a server that loads pages in Chrome with the given options
    pub fn with_options(options: LaunchOptions) -> Self {
        Self::new(Scout::new(Arc::new(ChromePageLoader::new(options))))
    }

    pub fn scout(&self) -> &Scout {
        &self.scout
    }
}

#[tool_handler]
impl ServerHandler for ProductServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Extracts product listings (name, price, link) from e-commerce pages. \
                 Use extract_products with a URL, optionally asking for a summary, then \
                 approve_product to save reviewed products to the catalog."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
