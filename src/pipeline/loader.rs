use crate::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use crate::dom::DomTree;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Extra time allowed on top of the navigation timeout for launching Chrome
/// and taking the snapshot.
const LOAD_SLACK: Duration = Duration::from_secs(15);

/// Turns a URL into a rendered page snapshot
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &Url) -> Result<DomTree>;
}

/// Loads pages in headless Chrome.
///
/// headless_chrome is blocking, so each load runs on the blocking pool and
/// is bounded by an overall timeout. A timed-out load stops being awaited;
/// the browser thread is torn down once its own navigation timeout fires.
#[derive(Debug, Clone, Default)]
pub struct ChromePageLoader {
    launch: LaunchOptions,
    connect: Option<ConnectionOptions>,
}

impl ChromePageLoader {
    pub fn new(launch: LaunchOptions) -> Self {
        Self { launch, connect: None }
    }

    /// Reuse a running browser instead of launching one per load.
    ///
    /// The navigation timeout and idle window still come from the launch options.
    pub fn with_connection(mut self, options: ConnectionOptions) -> Self {
        self.connect = Some(options);
        self
    }

    pub fn launch_options(&self) -> &LaunchOptions {
        &self.launch
    }

    fn load_timeout(&self) -> Duration {
        self.launch.navigation_timeout_duration() + LOAD_SLACK
    }
}

#[async_trait]
impl PageLoader for ChromePageLoader {
    async fn load(&self, url: &Url) -> Result<DomTree> {
        let launch = self.launch.clone();
        let connect = self.connect.clone();
        let target = url.to_string();

        let handle = tokio::task::spawn_blocking(move || -> Result<DomTree> {
            let session = match connect {
                Some(options) => BrowserSession::connect(options, &launch)?,
                None => BrowserSession::launch(launch)?,
            };
            let tree = session.load_page(&target);
            if let Err(e) = session.close() {
                log::debug!("Failed to close tabs: {}", e);
            }
            tree
        });

        let timeout = self.load_timeout();
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ScoutError::NavigationFailed(format!("Browser task failed: {}", join_error))),
            Err(_) => Err(ScoutError::Timeout(timeout.as_millis() as u64)),
        }
    }
}

/// Serves pre-registered markup; unknown URLs fail like an unreachable host
#[derive(Debug, Clone, Default)]
pub struct StaticPageLoader {
    pages: HashMap<String, String>,
}

impl StaticPageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: register markup for a URL
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        let key = Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string());
        self.pages.insert(key, html.into());
        self
    }
}

#[async_trait]
impl PageLoader for StaticPageLoader {
    async fn load(&self, url: &Url) -> Result<DomTree> {
        let html = self
            .pages
            .get(url.as_str())
            .ok_or_else(|| ScoutError::NavigationFailed(format!("Failed to navigate to {}: host unreachable", url)))?;
        DomTree::from_html(html, Some(url.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_loader_serves_registered_pages() {
        let loader = StaticPageLoader::new().with_page("https://shop.test", "<body><p>hi</p></body>");

        let tree = loader.load(&Url::parse("https://shop.test/").unwrap()).await.unwrap();
        assert_eq!(tree.root.text(), "hi");
        assert_eq!(tree.url.as_deref(), Some("https://shop.test/"));
    }

    #[tokio::test]
    async fn test_static_loader_unknown_url_is_navigation_failure() {
        let loader = StaticPageLoader::new();

        let err = loader.load(&Url::parse("https://nowhere.test/").unwrap()).await.unwrap_err();
        assert!(err.is_navigation());
    }

    #[test]
    fn test_chrome_loader_timeout_includes_slack() {
        let loader = ChromePageLoader::new(LaunchOptions::new().navigation_timeout(1_000));
        assert_eq!(loader.load_timeout(), Duration::from_millis(1_000) + LOAD_SLACK);
        assert!(loader.launch_options().headless);
    }

    #[test]
    fn test_connected_loader_keeps_page_timeouts() {
        let loader = ChromePageLoader::new(LaunchOptions::new().navigation_timeout(2_000).network_idle(100))
            .with_connection(ConnectionOptions::new("ws://127.0.0.1:9222/devtools/browser/x"));

        assert_eq!(loader.load_timeout(), Duration::from_millis(2_000) + LOAD_SLACK);
        assert_eq!(loader.launch_options().network_idle_ms, 100);
        assert!(loader.connect.is_some());
    }

    #[tokio::test]
    #[ignore] // Requires Chrome to be installed
    async fn test_chrome_loader_unreachable_host() {
        let loader = ChromePageLoader::new(LaunchOptions::new().navigation_timeout(5_000));

        let err = loader.load(&Url::parse("http://127.0.0.1:9/").unwrap()).await.unwrap_err();
        assert!(err.is_navigation());
    }
}
