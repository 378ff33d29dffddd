//! WebDriver-backed browser session

use std::time::{Duration, Instant};

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{TripError, TripResult};
use crate::fixture::SessionFactory;
use crate::locator::{Locator, PageDriver};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
        }
    }

    /// Name of the matching WebDriver binary
    pub fn driver_binary(&self) -> &'static str {
        match self {
            Browser::Chrome => "chromedriver",
            Browser::Firefox => "geckodriver",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            other => Err(TripError::DriverStartup(format!(
                "unsupported browser '{}' (expected chrome or firefox)",
                other
            ))),
        }
    }
}

/// Configuration for opening browser sessions
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,

    /// Upper bound for each wait-until-present
    pub wait_timeout: Duration,

    /// Delay between element polls while waiting
    pub poll_interval: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser: Browser::Chrome,
            headless: true,
            window_width: 1280,
            window_height: 720,
            wait_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl BrowserConfig {
    /// W3C capabilities for the configured browser
    pub fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = Vec::new();
        let options_key = match self.browser {
            Browser::Chrome => {
                if self.headless {
                    args.push("--headless=new".to_string());
                }
                args.push(format!("--window-size={},{}", self.window_width, self.window_height));
                args.push("--no-sandbox".to_string());
                args.push("--disable-dev-shm-usage".to_string());
                "goog:chromeOptions"
            }
            Browser::Firefox => {
                if self.headless {
                    args.push("-headless".to_string());
                }
                args.push(format!("--width={}", self.window_width));
                args.push(format!("--height={}", self.window_height));
                "moz:firefoxOptions"
            }
        };

        let mut caps = serde_json::Map::new();
        caps.insert("browserName".to_string(), json!(self.browser.as_str()));
        caps.insert(options_key.to_string(), json!({ "args": args }));
        caps
    }
}

/// One open browser window, owned by the scenario that opened it
pub struct BrowserSession {
    client: Option<Client>,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl BrowserSession {
    /// Open a new session on the configured WebDriver endpoint
    pub async fn connect(config: &BrowserConfig) -> TripResult<Self> {
        info!(
            "Opening {} session on {} (headless: {})",
            config.browser.as_str(),
            config.webdriver_url,
            config.headless
        );

        let client = ClientBuilder::native()
            .capabilities(config.capabilities())
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| TripError::DriverStartup(e.to_string()))?;

        Ok(Self {
            client: Some(client),
            wait_timeout: config.wait_timeout,
            poll_interval: config.poll_interval,
        })
    }

    fn client(&self) -> TripResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| TripError::WebDriver("session already closed".to_string()))
    }

    /// Present, displayed and enabled right now. An element that is missing
    /// or went stale mid-check counts as not ready yet.
    async fn ready(&self, locator: &Locator) -> TripResult<Option<Element>> {
        let element = match self.client()?.find(webdriver_locator(locator)).await {
            Ok(element) => element,
            Err(e) if still_pending(&e) => return Ok(None),
            Err(e) => return Err(command_error(locator, e)),
        };

        let interactable = async {
            Ok::<_, CmdError>(element.is_displayed().await? && element.is_enabled().await?)
        }
        .await;

        match interactable {
            Ok(true) => Ok(Some(element)),
            Ok(false) => Ok(None),
            Err(e) if still_pending(&e) => {
                debug!("{} detached while polling", locator);
                Ok(None)
            }
            Err(e) => Err(command_error(locator, e)),
        }
    }
}

/// Errors that mean the page is still changing under the wait
fn still_pending(err: &CmdError) -> bool {
    err.is_no_such_element() || err.is_stale_element_reference()
}

fn webdriver_locator(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Css(q) => fantoccini::Locator::Css(q),
        Locator::XPath(q) => fantoccini::Locator::XPath(q),
        Locator::Id(q) => fantoccini::Locator::Id(q),
        Locator::LinkText(q) => fantoccini::Locator::LinkText(q),
    }
}

/// Map a WebDriver command error into the suite's taxonomy
fn command_error(locator: &Locator, err: CmdError) -> TripError {
    match err {
        e if e.is_no_such_element() => TripError::ElementNotFound {
            step: String::new(),
            locator: locator.to_string(),
        },
        CmdError::WaitTimeout => TripError::Navigation {
            step: String::new(),
            locator: locator.to_string(),
            reason: "timed out".to_string(),
        },
        other => TripError::WebDriver(other.to_string()),
    }
}

fn interaction_error(err: CmdError) -> TripError {
    TripError::WebDriver(err.to_string())
}

#[async_trait]
impl PageDriver for BrowserSession {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> TripResult<()> {
        debug!("goto {}", url);
        self.client()?.goto(url).await.map_err(interaction_error)
    }

    async fn find_one(&mut self, locator: &Locator) -> TripResult<Element> {
        debug!("find {}", locator);
        self.client()?
            .find(webdriver_locator(locator))
            .await
            .map_err(|e| command_error(locator, e))
    }

    async fn find_all(&mut self, locator: &Locator) -> TripResult<Vec<Element>> {
        debug!("find all {}", locator);
        self.client()?
            .find_all(webdriver_locator(locator))
            .await
            .map_err(|e| command_error(locator, e))
    }

    async fn find_within(&mut self, parent: &Element, locator: &Locator) -> TripResult<Element> {
        parent
            .find(webdriver_locator(locator))
            .await
            .map_err(|e| command_error(locator, e))
    }

    async fn wait_until_present(&mut self, locator: &Locator) -> TripResult<Element> {
        let start = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;
            if let Some(element) = self.ready(locator).await? {
                debug!("{} ready after {} poll(s)", locator, attempts);
                return Ok(element);
            }

            if start.elapsed() >= self.wait_timeout {
                return Err(TripError::Navigation {
                    step: String::new(),
                    locator: locator.to_string(),
                    reason: format!(
                        "not interactable within {} ms",
                        self.wait_timeout.as_millis()
                    ),
                });
            }

            sleep(self.poll_interval).await;
        }
    }

    async fn click(&mut self, element: &Element) -> TripResult<()> {
        element.click().await.map_err(interaction_error)
    }

    async fn fill(&mut self, element: &Element, text: &str) -> TripResult<()> {
        element.clear().await.map_err(interaction_error)?;
        element.send_keys(text).await.map_err(interaction_error)
    }

    async fn select_by_text(&mut self, element: &Element, label: &str) -> TripResult<()> {
        element.select_by_label(label).await.map_err(|e| {
            command_error(&Locator::xpath(format!(".//option[.='{}']", label)), e)
        })
    }

    async fn text(&mut self, element: &Element) -> TripResult<String> {
        element.text().await.map_err(interaction_error)
    }

    async fn screenshot(&mut self) -> TripResult<Vec<u8>> {
        self.client()?.screenshot().await.map_err(interaction_error)
    }

    async fn close(&mut self) -> TripResult<()> {
        if let Some(client) = self.client.take() {
            info!("Closing browser session");
            client.close().await.map_err(interaction_error)?;
        }
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.client.is_some() {
            warn!("Browser session dropped without close; the browser may outlive the suite");
        }
    }
}

/// Opens a fresh [`BrowserSession`] per scenario
#[derive(Debug, Clone, Default)]
pub struct WebDriverFactory {
    config: BrowserConfig,
}

impl WebDriverFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    type Session = BrowserSession;

    async fn open(&self) -> TripResult<BrowserSession> {
        BrowserSession::connect(&self.config).await
    }
}
