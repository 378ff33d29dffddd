//! Element locators and the page-driver seam
//!
//! Everything the purchase flow does against a page goes through
//! [`PageDriver`]. The WebDriver-backed session implements it for real runs;
//! the offline tests implement it with an in-memory model of the site.

use std::fmt;

use async_trait::async_trait;

use crate::error::TripResult;

/// A rule for finding an element on the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
    Id(String),
    LinkText(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    /// Match a form control by its `name` attribute
    pub fn name(name: &str) -> Self {
        Locator::Css(format!("[name='{}']", name))
    }

    /// Value cell of a two-column table row whose label cell reads `label`
    pub fn table_value(label: &str) -> Self {
        Locator::XPath(format!("//td[.='{}']/following-sibling::td", label))
    }

    pub fn query(&self) -> &str {
        match self {
            Locator::Css(q) | Locator::XPath(q) | Locator::Id(q) | Locator::LinkText(q) => q,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(q) => write!(f, "css={}", q),
            Locator::XPath(q) => write!(f, "xpath={}", q),
            Locator::Id(q) => write!(f, "id={}", q),
            Locator::LinkText(q) => write!(f, "link={}", q),
        }
    }
}

/// Browser primitives the page objects are written against.
///
/// Lookup failures are reported without a step name; the page layer fills it
/// in with [`TripError::at_step`](crate::error::TripError::at_step).
///
/// - `find_one` / `find_all` look at the page as it is right now. A missing
///   element from `find_one` is `ElementNotFound`.
/// - `wait_until_present` polls until the element is displayed and enabled,
///   up to the session's wait timeout. Running out of time is `Navigation`.
#[async_trait]
pub trait PageDriver: Send {
    type Element: Clone + Send + Sync;

    async fn goto(&mut self, url: &str) -> TripResult<()>;

    async fn find_one(&mut self, locator: &Locator) -> TripResult<Self::Element>;

    async fn find_all(&mut self, locator: &Locator) -> TripResult<Vec<Self::Element>>;

    async fn find_within(
        &mut self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> TripResult<Self::Element>;

    async fn wait_until_present(&mut self, locator: &Locator) -> TripResult<Self::Element>;

    async fn click(&mut self, element: &Self::Element) -> TripResult<()>;

    /// Replace the element's current value with `text`
    async fn fill(&mut self, element: &Self::Element, text: &str) -> TripResult<()>;

    /// Pick the `<option>` whose visible text is `label`
    async fn select_by_text(&mut self, element: &Self::Element, label: &str) -> TripResult<()>;

    async fn text(&mut self, element: &Self::Element) -> TripResult<String>;

    /// PNG bytes of the current viewport
    async fn screenshot(&mut self) -> TripResult<Vec<u8>>;

    /// End the browser session. Calling it again is a no-op.
    async fn close(&mut self) -> TripResult<()>;
}
