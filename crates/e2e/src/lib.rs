//! BlazeDemo trip suite
//!
//! Browser-driven end-to-end checks for the BlazeDemo flight-booking site:
//! search a route, pick a flight, fill the purchase form with random
//! passenger data, and check what the confirmation page reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Trip Suite Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── ScenarioRegistry (closures + YAML scenarios)         │
//! │    ├── with_session(factory, body)   open → run → close     │
//! │    └── write_results / write_report  JSON + HTML            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  purchase_end_to_end(session, site, request)                │
//! │    HomePage → FlightsPage → PurchasePage → ConfirmationPage │
//! │      └── PageDriver + Locator  (all selectors in SiteMap)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserSession (fantoccini) ── DriverProcess (optional)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod assertions;
pub mod driver;
pub mod error;
pub mod fixture;
pub mod locator;
pub mod logging;
pub mod pages;
pub mod passenger;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod site;
pub mod trip;

pub use error::{TripError, TripResult};
pub use fixture::{with_session, SessionFactory};
pub use locator::{Locator, PageDriver};
pub use passenger::Passenger;
pub use runner::{Outcome, RunnerConfig, TestRunner, TestSuiteResult};
pub use scenario::{ScenarioRegistry, ScenarioSpec};
pub use session::{BrowserConfig, BrowserSession, WebDriverFactory};
pub use site::SiteConfig;
pub use trip::{purchase_end_to_end, purchase_with_passenger, BookingResult, TripRequest};
