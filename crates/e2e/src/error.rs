//! Error types for the trip suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TripError {
    #[error("Navigation failed at {step}: {reason} (waiting for {locator})")]
    Navigation {
        step: String,
        locator: String,
        reason: String,
    },

    #[error("Element not found at {step}: {locator}")]
    ElementNotFound { step: String, locator: String },

    #[error("Assertion failed: {check} - expected {expected:?}, got {actual:?}")]
    Assertion {
        check: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid trip request: {0}")]
    InvalidRequest(String),

    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver status check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Scenario panicked: {0}")]
    ScenarioPanicked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TripError {
    /// Build an assertion failure carrying both sides of the comparison
    pub fn assertion(
        check: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        TripError::Assertion {
            check: check.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Attach the flow step to locator errors raised below the page layer.
    /// Errors that already name a step are left alone.
    pub fn at_step(self, name: &str) -> Self {
        match self {
            TripError::Navigation { step, locator, reason } if step.is_empty() => {
                TripError::Navigation {
                    step: name.to_string(),
                    locator,
                    reason,
                }
            }
            TripError::ElementNotFound { step, locator } if step.is_empty() => {
                TripError::ElementNotFound {
                    step: name.to_string(),
                    locator,
                }
            }
            other => other,
        }
    }

    /// Assertion mismatches are test failures; everything else is an error
    pub fn is_failure(&self) -> bool {
        matches!(self, TripError::Assertion { .. })
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, TripError::Navigation { .. })
    }
}

pub type TripResult<T> = Result<T, TripError>;
