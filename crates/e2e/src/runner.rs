//! Suite runner: walks the registry, one fixture-scoped session per scenario

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{TripError, TripResult};
use crate::fixture::{with_session, SessionFactory};
use crate::locator::PageDriver;
use crate::report;
use crate::scenario::{Scenario, ScenarioRegistry};
use crate::site::SiteConfig;

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// An assertion did not hold
    Failed,
    /// Anything unexpected: driver trouble, missing elements, panics
    Errored,
}

impl Outcome {
    pub fn of(err: &TripError) -> Self {
        if err.is_failure() {
            Outcome::Failed
        } else {
            Outcome::Errored
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Errored => "error",
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub description: String,
    pub outcome: Outcome,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

impl TestResult {
    pub fn success(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }

    pub fn from_results(started_at: DateTime<Utc>, duration_ms: u64, results: Vec<TestResult>) -> Self {
        let count = |o: Outcome| results.iter().filter(|r| r.outcome == o).count();
        Self {
            total: results.len(),
            passed: count(Outcome::Passed),
            failed: count(Outcome::Failed),
            errored: count(Outcome::Errored),
            started_at,
            duration_ms,
            results,
        }
    }
}

/// Configuration for the suite runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub site: SiteConfig,
    pub output_dir: PathBuf,
    /// Capture the page when a scenario does not pass
    pub screenshots: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            output_dir: PathBuf::from("test-results"),
            screenshots: true,
        }
    }
}

impl RunnerConfig {
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join("automation.log")
    }

    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join("test-results.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join("report.html")
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.output_dir.join("screenshots")
    }
}

/// Main suite runner
pub struct TestRunner<F: SessionFactory> {
    factory: F,
    registry: ScenarioRegistry<F::Session>,
    site: Arc<SiteConfig>,
    config: RunnerConfig,
}

impl<F> TestRunner<F>
where
    F: SessionFactory,
    F::Session: 'static,
{
    pub fn new(factory: F, registry: ScenarioRegistry<F::Session>, config: RunnerConfig) -> Self {
        Self {
            factory,
            registry,
            site: Arc::new(config.site.clone()),
            config,
        }
    }

    pub fn registry(&self) -> &ScenarioRegistry<F::Session> {
        &self.registry
    }

    /// Run every registered scenario
    pub async fn run_all(&self) -> TestSuiteResult {
        self.run_scenarios(&self.registry.all()).await
    }

    /// Run scenarios carrying a tag
    pub async fn run_tagged(&self, tag: &str) -> TestSuiteResult {
        self.run_scenarios(&self.registry.tagged(tag)).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&self, name: &str) -> TripResult<TestResult> {
        let scenario = self
            .registry
            .get(name)
            .ok_or_else(|| TripError::ScenarioParse(format!("Scenario not found: {}", name)))?;
        Ok(self.run_scenario(scenario).await)
    }

    /// Run scenarios one after another; a failing scenario never stops the rest
    pub async fn run_scenarios(&self, scenarios: &[Arc<Scenario<F::Session>>]) -> TestSuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(Arc::clone(scenario)).await;
            match result.outcome {
                Outcome::Passed => info!("✓ {} ({} ms)", result.name, result.duration_ms),
                Outcome::Failed => error!(
                    "✗ {} FAILED - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown failure")
                ),
                Outcome::Errored => error!(
                    "✗ {} ERROR - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let suite = TestSuiteResult::from_results(started_at, duration_ms, results);

        info!(
            "Results: {} passed, {} failed, {} errors ({} ms)",
            suite.passed, suite.failed, suite.errored, suite.duration_ms
        );
        suite
    }

    /// Run one scenario inside the session fixture
    pub async fn run_scenario(&self, scenario: Arc<Scenario<F::Session>>) -> TestResult {
        let started_at = Utc::now();
        let start = Instant::now();
        info!("▶ {} - {}", scenario.name, scenario.description);

        let name = scenario.name.clone();
        let description = scenario.description.clone();
        let site = Arc::clone(&self.site);
        let screenshot_path = self
            .config
            .screenshots
            .then(|| self.config.screenshot_dir().join(format!("{}.png", name)));

        let result = with_session(&self.factory, move |session| {
            Box::pin(async move {
                let outcome = scenario.run(session, &site).await;
                let screenshot = match (&outcome, screenshot_path) {
                    (Err(_), Some(path)) => capture(session, path).await,
                    _ => None,
                };
                Ok((outcome, screenshot))
            })
        })
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        let (outcome, error, screenshot) = match result {
            Ok((Ok(()), _)) => (Outcome::Passed, None, None),
            Ok((Err(e), screenshot)) => (Outcome::of(&e), Some(e.to_string()), screenshot),
            // Session could not open, the body panicked, or teardown failed
            Err(e) => (Outcome::Errored, Some(e.to_string()), None),
        };

        TestResult {
            name,
            description,
            outcome,
            started_at,
            duration_ms,
            error,
            screenshot,
        }
    }

    /// Write the suite result as JSON
    pub fn write_results(&self, results: &TestSuiteResult) -> TripResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.results_path();
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }

    /// Write the HTML summary
    pub fn write_report(&self, results: &TestSuiteResult) -> TripResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.report_path();
        std::fs::write(&path, report::render_html(results, &self.site.base_url))?;

        info!("Report written to: {}", path.display());
        Ok(path)
    }
}

/// Save a screenshot of the current page; failures here never mask the
/// scenario's own outcome
async fn capture<D: PageDriver>(session: &mut D, path: PathBuf) -> Option<PathBuf> {
    let png = match session.screenshot().await {
        Ok(png) => png,
        Err(e) => {
            warn!("Screenshot failed: {}", e);
            return None;
        }
    };

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("Cannot create {}: {}", parent.display(), e);
            return None;
        }
    }

    match std::fs::write(&path, png) {
        Ok(()) => {
            debug!("Screenshot saved to {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("Cannot write {}: {}", path.display(), e);
            None
        }
    }
}
