//! Scenario registry
//!
//! A scenario is a named async body run against one browser session. Bodies
//! are registered explicitly, either as closures or from declarative YAML
//! files. Adding a file or a `register` call is all it takes to add a test.

use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assertions::{assert_confirmed, expect_navigation_error};
use crate::error::{TripError, TripResult};
use crate::locator::PageDriver;
use crate::passenger::Passenger;
use crate::site::SiteConfig;
use crate::trip::{purchase_end_to_end, purchase_with_passenger, TripRequest};

pub type ScenarioFuture<'a> = BoxFuture<'a, TripResult<()>>;

type ScenarioBody<D> =
    Box<dyn for<'a> Fn(&'a mut D, &'a SiteConfig) -> ScenarioFuture<'a> + Send + Sync>;

/// A registered, runnable scenario
pub struct Scenario<D> {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    body: ScenarioBody<D>,
}

impl<D> Scenario<D> {
    pub fn run<'a>(&self, driver: &'a mut D, site: &'a SiteConfig) -> ScenarioFuture<'a> {
        (self.body)(driver, site)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl<D> std::fmt::Debug for Scenario<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Ordered set of scenarios, keyed by name
pub struct ScenarioRegistry<D> {
    scenarios: Vec<Arc<Scenario<D>>>,
}

impl<D> Default for ScenarioRegistry<D> {
    fn default() -> Self {
        Self {
            scenarios: Vec::new(),
        }
    }
}

impl<D: PageDriver + 'static> ScenarioRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the stock BlazeDemo scenarios
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Register a closure under `name`. A scenario already registered under
    /// the same name is replaced.
    pub fn register<F>(&mut self, name: &str, description: &str, tags: &[&str], body: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut D, &'a SiteConfig) -> ScenarioFuture<'a> + Send + Sync + 'static,
    {
        let scenario = Arc::new(Scenario {
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            body: Box::new(body),
        });

        if let Some(slot) = self.scenarios.iter_mut().find(|s| s.name == name) {
            warn!("Scenario '{}' registered twice; keeping the later one", name);
            *slot = scenario;
        } else {
            debug!("Registered scenario '{}'", name);
            self.scenarios.push(scenario);
        }
        self
    }

    /// Register a declarative scenario. Names must be unique.
    pub fn add_spec(&mut self, spec: ScenarioSpec) -> TripResult<()> {
        spec.validate()?;
        if self.get(&spec.name).is_some() {
            return Err(TripError::ScenarioParse(format!(
                "duplicate scenario name: {}",
                spec.name
            )));
        }

        let request = spec.request();
        let expect = spec.expect;
        let seed = spec.passenger_seed;
        let tags: Vec<&str> = spec.tags.iter().map(String::as_str).collect();

        self.register(&spec.name, &spec.description, &tags, move |driver, site| {
            let request = request.clone();
            Box::pin(async move { run_expectation(driver, site, &request, expect, seed).await })
        });
        Ok(())
    }

    /// Load every `.yaml`/`.yml` scenario under `dir`
    pub fn load_dir(&mut self, dir: &Path) -> TripResult<usize> {
        let specs = ScenarioSpec::load_all(dir)?;
        let count = specs.len();
        for spec in specs {
            self.add_spec(spec)?;
        }
        Ok(count)
    }
}

impl<D> ScenarioRegistry<D> {
    pub fn get(&self, name: &str) -> Option<Arc<Scenario<D>>> {
        self.scenarios.iter().find(|s| s.name == name).cloned()
    }

    pub fn all(&self) -> Vec<Arc<Scenario<D>>> {
        self.scenarios.clone()
    }

    pub fn tagged(&self, tag: &str) -> Vec<Arc<Scenario<D>>> {
        self.scenarios
            .iter()
            .filter(|s| s.has_tag(tag))
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// What a declarative scenario expects from the flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Booking confirmed with the configured status and a valid price
    #[default]
    Confirmed,
    /// Flow stops before confirmation with a navigation error
    NavigationError,
}

/// A declarative scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    pub origin: String,
    pub destination: String,

    /// 0-based row on the results page
    #[serde(default)]
    pub flight_index: usize,

    #[serde(default)]
    pub expect: Expectation,

    /// Fixed passenger data instead of a fresh random profile
    #[serde(default)]
    pub passenger_seed: Option<u64>,
}

impl ScenarioSpec {
    pub fn from_yaml(yaml: &str) -> TripResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_file(path: &Path) -> TripResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| TripError::ScenarioParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenario files from a directory, in path order
    pub fn load_all(dir: &Path) -> TripResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            specs.push(Self::from_file(entry.path())?);
        }

        Ok(specs)
    }

    pub fn request(&self) -> TripRequest {
        TripRequest::new(&self.origin, &self.destination, self.flight_index)
    }

    fn validate(&self) -> TripResult<()> {
        if self.name.trim().is_empty() {
            return Err(TripError::ScenarioParse("scenario name is empty".into()));
        }
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(TripError::ScenarioParse(format!(
                "{}: origin and destination are required",
                self.name
            )));
        }
        Ok(())
    }
}

async fn run_expectation<D: PageDriver>(
    driver: &mut D,
    site: &SiteConfig,
    request: &TripRequest,
    expect: Expectation,
    passenger_seed: Option<u64>,
) -> TripResult<()> {
    let outcome = match passenger_seed {
        Some(seed) => purchase_with_passenger(driver, site, request, &Passenger::seeded(seed)).await,
        None => purchase_end_to_end(driver, site, request).await,
    };

    match expect {
        Expectation::Confirmed => assert_confirmed(&outcome?, site),
        Expectation::NavigationError => expect_navigation_error(outcome).map(|_| ()),
    }
}

fn builtin(
    name: &str,
    description: &str,
    tags: &[&str],
    request: TripRequest,
    expect: Expectation,
) -> ScenarioSpec {
    ScenarioSpec {
        name: name.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        origin: request.origin,
        destination: request.destination,
        flight_index: request.flight_index,
        expect,
        passenger_seed: None,
    }
}

/// The stock BlazeDemo scenarios
pub fn register_builtins<D: PageDriver + 'static>(registry: &mut ScenarioRegistry<D>) {
    let specs = [
        builtin(
            "purchase_paris_to_rome",
            "Book the first Paris to Rome flight",
            &["purchase", "smoke"],
            TripRequest::new("Paris", "Rome", 0),
            Expectation::Confirmed,
        ),
        builtin(
            "purchase_boston_to_berlin",
            "Book the second Boston to Berlin flight",
            &["purchase"],
            TripRequest::new("Boston", "Berlin", 1),
            Expectation::Confirmed,
        ),
        builtin(
            "purchase_paris_to_london",
            "Book the third Paris to London flight",
            &["purchase"],
            TripRequest::new("Paris", "London", 2),
            Expectation::Confirmed,
        ),
        builtin(
            "rejects_identical_cities",
            "Same origin and destination never reaches confirmation",
            &["negative"],
            TripRequest::new("Boston", "Boston", 0),
            Expectation::NavigationError,
        ),
        builtin(
            "rejects_out_of_range_flight",
            "A flight index past the listed flights never reaches confirmation",
            &["negative"],
            TripRequest::new("Paris", "Rome", 9999),
            Expectation::NavigationError,
        ),
    ];

    for spec in specs {
        let name = spec.name.clone();
        if let Err(e) = registry.add_spec(spec) {
            warn!("Skipping builtin scenario '{}': {}", name, e);
        }
    }

    registry.register(
        "purchase_random_route",
        "Book a random flight on a random route",
        &["purchase", "random"],
        |driver, site| {
            let request = TripRequest::random(&mut rand::thread_rng(), &site.catalog);
            Box::pin(async move {
                let request = request?;
                let booking = purchase_end_to_end(driver, site, &request).await?;
                assert_confirmed(&booking, site)
            })
        },
    );
}
