//! The end-to-end purchase flow

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{TripError, TripResult};
use crate::locator::PageDriver;
use crate::pages::HomePage;
use crate::passenger::Passenger;
use crate::site::{RouteCatalog, SiteConfig};

/// Exactly one currency marker: `$472.56`, `$ 472.56`, `USD 555`, `555 USD`
static PRICE: Lazy<Regex> = Lazy::new(|| {
    let amount = r"([0-9]+(?:\.[0-9]+)?)";
    Regex::new(&format!(r"^(?:\$\s*{0}|USD\s+{0}|{0}\s+USD)$", amount))
        .expect("price pattern compiles")
});

/// Route and flight to book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    /// 0-based row on the results page
    pub flight_index: usize,
}

impl TripRequest {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, flight_index: usize) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            flight_index,
        }
    }

    /// Random route from the catalog with distinct cities
    pub fn random<R: Rng + ?Sized>(rng: &mut R, catalog: &RouteCatalog) -> TripResult<Self> {
        let origin = catalog
            .departures
            .choose(rng)
            .ok_or_else(|| TripError::InvalidRequest("no departure cities configured".into()))?;
        let destinations: Vec<&String> = catalog
            .destinations
            .iter()
            .filter(|city| *city != origin)
            .collect();
        let destination = destinations.choose(rng).ok_or_else(|| {
            TripError::InvalidRequest(format!("no destination other than {} configured", origin))
        })?;
        let flight_index = rng.gen_range(0..catalog.flights_per_route.max(1));

        Ok(Self::new(origin.clone(), (*destination).clone(), flight_index))
    }

    pub fn has_same_cities(&self) -> bool {
        self.origin == self.destination
    }
}

impl std::fmt::Display for TripRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} (flight #{})", self.origin, self.destination, self.flight_index)
    }
}

/// What the confirmation page showed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingResult {
    pub heading: String,
    pub status: String,
    /// Amount as rendered by the site
    pub price_text: String,
    /// `None` when the amount is not in a recognised currency format
    pub price: Option<f64>,
    pub confirmation_id: Option<String>,
}

impl BookingResult {
    pub fn new(
        heading: impl Into<String>,
        status: impl Into<String>,
        price_text: impl Into<String>,
        confirmation_id: Option<String>,
    ) -> Self {
        let price_text = price_text.into();
        Self {
            heading: heading.into(),
            status: status.into(),
            price: parse_price(&price_text),
            price_text,
            confirmation_id,
        }
    }
}

/// Numeric value of a rendered price, if it is in a currency format
pub fn parse_price(text: &str) -> Option<f64> {
    let caps = PRICE.captures(text.trim())?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()?
        .as_str()
        .parse()
        .ok()
}

/// Book `request` with a freshly generated passenger
pub async fn purchase_end_to_end<D: PageDriver>(
    driver: &mut D,
    site: &SiteConfig,
    request: &TripRequest,
) -> TripResult<BookingResult> {
    let passenger = Passenger::random();
    purchase_with_passenger(driver, site, request, &passenger).await
}

/// Book `request` with the given passenger.
///
/// Fails with `Navigation` when a page transition never completes, the flight
/// index is past the listed flights, or both cities are the same. Fails with
/// `ElementNotFound` when a control the flow needs is missing.
pub async fn purchase_with_passenger<D: PageDriver>(
    driver: &mut D,
    site: &SiteConfig,
    request: &TripRequest,
    passenger: &Passenger,
) -> TripResult<BookingResult> {
    info!("=== Booking {} ===", request);

    let mut home = HomePage::open(driver, site).await?;

    if request.has_same_cities() {
        return Err(TripError::Navigation {
            step: "search".to_string(),
            locator: site.map.flight_rows.to_string(),
            reason: format!("no route from {} to itself", request.origin),
        });
    }

    home.select_departure(&request.origin).await?;
    home.select_destination(&request.destination).await?;
    let flights = home.find_flights().await?;

    let mut purchase = flights.choose(request.flight_index).await?;
    purchase.fill_passenger(passenger).await?;
    let confirmation = purchase.purchase().await?;

    let booking = confirmation.read().await?;
    info!(
        "Booked {}: status {}, price {}",
        request, booking.status, booking.price_text
    );
    Ok(booking)
}
