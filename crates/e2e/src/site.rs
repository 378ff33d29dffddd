//! BlazeDemo site coupling
//!
//! Every selector the flow relies on lives in [`SiteMap`]. If the site's
//! markup changes, this is the only file that should need to follow it.

use crate::locator::Locator;

pub const BLAZEDEMO_URL: &str = "https://blazedemo.com/";
pub const CONFIRMATION_HEADING: &str = "Thank you for your purchase today!";
pub const CONFIRMED_STATUS: &str = "PendingCapture";

/// What the suite expects from the site under test
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Home page URL
    pub base_url: String,

    /// `<h1>` text of the confirmation page
    pub confirmation_heading: String,

    /// Status row value of a successful booking
    pub confirmed_status: String,

    /// Booked price must be strictly greater than this
    pub min_price: f64,

    pub catalog: RouteCatalog,

    pub map: SiteMap,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: BLAZEDEMO_URL.to_string(),
            confirmation_heading: CONFIRMATION_HEADING.to_string(),
            confirmed_status: CONFIRMED_STATUS.to_string(),
            min_price: 0.0,
            catalog: RouteCatalog::default(),
            map: SiteMap::default(),
        }
    }
}

/// Cities offered by the route-selection form
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    pub departures: Vec<String>,
    pub destinations: Vec<String>,
    /// Flights listed per route on the results page
    pub flights_per_route: usize,
}

impl Default for RouteCatalog {
    fn default() -> Self {
        let departures = [
            "Paris",
            "Philadelphia",
            "Boston",
            "Portland",
            "San Diego",
            "Mexico City",
            "São Paolo",
        ];
        let destinations = [
            "Buenos Aires",
            "Rome",
            "London",
            "Berlin",
            "New York",
            "Dublin",
            "Cairo",
        ];

        Self {
            departures: departures.iter().map(|c| c.to_string()).collect(),
            destinations: destinations.iter().map(|c| c.to_string()).collect(),
            flights_per_route: 5,
        }
    }
}

impl RouteCatalog {
    pub fn is_departure(&self, city: &str) -> bool {
        self.departures.iter().any(|c| c == city)
    }

    pub fn is_destination(&self, city: &str) -> bool {
        self.destinations.iter().any(|c| c == city)
    }
}

/// Locators for each page of the booking flow
#[derive(Debug, Clone)]
pub struct SiteMap {
    // Home page
    pub departure_select: Locator,
    pub destination_select: Locator,
    pub find_flights: Locator,

    // Results page
    pub flight_rows: Locator,
    /// Resolved inside a row from `flight_rows`
    pub choose_flight: Locator,

    // Purchase page
    pub passenger_name: Locator,
    pub address: Locator,
    pub city: Locator,
    pub state: Locator,
    pub zip_code: Locator,
    pub card_type: Locator,
    pub card_number: Locator,
    pub card_month: Locator,
    pub card_year: Locator,
    pub name_on_card: Locator,
    pub purchase: Locator,

    // Confirmation page
    pub heading: Locator,
    pub status: Locator,
    pub amount: Locator,
    pub confirmation_id: Locator,
}

impl Default for SiteMap {
    fn default() -> Self {
        Self {
            departure_select: Locator::name("fromPort"),
            destination_select: Locator::name("toPort"),
            find_flights: Locator::css("input[type='submit']"),

            flight_rows: Locator::css("table tbody tr"),
            choose_flight: Locator::css("input[type='submit']"),

            passenger_name: Locator::id("inputName"),
            address: Locator::id("address"),
            city: Locator::id("city"),
            state: Locator::id("state"),
            zip_code: Locator::id("zipCode"),
            card_type: Locator::id("cardType"),
            card_number: Locator::id("creditCardNumber"),
            card_month: Locator::id("creditCardMonth"),
            card_year: Locator::id("creditCardYear"),
            name_on_card: Locator::id("nameOnCard"),
            purchase: Locator::css("input[type='submit']"),

            heading: Locator::css("h1"),
            status: Locator::table_value("Status"),
            amount: Locator::table_value("Amount"),
            confirmation_id: Locator::table_value("Id"),
        }
    }
}
