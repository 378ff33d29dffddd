//! In-memory stand-in for the BlazeDemo site
//!
//! `FakeSite` models the four pages of the booking flow closely enough for
//! the page objects to walk it: it answers locator lookups from the default
//! `SiteMap`, moves between pages on the same clicks the real site does, and
//! records what was typed into the purchase form.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use blazedemo_e2e::passenger::CARD_TYPES;
use blazedemo_e2e::site::{RouteCatalog, SiteMap, CONFIRMATION_HEADING, CONFIRMED_STATUS};
use blazedemo_e2e::{Locator, PageDriver, SessionFactory, TripError, TripResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Blank,
    Home,
    Reserve,
    Purchase,
    Confirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
    Control(Locator),
    Row(usize),
    RowButton(usize),
}

/// Shared counters, readable after the session is gone
#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub screenshots: Arc<AtomicUsize>,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn screenshots(&self) -> usize {
        self.screenshots.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct FakeSite {
    map: SiteMap,
    catalog: RouteCatalog,
    page: Page,
    departure: Option<String>,
    destination: Option<String>,
    chosen: Option<usize>,
    form: HashMap<String, String>,
    closed: bool,
    counters: Counters,

    /// Flights listed on the results page
    pub flights: usize,
    pub status: String,
    pub price_text: String,
    /// Locators that resolve to nothing, as after a markup change
    pub missing: Vec<Locator>,
    /// Make `close` fail
    pub fail_close: bool,
}

impl Default for FakeSite {
    fn default() -> Self {
        Self {
            map: SiteMap::default(),
            catalog: RouteCatalog::default(),
            page: Page::Blank,
            departure: None,
            destination: None,
            chosen: None,
            form: HashMap::new(),
            closed: false,
            counters: Counters::default(),
            flights: 5,
            status: CONFIRMED_STATUS.to_string(),
            price_text: "555 USD".to_string(),
            missing: Vec::new(),
            fail_close: false,
        }
    }
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.counters = counters;
        self
    }

    pub fn without(mut self, locator: Locator) -> Self {
        self.missing.push(locator);
        self
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn chosen_flight(&self) -> Option<usize> {
        self.chosen
    }

    pub fn route(&self) -> (Option<&str>, Option<&str>) {
        (self.departure.as_deref(), self.destination.as_deref())
    }

    /// Value typed into the control at `locator`
    pub fn typed(&self, locator: &Locator) -> Option<&str> {
        self.form.get(&locator.to_string()).map(String::as_str)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn controls(&self) -> Vec<&Locator> {
        let m = &self.map;
        match self.page {
            Page::Blank | Page::Reserve => vec![],
            Page::Home => vec![&m.departure_select, &m.destination_select, &m.find_flights],
            Page::Purchase => vec![
                &m.passenger_name,
                &m.address,
                &m.city,
                &m.state,
                &m.zip_code,
                &m.card_type,
                &m.card_number,
                &m.card_month,
                &m.card_year,
                &m.name_on_card,
                &m.purchase,
            ],
            Page::Confirmation => vec![&m.heading, &m.status, &m.amount, &m.confirmation_id],
        }
    }

    fn resolve(&self, locator: &Locator) -> Vec<FakeElement> {
        if self.closed || self.missing.contains(locator) {
            return vec![];
        }
        if self.page == Page::Reserve && *locator == self.map.flight_rows {
            return (0..self.flights).map(FakeElement::Row).collect();
        }
        self.controls()
            .into_iter()
            .filter(|l| *l == locator)
            .map(|l| FakeElement::Control(l.clone()))
            .collect()
    }

    fn not_found(locator: &Locator) -> TripError {
        TripError::ElementNotFound {
            step: String::new(),
            locator: locator.to_string(),
        }
    }

    fn ensure_open(&self) -> TripResult<()> {
        if self.closed {
            return Err(TripError::WebDriver("session already closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for FakeSite {
    type Element = FakeElement;

    async fn goto(&mut self, _url: &str) -> TripResult<()> {
        self.ensure_open()?;
        self.page = Page::Home;
        self.departure = None;
        self.destination = None;
        self.chosen = None;
        self.form.clear();
        Ok(())
    }

    async fn find_one(&mut self, locator: &Locator) -> TripResult<FakeElement> {
        self.ensure_open()?;
        self.resolve(locator)
            .into_iter()
            .next()
            .ok_or_else(|| Self::not_found(locator))
    }

    async fn find_all(&mut self, locator: &Locator) -> TripResult<Vec<FakeElement>> {
        self.ensure_open()?;
        Ok(self.resolve(locator))
    }

    async fn find_within(&mut self, parent: &FakeElement, locator: &Locator) -> TripResult<FakeElement> {
        self.ensure_open()?;
        match parent {
            FakeElement::Row(i) if *locator == self.map.choose_flight && !self.missing.contains(locator) => {
                Ok(FakeElement::RowButton(*i))
            }
            _ => Err(Self::not_found(locator)),
        }
    }

    async fn wait_until_present(&mut self, locator: &Locator) -> TripResult<FakeElement> {
        self.ensure_open()?;
        self.resolve(locator)
            .into_iter()
            .next()
            .ok_or_else(|| TripError::Navigation {
                step: String::new(),
                locator: locator.to_string(),
                reason: "not interactable within 0 ms".to_string(),
            })
    }

    async fn click(&mut self, element: &FakeElement) -> TripResult<()> {
        self.ensure_open()?;
        match (self.page, element) {
            (Page::Home, FakeElement::Control(l)) if *l == self.map.find_flights => {
                self.page = Page::Reserve;
            }
            (Page::Reserve, FakeElement::RowButton(i)) => {
                self.chosen = Some(*i);
                self.page = Page::Purchase;
            }
            (Page::Purchase, FakeElement::Control(l)) if *l == self.map.purchase => {
                self.page = Page::Confirmation;
            }
            _ => {}
        }
        Ok(())
    }

    async fn fill(&mut self, element: &FakeElement, text: &str) -> TripResult<()> {
        self.ensure_open()?;
        if let FakeElement::Control(l) = element {
            self.form.insert(l.to_string(), text.to_string());
        }
        Ok(())
    }

    async fn select_by_text(&mut self, element: &FakeElement, label: &str) -> TripResult<()> {
        self.ensure_open()?;
        let option = Locator::xpath(format!(".//option[.='{}']", label));
        let FakeElement::Control(l) = element else {
            return Err(Self::not_found(&option));
        };

        if *l == self.map.departure_select {
            if !self.catalog.is_departure(label) {
                return Err(Self::not_found(&option));
            }
            self.departure = Some(label.to_string());
        } else if *l == self.map.destination_select {
            if !self.catalog.is_destination(label) {
                return Err(Self::not_found(&option));
            }
            self.destination = Some(label.to_string());
        } else if *l == self.map.card_type {
            if !CARD_TYPES.contains(&label) {
                return Err(Self::not_found(&option));
            }
            self.form.insert(l.to_string(), label.to_string());
        } else {
            return Err(Self::not_found(&option));
        }
        Ok(())
    }

    async fn text(&mut self, element: &FakeElement) -> TripResult<String> {
        self.ensure_open()?;
        let FakeElement::Control(l) = element else {
            return Ok(String::new());
        };
        let m = &self.map;
        let text = if *l == m.heading {
            CONFIRMATION_HEADING.to_string()
        } else if *l == m.status {
            self.status.clone()
        } else if *l == m.amount {
            self.price_text.clone()
        } else if *l == m.confirmation_id {
            "1555342384524".to_string()
        } else {
            self.form.get(&l.to_string()).cloned().unwrap_or_default()
        };
        Ok(text)
    }

    async fn screenshot(&mut self) -> TripResult<Vec<u8>> {
        self.ensure_open()?;
        self.counters.screenshots.fetch_add(1, Ordering::SeqCst);
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    async fn close(&mut self) -> TripResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(TripError::WebDriver("browser did not quit".into()));
        }
        Ok(())
    }
}

/// Hands out clones of a template site and counts sessions
#[derive(Debug, Clone, Default)]
pub struct FakeFactory {
    pub template: FakeSite,
    pub counters: Counters,
    /// Refuse to open sessions, as when the browser cannot start
    pub fail_open: bool,
}

impl FakeFactory {
    pub fn new(template: FakeSite) -> Self {
        Self {
            template,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeSite;

    async fn open(&self) -> TripResult<FakeSite> {
        if self.fail_open {
            return Err(TripError::DriverStartup("browser binary missing".into()));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(self.template.clone().with_counters(self.counters.clone()))
    }
}
