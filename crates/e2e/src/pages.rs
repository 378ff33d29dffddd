//! Page objects for the booking flow
//!
//! Each page borrows the driver for as long as the flow is on it and hands it
//! to the next page on transition. Every lookup waits for its element before
//! acting on it.

use tracing::{debug, info};

use crate::error::{TripError, TripResult};
use crate::locator::PageDriver;
use crate::passenger::Passenger;
use crate::site::SiteConfig;
use crate::trip::BookingResult;

pub struct HomePage<'a, D: PageDriver> {
    driver: &'a mut D,
    site: &'a SiteConfig,
}

impl<'a, D: PageDriver> HomePage<'a, D> {
    pub async fn open(driver: &'a mut D, site: &'a SiteConfig) -> TripResult<Self> {
        info!("Opening {}", site.base_url);
        driver.goto(&site.base_url).await.map_err(|e| e.at_step("open_home"))?;
        driver
            .wait_until_present(&site.map.departure_select)
            .await
            .map_err(|e| e.at_step("open_home"))?;
        Ok(Self { driver, site })
    }

    pub async fn select_departure(&mut self, city: &str) -> TripResult<()> {
        debug!("Departure: {}", city);
        let select = self
            .driver
            .wait_until_present(&self.site.map.departure_select)
            .await
            .map_err(|e| e.at_step("select_departure"))?;
        self.driver
            .select_by_text(&select, city)
            .await
            .map_err(|e| e.at_step("select_departure"))
    }

    pub async fn select_destination(&mut self, city: &str) -> TripResult<()> {
        debug!("Destination: {}", city);
        let select = self
            .driver
            .wait_until_present(&self.site.map.destination_select)
            .await
            .map_err(|e| e.at_step("select_destination"))?;
        self.driver
            .select_by_text(&select, city)
            .await
            .map_err(|e| e.at_step("select_destination"))
    }

    pub async fn find_flights(self) -> TripResult<FlightsPage<'a, D>> {
        let submit = self
            .driver
            .wait_until_present(&self.site.map.find_flights)
            .await
            .map_err(|e| e.at_step("find_flights"))?;
        self.driver
            .click(&submit)
            .await
            .map_err(|e| e.at_step("find_flights"))?;
        Ok(FlightsPage {
            driver: self.driver,
            site: self.site,
        })
    }
}

pub struct FlightsPage<'a, D: PageDriver> {
    driver: &'a mut D,
    site: &'a SiteConfig,
}

impl<'a, D: PageDriver> FlightsPage<'a, D> {
    /// Number of flights listed for the searched route
    pub async fn flight_count(&mut self) -> TripResult<usize> {
        self.driver
            .wait_until_present(&self.site.map.flight_rows)
            .await
            .map_err(|e| e.at_step("list_flights"))?;
        let rows = self
            .driver
            .find_all(&self.site.map.flight_rows)
            .await
            .map_err(|e| e.at_step("list_flights"))?;
        Ok(rows.len())
    }

    /// Choose the flight in row `index` (0-based)
    pub async fn choose(self, index: usize) -> TripResult<PurchasePage<'a, D>> {
        let map = &self.site.map;
        self.driver
            .wait_until_present(&map.flight_rows)
            .await
            .map_err(|e| e.at_step("choose_flight"))?;
        let rows = self
            .driver
            .find_all(&map.flight_rows)
            .await
            .map_err(|e| e.at_step("choose_flight"))?;

        let row = rows.get(index).ok_or_else(|| TripError::Navigation {
            step: "choose_flight".to_string(),
            locator: map.flight_rows.to_string(),
            reason: format!(
                "flight index {} out of range, {} flight(s) listed",
                index,
                rows.len()
            ),
        })?;

        info!("Choosing flight #{} of {}", index, rows.len());
        let button = self
            .driver
            .find_within(row, &map.choose_flight)
            .await
            .map_err(|e| e.at_step("choose_flight"))?;
        self.driver
            .click(&button)
            .await
            .map_err(|e| e.at_step("choose_flight"))?;

        Ok(PurchasePage {
            driver: self.driver,
            site: self.site,
        })
    }
}

pub struct PurchasePage<'a, D: PageDriver> {
    driver: &'a mut D,
    site: &'a SiteConfig,
}

impl<'a, D: PageDriver> PurchasePage<'a, D> {
    pub async fn fill_passenger(&mut self, passenger: &Passenger) -> TripResult<()> {
        let map = &self.site.map;
        self.driver
            .wait_until_present(&map.passenger_name)
            .await
            .map_err(|e| e.at_step("fill_passenger"))?;

        let fields = [
            (&map.passenger_name, passenger.name.clone()),
            (&map.address, passenger.address.clone()),
            (&map.city, passenger.city.clone()),
            (&map.state, passenger.state.clone()),
            (&map.zip_code, passenger.zip_code.clone()),
            (&map.card_number, passenger.card_number.clone()),
            (&map.card_month, passenger.card_month.to_string()),
            (&map.card_year, passenger.card_year.to_string()),
            (&map.name_on_card, passenger.name_on_card.clone()),
        ];

        for (locator, value) in fields.iter() {
            let input = self
                .driver
                .find_one(locator)
                .await
                .map_err(|e| e.at_step("fill_passenger"))?;
            self.driver
                .fill(&input, value)
                .await
                .map_err(|e| e.at_step("fill_passenger"))?;
        }

        let card_type = self
            .driver
            .find_one(&map.card_type)
            .await
            .map_err(|e| e.at_step("fill_passenger"))?;
        self.driver
            .select_by_text(&card_type, &passenger.card_type)
            .await
            .map_err(|e| e.at_step("fill_passenger"))?;

        debug!("Passenger form filled for {}", passenger.name);
        Ok(())
    }

    pub async fn purchase(self) -> TripResult<ConfirmationPage<'a, D>> {
        let submit = self
            .driver
            .wait_until_present(&self.site.map.purchase)
            .await
            .map_err(|e| e.at_step("purchase"))?;
        self.driver
            .click(&submit)
            .await
            .map_err(|e| e.at_step("purchase"))?;
        Ok(ConfirmationPage {
            driver: self.driver,
            site: self.site,
        })
    }
}

pub struct ConfirmationPage<'a, D: PageDriver> {
    driver: &'a mut D,
    site: &'a SiteConfig,
}

impl<'a, D: PageDriver> ConfirmationPage<'a, D> {
    /// Read the booking off the confirmation page
    pub async fn read(self) -> TripResult<BookingResult> {
        let map = &self.site.map;

        let status = self
            .driver
            .wait_until_present(&map.status)
            .await
            .map_err(|e| e.at_step("confirmation"))?;
        let status = self.driver.text(&status).await?;

        let amount = self
            .driver
            .find_one(&map.amount)
            .await
            .map_err(|e| e.at_step("confirmation"))?;
        let price_text = self.driver.text(&amount).await?;

        let heading = self
            .driver
            .find_one(&map.heading)
            .await
            .map_err(|e| e.at_step("confirmation"))?;
        let heading = self.driver.text(&heading).await?;

        // Not every deployment renders the Id row
        let confirmation_id = match self.driver.find_one(&map.confirmation_id).await {
            Ok(cell) => Some(self.driver.text(&cell).await?.trim().to_string()),
            Err(TripError::ElementNotFound { .. }) => None,
            Err(e) => return Err(e.at_step("confirmation")),
        };

        Ok(BookingResult::new(
            heading.trim(),
            status.trim(),
            price_text.trim(),
            confirmation_id,
        ))
    }
}
