//! Checks applied to the outcome of a purchase

use tracing::info;

use crate::error::{TripError, TripResult};
use crate::site::SiteConfig;
use crate::trip::{parse_price, BookingResult};

/// Positive path: the booking went through with a sane price
pub fn assert_confirmed(booking: &BookingResult, site: &SiteConfig) -> TripResult<()> {
    if booking.heading != site.confirmation_heading {
        return Err(TripError::assertion(
            "confirmation heading",
            &site.confirmation_heading,
            &booking.heading,
        ));
    }

    if booking.status != site.confirmed_status {
        return Err(TripError::assertion(
            "booking status",
            &site.confirmed_status,
            &booking.status,
        ));
    }

    let price = parse_price(&booking.price_text).ok_or_else(|| {
        TripError::assertion("price format", "currency amount", &booking.price_text)
    })?;

    if price <= site.min_price {
        return Err(TripError::assertion(
            "price",
            format!("> {}", site.min_price),
            price,
        ));
    }

    info!(
        "Confirmed: {} / {} / {}",
        booking.heading, booking.status, booking.price_text
    );
    Ok(())
}

/// Negative path: the flow must stop short of confirmation with a
/// navigation error. Reaching confirmation is a failure; any other error is
/// passed through unchanged.
pub fn expect_navigation_error(outcome: TripResult<BookingResult>) -> TripResult<TripError> {
    match outcome {
        Err(err) if err.is_navigation() => {
            info!("Flow stopped as expected: {}", err);
            Ok(err)
        }
        Err(err) => Err(err),
        Ok(booking) => Err(TripError::assertion(
            "flow outcome",
            "navigation error",
            format!("booking confirmed with status {}", booking.status),
        )),
    }
}
