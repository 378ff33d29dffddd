//! Scoped browser-session fixture
//!
//! [`with_session`] opens a session, lends it to the scenario body and closes
//! it afterwards. Close runs once whether the body returned `Ok`, returned an
//! error, or panicked.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::{TripError, TripResult};
use crate::locator::PageDriver;

/// Source of fresh browser sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: PageDriver;

    async fn open(&self) -> TripResult<Self::Session>;
}

/// Run `body` against a freshly opened session and tear the session down.
///
/// A session that fails to open is returned as the error without running the
/// body. A panic in the body becomes [`TripError::ScenarioPanicked`]. When the
/// body succeeded but closing the session failed, the close error is returned
/// so a leaked browser is not reported as a pass.
pub async fn with_session<F, T, B>(factory: &F, body: B) -> TripResult<T>
where
    F: SessionFactory,
    B: for<'s> FnOnce(&'s mut F::Session) -> BoxFuture<'s, TripResult<T>>,
{
    let mut session = factory.open().await?;
    debug!("Session opened");

    let outcome = AssertUnwindSafe(async { body(&mut session).await })
        .catch_unwind()
        .await;

    let closed = session.close().await;
    debug!("Session closed");

    match (outcome, closed) {
        (Ok(Ok(value)), Ok(())) => Ok(value),
        (Ok(Ok(_)), Err(close_err)) => Err(close_err),
        (Ok(Err(err)), closed) => {
            if let Err(close_err) = closed {
                warn!("Session close failed after scenario error: {}", close_err);
            }
            Err(err)
        }
        (Err(panic), closed) => {
            if let Err(close_err) = closed {
                warn!("Session close failed after scenario panic: {}", close_err);
            }
            Err(TripError::ScenarioPanicked(panic_message(panic.as_ref())))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
