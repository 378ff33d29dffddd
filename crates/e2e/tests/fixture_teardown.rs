//! Session fixture teardown guarantees

mod support;

use blazedemo_e2e::{purchase_end_to_end, with_session, PageDriver, SiteConfig, TripError, TripRequest};
use support::{FakeFactory, FakeSite};

#[tokio::test]
async fn session_closed_once_after_pass() {
    let factory = FakeFactory::default();
    let site = SiteConfig::default();

    let booking = with_session(&factory, |session| {
        Box::pin(async move {
            purchase_end_to_end(session, &site, &TripRequest::new("Paris", "Rome", 0)).await
        })
    })
    .await
    .unwrap();

    assert_eq!(booking.status, "PendingCapture");
    assert_eq!(factory.counters.opened(), 1);
    assert_eq!(factory.counters.closed(), 1);
}

#[tokio::test]
async fn session_closed_once_after_assertion_failure() {
    let factory = FakeFactory::default();

    let err = with_session(&factory, |_session| {
        Box::pin(async move { Err::<(), _>(TripError::assertion("booking status", "PendingCapture", "Declined")) })
    })
    .await
    .unwrap_err();

    assert!(err.is_failure());
    assert_eq!(factory.counters.closed(), 1);
}

#[tokio::test]
async fn session_closed_once_after_navigation_error() {
    let factory = FakeFactory::default();
    let site = SiteConfig::default();

    let err = with_session(&factory, |session| {
        Box::pin(async move {
            purchase_end_to_end(session, &site, &TripRequest::new("Paris", "Rome", 9999)).await
        })
    })
    .await
    .unwrap_err();

    assert!(err.is_navigation());
    assert_eq!(factory.counters.closed(), 1);
}

#[tokio::test]
async fn session_closed_once_after_panic() {
    let factory = FakeFactory::default();

    let err = with_session(&factory, |session| {
        Box::pin(async move {
            session.goto("https://blazedemo.com/").await?;
            if session.find_all(&blazedemo_e2e::Locator::css("h1")).await?.is_empty() {
                panic!("no heading on the home page");
            }
            Ok(())
        })
    })
    .await
    .unwrap_err();

    match err {
        TripError::ScenarioPanicked(msg) => assert_eq!(msg, "no heading on the home page"),
        other => panic!("expected a caught panic, got {other:?}"),
    }
    assert_eq!(factory.counters.closed(), 1);
}

#[tokio::test]
async fn body_closing_early_is_not_closed_twice() {
    let factory = FakeFactory::default();

    with_session(&factory, |session| Box::pin(async move { session.close().await }))
        .await
        .unwrap();

    assert_eq!(factory.counters.closed(), 1);
}

#[tokio::test]
async fn open_failure_skips_the_body() {
    let factory = FakeFactory::failing();
    let mut ran = false;

    let err = with_session(&factory, |_session| {
        ran = true;
        Box::pin(async { Ok(()) })
    })
    .await
    .unwrap_err();

    assert!(matches!(err, TripError::DriverStartup(_)));
    assert!(!ran);
    assert_eq!(factory.counters.opened(), 0);
    assert_eq!(factory.counters.closed(), 0);
}

#[tokio::test]
async fn close_failure_after_pass_is_an_error() {
    let mut template = FakeSite::new();
    template.fail_close = true;
    let factory = FakeFactory::new(template);

    let err = with_session(&factory, |_session| Box::pin(async { Ok(()) }))
        .await
        .unwrap_err();

    assert!(matches!(err, TripError::WebDriver(_)));
    assert_eq!(factory.counters.closed(), 1);
}

#[tokio::test]
async fn close_failure_does_not_mask_the_scenario_error() {
    let mut template = FakeSite::new();
    template.fail_close = true;
    let factory = FakeFactory::new(template);

    let err = with_session(&factory, |_session| {
        Box::pin(async { Err::<(), _>(TripError::assertion("price", "> 0", "0")) })
    })
    .await
    .unwrap_err();

    assert!(err.is_failure());
}
