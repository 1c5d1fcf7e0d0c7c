//! Live smoke-flow tests.
//!
//! These drive a real Chrome over the DevTools protocol and are gated
//! behind `--ignored` because they need a local Chrome installation
//! (and, for the full flow, network access).
//!
//! Run with: cargo test --test smoke_flow -- --ignored

use landing_smoke::browser::{BrowserKind, SessionRegistry, WorkerId};
use landing_smoke::config::Config;
use landing_smoke::page::{LandingPage, Locators, PromoDismissal, ScrollPolicy, WaitPolicy};
use landing_smoke::scenario::SmokeScenario;
use std::sync::Arc;
use std::time::Duration;

fn headless_config() -> Arc<Config> {
    let mut config = Config::default();
    config.browser.headless = true;
    Arc::new(config)
}

#[tokio::test]
#[ignore = "requires a local Chrome installation and network access"]
async fn full_landing_flow_passes() {
    let config = headless_config();
    let registry = Arc::new(SessionRegistry::new(config.clone()));
    let scenario = SmokeScenario::new(registry.clone(), WorkerId::default(), config);

    let report = scenario
        .run(BrowserKind::Chrome, true, "https://inseego.com")
        .await
        .expect("scenario should complete");

    assert!(report.passed, "expected a passing report: {:?}", report);
    assert_eq!(report.steps.len(), 5);
    assert!(!registry.is_active(&WorkerId::default()).await);
}

#[tokio::test]
#[ignore = "requires a local Chrome installation"]
async fn start_is_idempotent_per_worker() {
    let config = headless_config();
    let registry = SessionRegistry::new(config);
    let worker = WorkerId::new("idempotence");

    registry
        .start(&worker, BrowserKind::Chrome, true)
        .await
        .expect("first start should succeed");
    registry
        .start(&worker, BrowserKind::Chrome, true)
        .await
        .expect("second start should be a no-op");

    assert_eq!(registry.active_count().await, 1);

    registry.stop(&worker).await;
    registry.stop(&worker).await;

    assert_eq!(registry.active_count().await, 0);
}

#[tokio::test]
#[ignore = "requires a local Chrome installation"]
async fn hidden_promo_container_is_not_handled() {
    let config = headless_config();
    let registry = SessionRegistry::new(config.clone());
    let worker = WorkerId::new("promo-hidden");

    registry
        .start(&worker, BrowserKind::Chrome, true)
        .await
        .expect("start should succeed");
    let page = registry.page(&worker).await.expect("page should exist");

    page.set_content("<html><body><div class='dialogContents' style='display:none'>promo</div></body></html>")
        .await
        .expect("set_content should succeed");

    let home = LandingPage::from_config(page, &config);
    let outcome = home.dismiss_promo_if_present(1).await;

    assert_eq!(outcome, PromoDismissal::NotPresent);
    assert!(!outcome.handled());

    registry.stop(&worker).await;
}

#[tokio::test]
#[ignore = "requires a local Chrome installation"]
async fn missing_header_reports_not_visible() {
    let config = headless_config();
    let registry = SessionRegistry::new(config.clone());
    let worker = WorkerId::new("no-header");

    registry
        .start(&worker, BrowserKind::Chrome, true)
        .await
        .expect("start should succeed");
    let page = registry.page(&worker).await.expect("page should exist");

    page.set_content("<html><head><title>bare</title></head><body><main>no header here</main></body></html>")
        .await
        .expect("set_content should succeed");

    // Short wait policy keeps the negative probe quick.
    let home = LandingPage::new(
        page,
        Locators::default(),
        WaitPolicy {
            timeout: Duration::from_secs(2),
        },
        ScrollPolicy::default(),
        "https://inseego.com",
    );

    assert!(!home.wait_for_header_visible().await);

    registry.stop(&worker).await;
}

#[tokio::test]
#[ignore = "requires a local Chrome installation"]
async fn visible_promo_without_close_affordance_is_force_hidden() {
    let config = headless_config();
    let registry = SessionRegistry::new(config.clone());
    let worker = WorkerId::new("promo-stubborn");

    registry
        .start(&worker, BrowserKind::Chrome, true)
        .await
        .expect("start should succeed");
    let page = registry.page(&worker).await.expect("page should exist");

    page.set_content("<html><body><div class='dialogContents'>stubborn promo</div></body></html>")
        .await
        .expect("set_content should succeed");

    let home = LandingPage::from_config(page.clone(), &config);
    let outcome = home.dismiss_promo_if_present(1).await;

    assert_eq!(outcome, PromoDismissal::ForceHidden);
    assert!(outcome.handled());

    // The safety valve must actually remove the dialog from view.
    let visible: bool = page
        .evaluate(landing_smoke::js_templates::visibility_check("div.dialogContents"))
        .await
        .expect("evaluate should succeed")
        .into_value()
        .expect("result should be a bool");
    assert!(!visible);

    registry.stop(&worker).await;
}
