use super::locators::Locators;
use crate::{
    Result, SmokeError,
    config::Config,
    js_templates,
    timeouts::ms,
    utils,
};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Bounded-wait policy for readiness and visibility checks.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::timeouts::secs::VISIBILITY),
        }
    }
}

/// Tunables for the slow-scroll loop.
#[derive(Debug, Clone, Copy)]
pub struct ScrollPolicy {
    pub steps: u32,
    pub step_delay: Duration,
    pub min_chunk_px: u32,
    pub chunk_ratio: f64,
    /// Used when the viewport height cannot be read from the page.
    pub fallback_viewport_px: u32,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        let config = Config::default();
        Self::from_config(&config)
    }
}

impl ScrollPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            steps: config.scroll.steps,
            step_delay: Duration::from_millis(config.scroll.step_delay_ms),
            min_chunk_px: config.scroll.min_chunk_px,
            chunk_ratio: config.scroll.chunk_ratio,
            fallback_viewport_px: config.browser.window_height,
        }
    }

    fn chunk(&self, viewport_height: f64) -> i64 {
        let chunk = (viewport_height * self.chunk_ratio).round() as i64;
        chunk.max(i64::from(self.min_chunk_px))
    }
}

/// How a promo-dismissal attempt concluded. Soft outcomes, never errors:
/// the scroll loop proceeds regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoDismissal {
    NotPresent,
    CloseClicked,
    EscapeDismissed,
    ForceHidden,
}

impl PromoDismissal {
    pub fn handled(self) -> bool {
        !matches!(self, Self::NotPresent)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScrollSummary {
    pub steps_taken: u32,
    pub footer_reached: bool,
    pub promos_dismissed: u32,
    pub force_hidden: u32,
}

/// An element's box relative to the viewport, as reported by the page.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ViewportBox {
    pub top: f64,
    pub bottom: f64,
    #[serde(rename = "viewportHeight")]
    pub viewport_height: f64,
}

impl ViewportBox {
    pub fn fully_visible(&self) -> bool {
        self.top >= 0.0 && self.bottom <= self.viewport_height
    }
}

/// Page model for the landing flow. Wraps one browser page plus the
/// selector set and wait policy; callers invoke the operations in the
/// documented order (open, cookies, header, scroll, footer).
pub struct LandingPage {
    page: Arc<Page>,
    locators: Locators,
    wait: WaitPolicy,
    scroll: ScrollPolicy,
    default_url: String,
}

impl LandingPage {
    pub fn new(
        page: Arc<Page>,
        locators: Locators,
        wait: WaitPolicy,
        scroll: ScrollPolicy,
        default_url: impl Into<String>,
    ) -> Self {
        Self {
            page,
            locators,
            wait,
            scroll,
            default_url: default_url.into(),
        }
    }

    pub fn from_config(page: Arc<Page>, config: &Config) -> Self {
        Self::new(
            page,
            Locators::from_site(&config.site),
            WaitPolicy {
                timeout: Duration::from_secs(config.wait.visibility_timeout_secs),
            },
            ScrollPolicy::from_config(config),
            config.site.base_url.clone(),
        )
    }

    /// Navigate to the (normalized) base URL and wait until the page
    /// title becomes non-blank. A readiness timeout is a hard failure.
    pub async fn open(&self, base_url: &str) -> Result<String> {
        let url = utils::normalize_base_url(base_url, &self.default_url)?;
        tracing::info!("Opening {}", url);

        let nav_params = NavigateParams::builder()
            .url(url.clone())
            .build()
            .map_err(|e| SmokeError::General(format!("Failed to build navigate params: {}", e)))?;

        tokio::time::timeout(self.wait.timeout, self.page.execute(nav_params))
            .await
            .map_err(|_| SmokeError::NavigationTimeout(self.wait.timeout.as_secs()))?
            .map_err(|e| SmokeError::General(format!("Navigation failed: {}", e)))?;

        self.wait_for_title().await?;

        Ok(url)
    }

    async fn wait_for_title(&self) -> Result<()> {
        tokio::time::timeout(self.wait.timeout, async {
            loop {
                let title = self
                    .page
                    .evaluate("document.title")
                    .await
                    .ok()
                    .and_then(|r| r.into_value::<String>().ok())
                    .unwrap_or_default();

                if !title.trim().is_empty() {
                    return;
                }

                tokio::time::sleep(Duration::from_millis(ms::POLL_INTERVAL)).await;
            }
        })
        .await
        .map_err(|_| SmokeError::NavigationTimeout(self.wait.timeout.as_secs()))
    }

    /// Dismiss the cookie banner if a visible accept button exists.
    /// Never fails the scenario: driver errors are logged and treated
    /// as "no banner to dismiss".
    pub async fn accept_cookies_if_present(&self) -> bool {
        match self.try_accept_cookies().await {
            Ok(true) => {
                tracing::info!("Cookie banner accepted.");
                true
            }
            Ok(false) => {
                tracing::info!("No cookie banner present.");
                false
            }
            Err(e) => {
                tracing::debug!("Cookie banner not clickable / already gone: {}", e);
                false
            }
        }
    }

    async fn try_accept_cookies(&self) -> Result<bool> {
        if !self.is_visible(&self.locators.cookie_accept).await? {
            return Ok(false);
        }

        let clicked = self.click_first(&self.locators.cookie_accept).await?;
        if clicked {
            // Let the banner animate away before the next probe.
            tokio::time::sleep(Duration::from_millis(ms::BANNER_SETTLE)).await;
        }

        Ok(clicked)
    }

    pub async fn wait_for_header_visible(&self) -> bool {
        let visible = self.wait_for_visible(&self.locators.header).await;
        if visible {
            tracing::info!("Header is visible.");
        } else {
            tracing::info!("Header not visible within timeout.");
        }
        visible
    }

    pub async fn wait_for_footer_visible(&self) -> bool {
        let visible = self.wait_for_visible(&self.locators.footer).await;
        if visible {
            tracing::info!("Footer is visible.");
        } else {
            tracing::info!("Footer not visible within timeout.");
        }
        visible
    }

    async fn wait_for_visible(&self, selector: &str) -> bool {
        tokio::time::timeout(self.wait.timeout, async {
            loop {
                if self.is_visible(selector).await.unwrap_or(false) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(ms::POLL_INTERVAL)).await;
            }
        })
        .await
        .is_ok()
    }

    /// Scroll toward the footer in fixed steps, dismissing the promo
    /// dialog whenever it appears. Exits early once the footer's box is
    /// fully inside the viewport; otherwise ends with one direct
    /// scrollIntoView nudge. Nothing here aborts the scenario.
    pub async fn slow_scroll_toward_footer_and_handle_promo(&self) -> ScrollSummary {
        let viewport_height = self.viewport_height().await;
        let chunk = self.scroll.chunk(viewport_height);

        let mut promos_dismissed = 0u32;
        let mut force_hidden = 0u32;

        for step in 1..=self.scroll.steps {
            if let Err(e) = self.page.evaluate(js_templates::scroll_by(chunk)).await {
                tracing::debug!("Scroll step {} failed: {}", step, e);
            }
            tracing::debug!(" ... scrolled step {}/{}", step, self.scroll.steps);

            // If the promo pops while scrolling, close it immediately.
            let dismissal = self.dismiss_promo_if_present(step).await;
            if dismissal.handled() {
                promos_dismissed += 1;
                if dismissal == PromoDismissal::ForceHidden {
                    force_hidden += 1;
                }
                // Give layout a beat to reflow after the dialog goes.
                tokio::time::sleep(Duration::from_millis(ms::PROMO_REFLOW_SETTLE)).await;
            }

            tokio::time::sleep(self.scroll.step_delay).await;

            if self.is_footer_in_viewport().await {
                tracing::info!("Footer reached during slow scroll (step {}).", step);
                return ScrollSummary {
                    steps_taken: step,
                    footer_reached: true,
                    promos_dismissed,
                    force_hidden,
                };
            }
        }

        self.final_scroll_to_footer().await;

        ScrollSummary {
            steps_taken: self.scroll.steps,
            footer_reached: false,
            promos_dismissed,
            force_hidden,
        }
    }

    async fn viewport_height(&self) -> f64 {
        let height = self
            .page
            .evaluate(js_templates::INNER_HEIGHT)
            .await
            .ok()
            .and_then(|r| r.into_value::<f64>().ok());

        match height {
            Some(h) if h > 0.0 => h,
            _ => {
                tracing::debug!("Falling back to configured window height");
                f64::from(self.scroll.fallback_viewport_px)
            }
        }
    }

    async fn final_scroll_to_footer(&self) {
        let script = js_templates::scroll_into_view(&self.locators.footer);
        match self.page.evaluate(script).await {
            Ok(result) => {
                let found = result
                    .into_value::<Value>()
                    .ok()
                    .and_then(|v| v.get("found").and_then(Value::as_bool))
                    .unwrap_or(false);
                if found {
                    tracing::info!("Performed final scrollIntoView to footer.");
                } else {
                    tracing::info!("Footer not found in DOM after slow scroll.");
                }
            }
            Err(e) => tracing::debug!("Final footer scroll failed: {}", e),
        }
    }

    /// Attempt to dismiss the promo dialog. In order: explicit close
    /// affordance, escape key, forced hide. Driver errors degrade to
    /// `NotPresent` so the scroll loop proceeds.
    pub async fn dismiss_promo_if_present(&self, step: u32) -> PromoDismissal {
        match self.try_dismiss_promo(step).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!("Promo dismiss attempt hit {} at step {} (continuing).", e, step);
                PromoDismissal::NotPresent
            }
        }
    }

    async fn try_dismiss_promo(&self, step: u32) -> Result<PromoDismissal> {
        if !self.is_visible(&self.locators.promo_container).await? {
            return Ok(PromoDismissal::NotPresent);
        }

        if self.click_promo_close().await? {
            tokio::time::sleep(Duration::from_millis(ms::PROMO_CONFIRM)).await;
            if !self.is_visible(&self.locators.promo_container).await.unwrap_or(false) {
                tracing::info!("Promo dialog dismissed during scroll (step {}).", step);
                return Ok(PromoDismissal::CloseClicked);
            }
        }

        if self.press_escape().await.is_ok() {
            tokio::time::sleep(Duration::from_millis(ms::PROMO_CONFIRM)).await;
            if !self.is_visible(&self.locators.promo_container).await.unwrap_or(false) {
                tracing::info!("Promo dismissed via ESC (step {}).", step);
                return Ok(PromoDismissal::EscapeDismissed);
            }
        }

        // Last resort: hide the container outright. Does not depend on
        // the page's own dismissal logic, so it cannot fail to "work".
        self.page
            .evaluate(js_templates::force_hide(&self.locators.promo_container))
            .await
            .map_err(|e| SmokeError::EvaluationError(e.to_string()))?;
        tokio::time::sleep(Duration::from_millis(ms::FORCE_HIDE_SETTLE)).await;
        tracing::info!("Promo forcibly hidden (step {}).", step);

        Ok(PromoDismissal::ForceHidden)
    }

    async fn click_promo_close(&self) -> Result<bool> {
        let script = js_templates::click_first_visible(&self.locators.promo_close);
        let value: Value = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| SmokeError::EvaluationError(e.to_string()))?
            .into_value()
            .map_err(|e| SmokeError::EvaluationError(e.to_string()))?;

        let clicked = value
            .get("clicked")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if clicked {
            tracing::info!(
                "Promo close clicked: tag={} aria-label={} class={}",
                value.get("tag").and_then(serde_json::Value::as_str).unwrap_or("?"),
                value.get("aria").and_then(serde_json::Value::as_str).unwrap_or("-"),
                value.get("cls").and_then(serde_json::Value::as_str).unwrap_or("-"),
            );
        }

        Ok(clicked)
    }

    pub async fn is_footer_in_viewport(&self) -> bool {
        match self.footer_box().await {
            Some(rect) => rect.fully_visible(),
            None => false,
        }
    }

    async fn footer_box(&self) -> Option<ViewportBox> {
        let script = js_templates::bounding_rect(&self.locators.footer);
        let value: Value = self
            .page
            .evaluate(script)
            .await
            .ok()?
            .into_value()
            .ok()?;

        if !value.get("found").and_then(Value::as_bool).unwrap_or(false) {
            return None;
        }

        serde_json::from_value(value).ok()
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.page
            .evaluate(js_templates::visibility_check(selector))
            .await
            .map_err(|e| SmokeError::EvaluationError(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| SmokeError::EvaluationError(e.to_string()))
    }

    async fn click_first(&self, selector: &str) -> Result<bool> {
        let value: Value = self
            .page
            .evaluate(js_templates::click_first_visible(selector))
            .await
            .map_err(|e| SmokeError::EvaluationError(e.to_string()))?
            .into_value()
            .map_err(|e| SmokeError::EvaluationError(e.to_string()))?;

        Ok(value
            .get("clicked")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    async fn press_escape(&self) -> Result<()> {
        let key_down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key("Escape".to_string())
            .build()
            .map_err(|e| SmokeError::General(format!("Failed to build key down params: {}", e)))?;

        self.page
            .execute(key_down)
            .await
            .map_err(|e| SmokeError::General(format!("Failed to dispatch key down: {}", e)))?;

        let key_up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("Escape".to_string())
            .build()
            .map_err(|e| SmokeError::General(format!("Failed to build key up params: {}", e)))?;

        self.page
            .execute(key_up)
            .await
            .map_err(|e| SmokeError::General(format!("Failed to dispatch key up: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_box_inside_viewport_is_visible() {
        let rect = ViewportBox {
            top: 100.0,
            bottom: 900.0,
            viewport_height: 1080.0,
        };
        assert!(rect.fully_visible());
    }

    #[test]
    fn viewport_box_at_exact_bounds_is_visible() {
        let rect = ViewportBox {
            top: 0.0,
            bottom: 1080.0,
            viewport_height: 1080.0,
        };
        assert!(rect.fully_visible());
    }

    #[test]
    fn viewport_box_extending_below_is_not_visible() {
        let rect = ViewportBox {
            top: 500.0,
            bottom: 1300.0,
            viewport_height: 1080.0,
        };
        assert!(!rect.fully_visible());
    }

    #[test]
    fn viewport_box_above_viewport_is_not_visible() {
        let rect = ViewportBox {
            top: -50.0,
            bottom: 400.0,
            viewport_height: 1080.0,
        };
        assert!(!rect.fully_visible());
    }

    #[test]
    fn viewport_box_deserializes_page_shape() {
        let value = serde_json::json!({
            "found": true,
            "top": 12.5,
            "bottom": 700.0,
            "viewportHeight": 1080.0
        });
        let rect: ViewportBox = serde_json::from_value(value).unwrap();
        assert!(rect.fully_visible());
    }

    #[test]
    fn scroll_chunk_is_thirty_percent_of_viewport() {
        let policy = ScrollPolicy::default();
        assert_eq!(policy.chunk(1000.0), 300);
    }

    #[test]
    fn scroll_chunk_has_a_floor() {
        let policy = ScrollPolicy::default();
        assert_eq!(policy.chunk(400.0), 200);
        assert_eq!(policy.chunk(0.0), 200);
    }

    #[test]
    fn promo_dismissal_handled_mapping() {
        assert!(!PromoDismissal::NotPresent.handled());
        assert!(PromoDismissal::CloseClicked.handled());
        assert!(PromoDismissal::EscapeDismissed.handled());
        assert!(PromoDismissal::ForceHidden.handled());
    }
}
