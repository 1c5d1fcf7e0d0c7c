use crate::{
    Result, SmokeError,
    browser::{BrowserKind, SessionRegistry, WorkerId},
    config::Config,
    output::{self, OutputFormatter},
    page::LandingPage,
    timeouts::ms,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const HEADER_ASSERT_MESSAGE: &str = "Header should be visible after landing.";
pub const FOOTER_ASSERT_MESSAGE: &str = "Footer should be visible after scrolling.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub status: StepStatus,
    pub detail: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub base_url: String,
    pub browser: String,
    pub headless: bool,
    pub steps: Vec<StepReport>,
    pub passed: bool,
    pub total_ms: u64,
}

impl ScenarioReport {
    fn new(base_url: &str, browser: BrowserKind, headless: bool) -> Self {
        Self {
            base_url: base_url.to_string(),
            browser: browser.to_string(),
            headless,
            steps: Vec::new(),
            passed: true,
            total_ms: 0,
        }
    }

    fn record_passed(&mut self, step: &str, detail: impl Into<String>, elapsed: Duration) {
        self.steps.push(StepReport {
            step: step.to_string(),
            status: StepStatus::Passed,
            detail: detail.into(),
            elapsed_ms: elapsed.as_millis() as u64,
        });
    }

    fn record_failed(&mut self, step: &str, detail: impl Into<String>, elapsed: Duration) {
        self.passed = false;
        self.steps.push(StepReport {
            step: step.to_string(),
            status: StepStatus::Failed,
            detail: detail.into(),
            elapsed_ms: elapsed.as_millis() as u64,
        });
    }

    fn record_skipped(&mut self, step: &str) {
        self.steps.push(StepReport {
            step: step.to_string(),
            status: StepStatus::Skipped,
            detail: "skipped after earlier failure".to_string(),
            elapsed_ms: 0,
        });
    }
}

impl OutputFormatter for ScenarioReport {
    fn format_text(&self) -> String {
        use crate::output::text;

        let mut lines = vec![text::section(&format!(
            "Smoke scenario: {} ({}, headless={})",
            self.base_url, self.browser, self.headless
        ))];

        for step in &self.steps {
            let line = format!(
                "{}: {} ({})",
                step.step,
                step.detail,
                text::format_duration_ms(step.elapsed_ms)
            );
            lines.push(match step.status {
                StepStatus::Passed => text::success(&line),
                StepStatus::Failed => text::error(&line),
                StepStatus::Skipped => text::skipped(&line),
            });
        }

        let verdict = if self.passed {
            text::success(&format!(
                "PASSED in {}",
                text::format_duration_ms(self.total_ms)
            ))
        } else {
            text::error(&format!(
                "FAILED in {}",
                text::format_duration_ms(self.total_ms)
            ))
        };
        lines.push(verdict);

        lines.join("\n")
    }

    fn format_json(&self, pretty: bool) -> Result<String> {
        output::to_json(self, pretty)
    }
}

/// The fixed five-step landing flow: open, cookies, header, scroll,
/// footer. Owns nothing but a handle to the registry; the browser
/// session is started in setup and released unconditionally in
/// teardown.
pub struct SmokeScenario {
    registry: Arc<SessionRegistry>,
    worker: WorkerId,
    config: Arc<Config>,
}

impl SmokeScenario {
    pub fn new(registry: Arc<SessionRegistry>, worker: WorkerId, config: Arc<Config>) -> Self {
        Self {
            registry,
            worker,
            config,
        }
    }

    pub async fn run(
        &self,
        kind: BrowserKind,
        headless: bool,
        base_url: &str,
    ) -> Result<ScenarioReport> {
        let started = Instant::now();

        tracing::info!(
            "==== Scenario setup: browser={}, headless={}, base_url={} ====",
            kind,
            headless,
            base_url
        );
        self.registry.start(&self.worker, kind, headless).await?;

        let outcome = self.run_steps(kind, headless, base_url).await;

        tracing::info!("==== Scenario teardown ====");
        self.registry.stop(&self.worker).await;

        let mut report = outcome?;
        report.total_ms = started.elapsed().as_millis() as u64;
        Ok(report)
    }

    async fn run_steps(
        &self,
        kind: BrowserKind,
        headless: bool,
        base_url: &str,
    ) -> Result<ScenarioReport> {
        let page = self
            .registry
            .page(&self.worker)
            .await
            .ok_or_else(|| SmokeError::General("No active browser session".to_string()))?;

        let home = LandingPage::from_config(page, &self.config);
        let mut report = ScenarioReport::new(base_url, kind, headless);

        tracing::info!("STEP 1: Land on {}", base_url);
        let step_start = Instant::now();
        let opened_url = home.open(base_url).await?;
        report.base_url = opened_url.clone();
        report.record_passed("open", format!("loaded {}", opened_url), step_start.elapsed());
        pause().await;

        tracing::info!("STEP 2: Accept cookie banner (if present)");
        let step_start = Instant::now();
        let accepted = home.accept_cookies_if_present().await;
        let detail = if accepted {
            "cookie banner accepted"
        } else {
            "no cookie banner present"
        };
        report.record_passed("cookies", detail, step_start.elapsed());
        pause().await;

        tracing::info!("STEP 3: Verify HEADER is visible");
        let step_start = Instant::now();
        if home.wait_for_header_visible().await {
            report.record_passed("header", "header visible", step_start.elapsed());
        } else {
            report.record_failed("header", HEADER_ASSERT_MESSAGE, step_start.elapsed());
            report.record_skipped("scroll");
            report.record_skipped("footer");
            return Ok(report);
        }
        pause().await;

        tracing::info!("STEP 4: Slow scroll toward FOOTER (promo dialog may appear)");
        let step_start = Instant::now();
        let summary = home.slow_scroll_toward_footer_and_handle_promo().await;
        report.record_passed("scroll", describe_scroll(&summary), step_start.elapsed());
        pause().await;

        tracing::info!("STEP 5: Verify FOOTER is visible");
        let step_start = Instant::now();
        if home.wait_for_footer_visible().await {
            report.record_passed("footer", "footer visible", step_start.elapsed());
        } else {
            report.record_failed("footer", FOOTER_ASSERT_MESSAGE, step_start.elapsed());
        }

        Ok(report)
    }
}

fn describe_scroll(summary: &crate::page::ScrollSummary) -> String {
    let mut detail = if summary.footer_reached {
        format!("footer reached at step {}", summary.steps_taken)
    } else {
        format!(
            "footer not reached after {} steps, final nudge issued",
            summary.steps_taken
        )
    };

    if summary.promos_dismissed > 0 {
        detail.push_str(&format!(", {} promo(s) dismissed", summary.promos_dismissed));
        if summary.force_hidden > 0 {
            detail.push_str(&format!(" ({} force-hidden)", summary.force_hidden));
        }
    }

    detail
}

async fn pause() {
    tokio::time::sleep(Duration::from_millis(ms::STEP_PAUSE)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ScrollSummary;

    fn report() -> ScenarioReport {
        ScenarioReport::new("https://inseego.com", BrowserKind::Chrome, true)
    }

    #[test]
    fn report_starts_passed_and_empty() {
        let report = report();
        assert!(report.passed);
        assert!(report.steps.is_empty());
    }

    #[test]
    fn failed_step_marks_report_failed() {
        let mut report = report();
        report.record_passed("open", "loaded", Duration::from_millis(10));
        report.record_failed("header", HEADER_ASSERT_MESSAGE, Duration::from_secs(12));

        assert!(!report.passed);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[1].status, StepStatus::Failed);
        assert_eq!(report.steps[1].detail, HEADER_ASSERT_MESSAGE);
    }

    #[test]
    fn skipped_steps_do_not_flip_outcome() {
        let mut report = report();
        report.record_skipped("scroll");
        assert!(report.passed);
        assert_eq!(report.steps[0].status, StepStatus::Skipped);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = report();
        report.record_passed("open", "loaded https://inseego.com", Duration::from_millis(900));

        let json = report.format_json(false).unwrap();
        assert!(json.contains("\"passed\":true"));
        assert!(json.contains("\"status\":\"passed\""));
    }

    #[test]
    fn scroll_description_covers_both_paths() {
        let reached = ScrollSummary {
            steps_taken: 9,
            footer_reached: true,
            promos_dismissed: 1,
            force_hidden: 1,
        };
        let detail = describe_scroll(&reached);
        assert!(detail.contains("footer reached at step 9"));
        assert!(detail.contains("1 promo(s) dismissed"));
        assert!(detail.contains("force-hidden"));

        let missed = ScrollSummary {
            steps_taken: 22,
            footer_reached: false,
            promos_dismissed: 0,
            force_hidden: 0,
        };
        let detail = describe_scroll(&missed);
        assert!(detail.contains("final nudge"));
    }
}
