//! Session poller and renderer
//!
//! One `SessionController` stands in for one open page: it submits prompts,
//! polls the resulting session on a fixed interval and renders each snapshot
//! into its surface until the session reaches a terminal status.
//!
//! All state lives in the controller and every operation takes `&mut self`,
//! so there is never more than one status fetch in flight per controller.
//! Ticks that fall due while a slow fetch is still running are skipped
//! rather than queued.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::client::{ApiError, SessionApi};
use crate::config::Config;
use crate::domain::{PipelineStatus, SessionId, StatusSnapshot};
use crate::surface::{SubmitState, Surface, apply_update};
use crate::view::{Region, RegionContent, StatusLabels, ViewOptions, plan_update};

/// Default delay between status fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Controller behavior
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub poll_interval: Duration,
    /// Refuse new prompts until the current session is terminal
    pub disable_submit_while_processing: bool,
    pub view: ViewOptions,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            disable_submit_while_processing: true,
            view: ViewOptions::default(),
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll.interval_ms),
            disable_submit_while_processing: config.ui.disable_submit_while_processing,
            view: ViewOptions {
                labels: StatusLabels::with_overrides(&config.ui.status_labels),
                show_generated_prompts: config.ui.show_generated_prompts,
            },
        }
    }
}

/// Why a prompt was not submitted
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please enter a prompt")]
    EmptyPrompt,

    #[error("Still processing the previous prompt")]
    Busy,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Why a followed session did not complete
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session ended with status '{0}'")]
    Ended(PipelineStatus),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of a single poll tick
#[derive(Debug)]
pub enum PollOutcome {
    /// No session is active; nothing was fetched
    Idle,
    /// Snapshot rendered, session still running
    Updated(PipelineStatus),
    /// Snapshot rendered and the session reached a terminal status
    Finished(PipelineStatus),
    /// The fetch failed; polling has stopped
    Failed(ApiError),
}

impl PollOutcome {
    /// Whether polling is over after this outcome
    pub fn is_final(&self) -> bool {
        !matches!(self, PollOutcome::Updated(_))
    }

    /// Only `completed` counts as success; a session still running is not
    /// a failure
    pub fn into_result(self) -> Result<(), SessionError> {
        match self {
            PollOutcome::Finished(PipelineStatus::Completed) => Ok(()),
            PollOutcome::Finished(status) => Err(SessionError::Ended(status)),
            PollOutcome::Failed(e) => Err(e.into()),
            PollOutcome::Idle | PollOutcome::Updated(_) => Ok(()),
        }
    }
}

pub struct SessionController<S: Surface> {
    api: Arc<dyn SessionApi>,
    surface: S,
    options: ControllerOptions,
    session: Option<SessionId>,
    ticker: Option<Interval>,
}

impl<S: Surface> SessionController<S> {
    pub fn new(api: Arc<dyn SessionApi>, surface: S, options: ControllerOptions) -> Self {
        debug!(?options, "SessionController::new: called");
        Self {
            api,
            surface,
            options,
            session: None,
            ticker: None,
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Whether a poll timer is running
    pub fn is_polling(&self) -> bool {
        self.ticker.is_some()
    }

    /// Whether a session is being processed
    pub fn is_processing(&self) -> bool {
        self.session.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Submit a prompt and start polling the new session
    ///
    /// Empty prompts are rejected before anything is touched. A creation
    /// failure is rendered into the parsing region and no polling starts.
    pub async fn submit(&mut self, prompt: &str) -> Result<SessionId, SubmitError> {
        let prompt = prompt.trim();
        debug!(prompt_len = prompt.len(), "submit: called");

        if prompt.is_empty() {
            debug!("submit: empty prompt");
            return Err(SubmitError::EmptyPrompt);
        }

        if self.options.disable_submit_while_processing && self.is_processing() {
            debug!(session_id = ?self.session, "submit: refused while processing");
            return Err(SubmitError::Busy);
        }

        // A new submission replaces whatever session was running
        self.stop_polling();

        self.surface.clear_regions();
        self.surface.clear_status_line();
        self.surface.show_results();
        self.surface.set_region(
            Region::Parsing,
            RegionContent::Text(self.options.view.labels.parsing_placeholder()),
        );
        if self.options.disable_submit_while_processing {
            self.surface.set_submit_state(SubmitState::Processing);
        }

        match self.api.create_session(prompt).await {
            Ok(session_id) => {
                info!(%session_id, "submit: session created");
                self.start_polling(session_id.clone());
                Ok(session_id)
            }
            Err(e) => {
                warn!(error = %e, "submit: failed to create session");
                self.surface
                    .set_region(Region::Parsing, RegionContent::Text(format!("Error: {}", e)));
                self.surface.set_submit_state(SubmitState::Ready);
                Err(e.into())
            }
        }
    }

    /// Start polling a session that already exists on the server
    pub fn attach(&mut self, session_id: SessionId) {
        debug!(%session_id, "attach: called");
        self.stop_polling();
        self.surface.clear_regions();
        self.surface.clear_status_line();
        self.surface.show_results();
        if self.options.disable_submit_while_processing {
            self.surface.set_submit_state(SubmitState::Processing);
        }
        self.start_polling(session_id);
    }

    /// Fetch the session's status once and render it
    ///
    /// Terminal statuses and fetch failures both stop polling and re-enable
    /// submission. Failures are not retried.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let Some(session_id) = self.session.clone() else {
            debug!("poll_once: no active session");
            return PollOutcome::Idle;
        };
        debug!(%session_id, "poll_once: called");

        match self.api.fetch_status(&session_id).await {
            Ok(snapshot) => {
                self.render(&snapshot);
                let status = snapshot.status;
                if status.is_terminal() {
                    info!(%session_id, %status, "poll_once: session finished");
                    self.finish();
                    PollOutcome::Finished(status)
                } else {
                    debug!(%session_id, %status, "poll_once: session in progress");
                    PollOutcome::Updated(status)
                }
            }
            Err(e) => {
                warn!(%session_id, error = %e, "poll_once: status fetch failed");
                self.surface.set_region(
                    Region::Parsing,
                    RegionContent::Text(format!("Error: failed to poll status: {}", e)),
                );
                self.finish();
                PollOutcome::Failed(e)
            }
        }
    }

    /// Render a snapshot into the surface
    ///
    /// Safe to call repeatedly with the same snapshot.
    pub fn render(&mut self, snapshot: &StatusSnapshot) {
        let update = plan_update(snapshot, &self.options.view);
        apply_update(&mut self.surface, update);
    }

    /// Wait for the next poll tick
    ///
    /// Returns false immediately when no timer is running.
    pub async fn next_tick(&mut self) -> bool {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
                true
            }
            None => false,
        }
    }

    /// Poll on every tick until the session is over
    ///
    /// Returns the outcome of the last poll, or `Idle` if nothing was
    /// being polled.
    pub async fn run_until_idle(&mut self) -> PollOutcome {
        let mut last = PollOutcome::Idle;
        while self.next_tick().await {
            last = self.poll_once().await;
            if last.is_final() {
                break;
            }
        }
        last
    }

    /// Poll right away, then keep polling until the session is over if
    /// `watch` is set
    pub async fn follow(&mut self, watch: bool) -> PollOutcome {
        debug!(watch, session_id = ?self.session, "follow: called");
        let first = self.poll_once().await;
        if !watch || first.is_final() {
            return first;
        }
        self.run_until_idle().await
    }

    fn start_polling(&mut self, session_id: SessionId) {
        let period = self.options.poll_interval.max(Duration::from_millis(1));
        debug!(%session_id, ?period, "start_polling: called");
        // First poll one full period after submission
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        self.session = Some(session_id);
    }

    fn stop_polling(&mut self) {
        if self.ticker.take().is_some() {
            debug!(session_id = ?self.session, "stop_polling: cancelled poll timer");
        }
        self.session = None;
    }

    fn finish(&mut self) {
        self.stop_polling();
        self.surface.set_submit_state(SubmitState::Ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockSessionApi;
    use crate::surface::MemorySurface;
    use serde_json::json;

    fn fast_options() -> ControllerOptions {
        ControllerOptions {
            poll_interval: Duration::from_millis(5),
            ..Default::default()
        }
    }

    fn controller(api: &Arc<MockSessionApi>, options: ControllerOptions) -> SessionController<MemorySurface> {
        SessionController::new(api.clone(), MemorySurface::new(), options)
    }

    #[tokio::test]
    async fn test_submit_creates_one_session_and_starts_polling() {
        let api = Arc::new(MockSessionApi::new().with_session("abc123"));
        let mut ctl = controller(&api, fast_options());

        let id = ctl.submit("  What is 2+2?  ").await.unwrap();

        assert_eq!(id.as_str(), "abc123");
        assert_eq!(api.create_count(), 1);
        assert_eq!(api.prompts(), vec!["What is 2+2?".to_string()]);
        assert!(ctl.is_polling());
        assert_eq!(ctl.session_id(), Some(&SessionId::from("abc123")));
        assert!(ctl.surface().results_visible());
        assert_eq!(ctl.surface().submit_state(), SubmitState::Processing);
        assert_eq!(ctl.surface().region_text(Region::Parsing), "Analyzing prompt...");
    }

    #[tokio::test]
    async fn test_empty_prompt_makes_no_request() {
        let api = Arc::new(MockSessionApi::new().with_session("abc123"));
        let mut ctl = controller(&api, fast_options());

        assert!(matches!(ctl.submit("").await, Err(SubmitError::EmptyPrompt)));
        assert!(matches!(ctl.submit("   \n\t").await, Err(SubmitError::EmptyPrompt)));

        assert_eq!(api.create_count(), 0);
        assert!(!ctl.is_polling());
        assert!(!ctl.surface().results_visible());
    }

    #[tokio::test]
    async fn test_submit_failure_shows_error_and_does_not_poll() {
        let api = Arc::new(MockSessionApi::new().with_create_error(ApiError::Http {
            status: 500,
            message: "Internal Server Error".to_string(),
        }));
        let mut ctl = controller(&api, fast_options());

        let result = ctl.submit("hello").await;

        assert!(matches!(result, Err(SubmitError::Api(_))));
        assert!(!ctl.is_polling());
        assert!(ctl.session_id().is_none());
        assert_eq!(
            ctl.surface().region_text(Region::Parsing),
            "Error: API error 500: Internal Server Error"
        );
        assert_eq!(ctl.surface().submit_state(), SubmitState::Ready);
    }

    #[tokio::test]
    async fn test_busy_while_processing() {
        let api = Arc::new(MockSessionApi::new().with_session("first").with_session("second"));
        let mut ctl = controller(&api, fast_options());

        ctl.submit("one").await.unwrap();
        assert!(matches!(ctl.submit("two").await, Err(SubmitError::Busy)));

        assert_eq!(api.create_count(), 1);
        assert_eq!(ctl.session_id(), Some(&SessionId::from("first")));
    }

    #[tokio::test]
    async fn test_resubmission_replaces_session_when_allowed() {
        let api = Arc::new(MockSessionApi::new().with_session("first").with_session("second"));
        let options = ControllerOptions {
            disable_submit_while_processing: false,
            ..fast_options()
        };
        let mut ctl = controller(&api, options);

        ctl.submit("one").await.unwrap();
        ctl.surface_mut()
            .set_region(Region::Coding, RegionContent::text("stale output"));

        ctl.submit("two").await.unwrap();

        assert_eq!(api.create_count(), 2);
        assert!(ctl.is_polling());
        assert_eq!(ctl.session_id(), Some(&SessionId::from("second")));
        assert_eq!(ctl.surface().region_text(Region::Coding), "");
        // Submit control is never disabled in this mode
        assert_eq!(ctl.surface().submit_state(), SubmitState::Ready);
    }

    #[tokio::test]
    async fn test_poll_without_session_is_noop() {
        let api = Arc::new(MockSessionApi::new());
        let mut ctl = controller(&api, fast_options());

        assert!(matches!(ctl.poll_once().await, PollOutcome::Idle));
        assert_eq!(api.fetch_count(), 0);
        assert!(!ctl.next_tick().await);
    }

    #[tokio::test]
    async fn test_completed_stops_polling() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_session("abc123")
                .with_snapshot(StatusSnapshot::new(PipelineStatus::Completed)),
        );
        let mut ctl = controller(&api, fast_options());
        ctl.submit("hi").await.unwrap();

        assert!(matches!(ctl.poll_once().await, PollOutcome::Finished(PipelineStatus::Completed)));
        assert!(!ctl.is_polling());
        assert_eq!(ctl.surface().submit_state(), SubmitState::Ready);

        // A later tick must not fetch again
        assert!(matches!(ctl.poll_once().await, PollOutcome::Idle));
        assert!(!ctl.next_tick().await);
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_error_is_terminal() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_session("abc123")
                .with_snapshot_json(json!({"status": "error", "error": "LLM quota exceeded"})),
        );
        let mut ctl = controller(&api, fast_options());
        ctl.submit("hi").await.unwrap();

        assert!(matches!(ctl.poll_once().await, PollOutcome::Finished(PipelineStatus::Error)));
        assert_eq!(ctl.surface().region_text(Region::Parsing), "Error: LLM quota exceeded");
        assert_eq!(ctl.surface().status_line(), Some("Error: LLM quota exceeded"));
        assert!(!ctl.is_polling());
        assert_eq!(ctl.surface().submit_state(), SubmitState::Ready);
    }

    #[tokio::test]
    async fn test_not_found_is_terminal() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_session("abc123")
                .with_snapshot_json(json!({"session_id": "abc123", "status": "not_found"})),
        );
        let mut ctl = controller(&api, fast_options());
        ctl.submit("hi").await.unwrap();

        assert!(matches!(ctl.poll_once().await, PollOutcome::Finished(PipelineStatus::NotFound)));
        assert!(!ctl.is_polling());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fail_fast() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_session("abc123")
                .with_fetch_error(ApiError::InvalidResponse("truncated body".to_string()))
                .with_snapshot(StatusSnapshot::new(PipelineStatus::Completed)),
        );
        let mut ctl = controller(&api, fast_options());
        ctl.submit("hi").await.unwrap();

        assert!(matches!(ctl.poll_once().await, PollOutcome::Failed(_)));
        assert_eq!(
            ctl.surface().region_text(Region::Parsing),
            "Error: failed to poll status: Invalid response: truncated body"
        );
        assert!(!ctl.is_polling());
        assert_eq!(ctl.surface().submit_state(), SubmitState::Ready);

        // No retry
        assert!(matches!(ctl.run_until_idle().await, PollOutcome::Idle));
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_identical_status_does_not_replace_status_line() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_session("abc123")
                .with_snapshot_json(json!({"status": "routing_to_llms"}))
                .with_snapshot_json(json!({"status": "routing_to_llms", "responses": {"coding": "x"}})),
        );
        let mut ctl = controller(&api, fast_options());
        ctl.submit("hi").await.unwrap();

        ctl.poll_once().await;
        ctl.poll_once().await;

        assert_eq!(ctl.surface().status_replacements(), 1);
        assert_eq!(ctl.surface().status_line(), Some("Sending prompts to specialized LLMs..."));
    }

    #[tokio::test]
    async fn test_responses_overwrite_not_append() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_session("abc123")
                .with_snapshot_json(json!({"status": "routing_to_llms", "responses": {"coding": "def f(): pass"}}))
                .with_snapshot_json(json!({"status": "combining_responses", "responses": {"coding": "updated"}})),
        );
        let mut ctl = controller(&api, fast_options());
        ctl.submit("write f").await.unwrap();

        ctl.poll_once().await;
        assert_eq!(ctl.surface().region_text(Region::Coding), "def f(): pass");
        ctl.poll_once().await;
        assert_eq!(ctl.surface().region_text(Region::Coding), "updated");
    }

    #[tokio::test]
    async fn test_render_is_idempotent() {
        let api = Arc::new(MockSessionApi::new());
        let mut ctl = controller(&api, fast_options());
        let snapshot: StatusSnapshot = serde_json::from_value(json!({
            "status": "generating_prompts",
            "parsed_categories": {"general_knowledge": "Not Applicable", "mathematics": "solve for x"}
        }))
        .unwrap();

        ctl.render(&snapshot);
        let first = ctl.surface().region_text(Region::Parsing);
        ctl.render(&snapshot);

        assert_eq!(ctl.surface().region_text(Region::Parsing), first);
        assert_eq!(
            first,
            "Parsed Categories:\n\nGeneral Knowledge: Not Applicable\nMathematics: Applicable\n"
        );
        assert_eq!(ctl.surface().status_replacements(), 1);
    }

    #[tokio::test]
    async fn test_full_scenario() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_session("abc123")
                .with_snapshot_json(json!({"session_id": "abc123", "status": "parsing"}))
                .with_snapshot_json(json!({
                    "session_id": "abc123",
                    "status": "completed",
                    "responses": {"mathematics": "4"},
                    "combined_response": "4"
                })),
        );
        let mut ctl = controller(&api, fast_options());

        ctl.submit("What is 2+2?").await.unwrap();

        assert!(ctl.next_tick().await);
        assert!(matches!(ctl.poll_once().await, PollOutcome::Updated(PipelineStatus::Parsing)));
        assert_eq!(ctl.surface().region_text(Region::Parsing), "Analyzing prompt...");
        assert_eq!(ctl.surface().submit_state(), SubmitState::Processing);

        let last = ctl.run_until_idle().await;
        assert!(matches!(last, PollOutcome::Finished(PipelineStatus::Completed)));
        assert_eq!(ctl.surface().region_text(Region::Mathematics), "4");
        assert_eq!(ctl.surface().region_text(Region::Combined), "4");
        assert_eq!(ctl.surface().status_line(), Some("Processing complete!"));
        assert!(!ctl.is_polling());
        assert_eq!(ctl.surface().submit_state(), SubmitState::Ready);
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_attach_polls_existing_session() {
        let api = Arc::new(
            MockSessionApi::new().with_snapshot_json(json!({"status": "completed", "combined_response": "done"})),
        );
        let mut ctl = controller(&api, fast_options());

        ctl.attach(SessionId::from("existing"));
        assert!(ctl.is_polling());

        let last = ctl.run_until_idle().await;
        assert!(matches!(last, PollOutcome::Finished(PipelineStatus::Completed)));
        assert_eq!(ctl.surface().region_text(Region::Combined), "done");
        assert_eq!(api.create_count(), 0);
    }

    #[tokio::test]
    async fn test_follow_reports_error_seen_on_first_fetch() {
        let api = Arc::new(MockSessionApi::new().with_snapshot_json(json!({"status": "error", "error": "boom"})));
        let mut ctl = controller(&api, fast_options());
        ctl.attach(SessionId::from("broken"));

        let outcome = ctl.follow(true).await;
        assert!(matches!(outcome, PollOutcome::Finished(PipelineStatus::Error)));
        assert!(matches!(outcome.into_result(), Err(SessionError::Ended(PipelineStatus::Error))));
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_follow_without_watch_polls_once() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_snapshot_json(json!({"status": "routing_to_llms"}))
                .with_snapshot(StatusSnapshot::new(PipelineStatus::Completed)),
        );
        let mut ctl = controller(&api, fast_options());
        ctl.attach(SessionId::from("running"));

        let outcome = ctl.follow(false).await;
        assert!(matches!(outcome, PollOutcome::Updated(PipelineStatus::RoutingToLlms)));
        assert!(outcome.into_result().is_ok());
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_follow_with_watch_runs_to_completion() {
        let api = Arc::new(
            MockSessionApi::new()
                .with_snapshot_json(json!({"status": "parsing"}))
                .with_snapshot_json(json!({"status": "not_found"})),
        );
        let mut ctl = controller(&api, fast_options());
        ctl.attach(SessionId::from("expired"));

        let outcome = ctl.follow(true).await;
        assert!(matches!(outcome, PollOutcome::Finished(PipelineStatus::NotFound)));
        assert!(outcome.into_result().is_err());
        assert_eq!(api.fetch_count(), 2);
    }

    #[test]
    fn test_outcome_into_result() {
        assert!(PollOutcome::Finished(PipelineStatus::Completed).into_result().is_ok());
        assert!(PollOutcome::Idle.into_result().is_ok());
        let err = PollOutcome::Failed(ApiError::InvalidResponse("bad".to_string()))
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid response: bad");
        let err = PollOutcome::Finished(PipelineStatus::Error).into_result().unwrap_err();
        assert_eq!(err.to_string(), "Session ended with status 'error'");
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.poll.interval_ms = 250;
        config.ui.disable_submit_while_processing = false;
        config.ui.show_generated_prompts = true;
        config
            .ui
            .status_labels
            .insert("completed".to_string(), "Done.".to_string());

        let options = ControllerOptions::from_config(&config);
        assert_eq!(options.poll_interval, Duration::from_millis(250));
        assert!(!options.disable_submit_while_processing);
        assert!(options.view.show_generated_prompts);
        assert_eq!(options.view.labels.get(&PipelineStatus::Completed), Some("Done."));
    }
}
