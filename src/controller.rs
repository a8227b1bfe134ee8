use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    client::PredictClient,
    counter::ScanCounter,
    render,
    types::{ScanError, ScanVerdict, UiEvent},
};

/// Lifecycle of the one request a controller may have active.
#[derive(Debug, Clone)]
pub enum ScanRequestState {
    Idle,
    InFlight {
        cancel: CancellationToken,
        generation: u64,
    },
    Completed,
}

/// Observable phase of the controller, without the cancellation handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    InFlight,
    Completed,
}

#[derive(Debug)]
struct ControllerState {
    request: ScanRequestState,
    /// Bumped once per submission; a settling task whose generation is no
    /// longer current is stale and must not render.
    generation: u64,
    scanned_count: u64,
}

/// Owner of the single in-flight scan request.
///
/// Validates input, issues the request, supersedes any prior in-flight
/// request, and routes settlements into the renderer. UI-facing output goes
/// over the event channel; the view layer applies it to a display surface.
/// Controllers are independent instances, so tests can run several side by
/// side.
#[derive(Clone)]
pub struct ScanController {
    inner: Arc<RwLock<ControllerState>>,
    client: PredictClient,
    counter: Arc<ScanCounter>,
    events: mpsc::UnboundedSender<UiEvent>,
}

impl ScanController {
    /// Build a controller. The persisted scan counter is loaded once, here.
    pub fn new(
        client: PredictClient,
        counter: Arc<ScanCounter>,
        events: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        let scanned_count = counter.load();
        Self {
            inner: Arc::new(RwLock::new(ControllerState {
                request: ScanRequestState::Idle,
                generation: 0,
                scanned_count,
            })),
            client,
            counter,
            events,
        }
    }

    /// Submit a candidate URL for scanning.
    ///
    /// Empty (after trimming) input is rejected before any network call.
    /// A prior in-flight request is cancelled first, so at most one request
    /// is ever logically active; its late settlement, if any, is discarded.
    pub async fn submit_scan(&self, raw_input: &str) {
        let url = match validate_input(raw_input) {
            Ok(url) => url,
            Err(err) => {
                self.emit(UiEvent::ShowError(render::classify_error(user_message(
                    &err,
                ))));
                return;
            }
        };

        let cancel = CancellationToken::new();
        let generation;
        {
            let mut s = self.inner.write().await;
            if let ScanRequestState::InFlight { cancel: prior, .. } = &s.request {
                prior.cancel();
            }
            s.generation += 1;
            generation = s.generation;
            s.request = ScanRequestState::InFlight {
                cancel: cancel.clone(),
                generation,
            };
        }
        self.emit(UiEvent::ShowLoading);

        let this = self.clone();
        tokio::spawn(async move {
            let outcome = this.client.predict(&url, &cancel).await;
            this.settle(generation, &cancel, outcome).await;
        });
    }

    /// The "clear/cancel" input event: abort any in-flight request and
    /// return to idle. Never surfaces an error.
    pub async fn cancel(&self) {
        let mut s = self.inner.write().await;
        if let ScanRequestState::InFlight { cancel, .. } = &s.request {
            cancel.cancel();
        }
        s.request = ScanRequestState::Idle;
    }

    /// Current in-memory scan counter value.
    pub async fn scan_count(&self) -> u64 {
        self.inner.read().await.scanned_count
    }

    pub async fn phase(&self) -> ScanPhase {
        match self.inner.read().await.request {
            ScanRequestState::Idle => ScanPhase::Idle,
            ScanRequestState::InFlight { .. } => ScanPhase::InFlight,
            ScanRequestState::Completed => ScanPhase::Completed,
        }
    }

    /// Apply a settlement, unless this request was superseded or cancelled
    /// in the meantime. The generation check catches a stale success that
    /// arrives before its cancellation is even observed.
    async fn settle(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        outcome: Result<ScanVerdict, ScanError>,
    ) {
        let mut s = self.inner.write().await;
        let current = matches!(
            &s.request,
            ScanRequestState::InFlight { generation: g, .. } if *g == generation
        );
        if !current || cancel.is_cancelled() {
            debug!(generation, "discarding settlement of superseded scan");
            return;
        }
        s.request = ScanRequestState::Completed;

        match outcome {
            Ok(verdict) => {
                s.scanned_count += 1;
                if let Err(err) = self.counter.save(s.scanned_count) {
                    // Non-fatal: the scan result still renders.
                    warn!(count = s.scanned_count, error = %err, "counter persist failed");
                }
                self.emit(UiEvent::CounterUpdated(s.scanned_count));
                self.emit(UiEvent::ShowResult(render::classify(&verdict)));
            }
            Err(ScanError::Cancelled) => {
                debug!(generation, "scan cancelled before settlement");
            }
            Err(err) => {
                warn!(error = %err, "scan failed");
                self.emit(UiEvent::ShowError(render::classify_error(user_message(
                    &err,
                ))));
            }
        }
    }

    fn emit(&self, event: UiEvent) {
        // A dropped receiver just means no view layer is listening.
        let _ = self.events.send(event);
    }
}

fn validate_input(raw_input: &str) -> Result<String, ScanError> {
    let url = raw_input.trim();
    if url.is_empty() {
        return Err(ScanError::Validation("empty input".to_string()));
    }
    Ok(url.to_string())
}

/// Generic user-facing message for the errors that are allowed to surface.
fn user_message(err: &ScanError) -> &'static str {
    match err {
        ScanError::Validation(_) => "Please enter a URL to scan",
        _ => "Failed to scan URL. Please try again.",
    }
}
