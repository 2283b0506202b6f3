use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior, Sleep};
use tracing::{debug, trace, warn};
use url::Url;

use crate::popup::{LocationError, PopupWindow};
use crate::{CallbackFields, CancelReason, FlowKind, Outcome, PopupAuthError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(300_000);

/// What a single popup URL means for the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Pending,
    Capture,
    Cancel { token: String },
}

/// Classifies the popup's current URL for the given flow.
pub fn classify(flow: &FlowKind, location: &Url) -> Classification {
    match flow {
        FlowKind::Redirect { prefix } => {
            if location.as_str().starts_with(prefix.as_str()) {
                Classification::Capture
            } else {
                Classification::Pending
            }
        }
        FlowKind::DirectCallback => {
            let mut token = None;
            let mut payer_id = false;
            for (key, value) in location.query_pairs() {
                match key.as_ref() {
                    "token" => token = Some(value.into_owned()),
                    "PayerID" => payer_id = true,
                    _ => {}
                }
            }

            match (token, payer_id) {
                (Some(_), true) => Classification::Capture,
                (Some(token), false) => Classification::Cancel { token },
                (None, _) => Classification::Pending,
            }
        }
    }
}

/// Watches one popup until it yields an [`Outcome`].
///
/// `tick` and `expire` are the two events that can end the attempt. Whichever
/// resolves first wins; every call after that is a no-op returning `None`.
#[derive(Debug)]
pub struct Poller<P> {
    popup: P,
    flow: FlowKind,
    interval: Duration,
    timeout: Option<Duration>,
    resolved: bool,
}

impl<P: PopupWindow> Poller<P> {
    pub fn new(popup: P, flow: FlowKind) -> Self {
        Self {
            popup,
            flow,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_TIMEOUT),
            resolved: false,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Timeout for the direct-callback flow. Redirect flows never time out.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn popup(&self) -> &P {
        &self.popup
    }

    /// One inspection of the popup.
    ///
    /// A closed popup is checked before its location. Cross-origin reads keep
    /// the attempt pending; any other read failure ends it with an error.
    pub fn tick(&mut self) -> Result<Option<Outcome>, PopupAuthError> {
        if self.resolved {
            return Ok(None);
        }

        if self.popup.is_closed() {
            return Ok(Some(self.resolve(Outcome::cancelled(CancelReason::UserClosed))));
        }

        let location = match self.popup.location() {
            Ok(location) => location,
            Err(LocationError::CrossOrigin) => {
                trace!("popup still cross-origin");
                return Ok(None);
            }
            Err(LocationError::Other(message)) => {
                warn!(%message, "failed to read popup location");
                self.resolved = true;
                self.close_popup();
                return Err(PopupAuthError::LocationRead { message });
            }
        };

        match classify(&self.flow, &location) {
            Classification::Pending => Ok(None),
            Classification::Capture => {
                self.close_popup();
                let fields = CallbackFields::from_url(&location);
                Ok(Some(self.resolve(Outcome::Success { fields })))
            }
            Classification::Cancel { token } => {
                self.close_popup();
                Ok(Some(self.resolve(Outcome::Cancelled {
                    reason: CancelReason::UserCancelled,
                    token: Some(token),
                })))
            }
        }
    }

    /// The timeout fired.
    pub fn expire(&mut self) -> Option<Outcome> {
        if self.resolved {
            return None;
        }
        self.close_popup();
        Some(self.resolve(Outcome::cancelled(CancelReason::Timeout)))
    }

    /// Drives `tick` every interval and `expire` once the timeout elapses,
    /// until one of them resolves.
    ///
    /// The first tick runs one interval after the call. Both timers are
    /// dropped on return.
    pub async fn run(mut self) -> Result<Outcome, PopupAuthError> {
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut deadline = match (&self.flow, self.timeout) {
            (FlowKind::DirectCallback, Some(timeout)) => Some(Box::pin(time::sleep(timeout))),
            _ => None,
        };

        loop {
            tokio::select! {
                biased;

                _ = ticker.tick() => {
                    if let Some(outcome) = self.tick()? {
                        return Ok(outcome);
                    }
                }
                _ = wait_deadline(&mut deadline) => {
                    deadline = None;
                    if let Some(outcome) = self.expire() {
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    fn close_popup(&mut self) {
        if !self.popup.is_closed() {
            self.popup.close();
        }
    }

    fn resolve(&mut self, outcome: Outcome) -> Outcome {
        self.resolved = true;
        debug!(?outcome, "authorization attempt resolved");
        outcome
    }
}

async fn wait_deadline(deadline: &mut Option<Pin<Box<Sleep>>>) {
    match deadline {
        Some(sleep) => sleep.await,
        None => std::future::pending().await,
    }
}
