use std::time::Duration;

use crate::poller::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, Poller};
use crate::popup::{self, WindowOpener};
use crate::{AuthorizationRequest, Outcome, PopupAuthError};

const DEFAULT_POPUP_WIDTH: u32 = 600;
const DEFAULT_POPUP_HEIGHT: u32 = 800;
const DEFAULT_TARGET_NAME: &str = "oauthWidget";

#[derive(Debug, Clone)]
pub struct PopupFlowConfig {
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
    pub default_width: u32,
    pub default_height: u32,
    pub target_name: String,
}

impl Default for PopupFlowConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_TIMEOUT),
            default_width: DEFAULT_POPUP_WIDTH,
            default_height: DEFAULT_POPUP_HEIGHT,
            target_name: DEFAULT_TARGET_NAME.to_string(),
        }
    }
}

impl PopupFlowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Only applies to direct-callback requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_default_size(mut self, width: u32, height: u32) -> Self {
        self.default_width = width;
        self.default_height = height;
        self
    }

    pub fn with_target_name(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = target_name.into();
        self
    }
}

/// Runs authorization attempts through a [`WindowOpener`].
#[derive(Debug, Clone)]
pub struct PopupFlow<O: WindowOpener> {
    opener: O,
    config: PopupFlowConfig,
}

impl<O: WindowOpener> PopupFlow<O> {
    pub fn new(opener: O, config: PopupFlowConfig) -> Self {
        Self { opener, config }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn config(&self) -> &PopupFlowConfig {
        &self.config
    }

    /// Opens the popup for `request` and waits for its outcome.
    ///
    /// Cancellations and timeouts resolve to an [`Outcome`]; only a blocked
    /// popup, a bad request or an unexpected location read error is `Err`.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<Outcome, PopupAuthError> {
        let popup = popup::launch(
            &self.opener,
            request,
            &self.config.target_name,
            (self.config.default_width, self.config.default_height),
        )?;

        Poller::new(popup, request.flow())
            .with_interval(self.config.poll_interval)
            .with_timeout(self.config.timeout)
            .run()
            .await
    }
}
