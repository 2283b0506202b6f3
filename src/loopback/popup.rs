use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

use axum::{Router, routing::get};
use tokio::net::TcpListener as TokioTcpListener;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{info, warn};
use url::Url;

use crate::PopupAuthError;
use crate::popup::{LocationError, PopupGeometry, PopupWindow, WindowOpener};

use super::config::LoopbackConfig;
use super::http::{
    LoopbackState, Observed, SharedObserved, callback_handler, fallback_handler, record_failure,
};

type BrowserHook = Arc<dyn Fn(&str) -> io::Result<()> + Send + Sync>;

/// Opens the authorization URL in the system browser and watches for it to
/// arrive on a loopback callback URL.
#[derive(Clone)]
pub struct LoopbackOpener {
    config: LoopbackConfig,
    browser: BrowserHook,
}

impl LoopbackOpener {
    /// Without a browser hook the URL is only logged.
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            config,
            browser: Arc::new(log_url),
        }
    }

    pub fn with_browser<F>(mut self, browser: F) -> Self
    where
        F: Fn(&str) -> io::Result<()> + Send + Sync + 'static,
    {
        self.browser = Arc::new(browser);
        self
    }

    pub fn config(&self) -> &LoopbackConfig {
        &self.config
    }
}

fn log_url(url: &str) -> io::Result<()> {
    info!(%url, "open this url to continue");
    Ok(())
}

impl WindowOpener for LoopbackOpener {
    type Popup = LoopbackPopup;

    /// Must be called from within a tokio runtime.
    fn open(
        &self,
        url: &Url,
        _target_name: &str,
        _geometry: &PopupGeometry,
    ) -> Result<Option<LoopbackPopup>, PopupAuthError> {
        let listener = TcpListener::bind(self.config.bind_addrs()?.as_slice())?;
        let mut popup = LoopbackPopup::serve(listener, &self.config)?;

        if let Err(err) = (self.browser)(url.as_str()) {
            warn!(%err, "failed to open browser");
            popup.close();
            return Ok(None);
        }
        Ok(Some(popup))
    }
}

/// The browser window as seen from the loopback listener.
///
/// The location stays cross-origin until the browser requests the callback
/// path. Closing the browser tab is not observable; only [`close`] marks the
/// popup closed.
///
/// [`close`]: PopupWindow::close
#[derive(Debug)]
pub struct LoopbackPopup {
    observed: SharedObserved,
    shutdown: Option<oneshot::Sender<()>>,
    local_addr: SocketAddr,
}

impl LoopbackPopup {
    /// Serves the callback on an already bound listener.
    pub fn serve(listener: TcpListener, config: &LoopbackConfig) -> Result<Self, PopupAuthError> {
        let handle = Handle::try_current().map_err(|err| PopupAuthError::InvalidResponse {
            message: err.to_string(),
        })?;
        let local_addr = listener.local_addr()?;
        let observed: SharedObserved = Arc::new(Mutex::new(Observed::default()));

        let state = LoopbackState {
            callback: config.callback_url().clone(),
            success_html: config.success_html.clone(),
            error_html: config.error_html.clone(),
            observed: observed.clone(),
        };
        let app = Router::new()
            .route(config.path(), get(callback_handler))
            .fallback(fallback_handler)
            .with_state(state);

        listener.set_nonblocking(true)?;
        let listener = TokioTcpListener::from_std(listener)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        let observed_for_server = observed.clone();
        handle.spawn(async move {
            if let Err(err) = server.await {
                record_failure(&observed_for_server, err.to_string());
            }
        });

        info!(%local_addr, "listening for authorization callback");
        Ok(Self {
            observed,
            shutdown: Some(shutdown_tx),
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl PopupWindow for LoopbackPopup {
    fn is_closed(&self) -> bool {
        self.observed.lock().map(|guard| guard.closed).unwrap_or(true)
    }

    fn location(&self) -> Result<Url, LocationError> {
        let guard = self
            .observed
            .lock()
            .map_err(|err| LocationError::Other(err.to_string()))?;
        if let Some(failure) = &guard.failure {
            return Err(LocationError::Other(failure.clone()));
        }
        guard.location.clone().ok_or(LocationError::CrossOrigin)
    }

    fn close(&mut self) {
        if let Ok(mut guard) = self.observed.lock() {
            guard.closed = true;
        }
        self.shutdown();
    }
}

impl Drop for LoopbackPopup {
    fn drop(&mut self) {
        self.shutdown();
    }
}
