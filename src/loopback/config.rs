use std::io;
use std::net::SocketAddr;

use url::Url;

use crate::PopupAuthError;

pub(crate) const DEFAULT_SUCCESS_HTML: &str = include_str!("html/success.html");
pub(crate) const DEFAULT_ERROR_HTML: &str = include_str!("html/error.html");

/// The `http://` callback URL the loopback listener answers on, plus the pages
/// it serves.
#[derive(Debug, Clone)]
pub struct LoopbackConfig {
    callback: Url,
    pub success_html: String,
    pub error_html: String,
}

impl LoopbackConfig {
    /// Validates `callback_url` once; query and fragment are dropped.
    pub fn from_callback_url(callback_url: &str) -> Result<Self, PopupAuthError> {
        let mut callback = Url::parse(callback_url)?;
        if callback.scheme() != "http" {
            return Err(PopupAuthError::InvalidRedirectUri(format!(
                "loopback callback must use http, got {}",
                callback.scheme()
            )));
        }
        if callback.host_str().is_none_or(str::is_empty) {
            return Err(PopupAuthError::InvalidRedirectUri(
                "callback url is missing host".to_string(),
            ));
        }
        callback.set_query(None);
        callback.set_fragment(None);

        Ok(Self {
            callback,
            success_html: DEFAULT_SUCCESS_HTML.to_string(),
            error_html: DEFAULT_ERROR_HTML.to_string(),
        })
    }

    pub fn callback_url(&self) -> &Url {
        &self.callback
    }

    /// Route the listener serves; always starts with `/`.
    pub fn path(&self) -> &str {
        self.callback.path()
    }

    pub fn port(&self) -> u16 {
        self.callback.port_or_known_default().unwrap_or(80)
    }

    pub(crate) fn bind_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        self.callback.socket_addrs(|| Some(80))
    }

    pub fn with_success_html(mut self, html: impl Into<String>) -> Self {
        self.success_html = html.into();
        self
    }

    pub fn with_error_html(mut self, html: impl Into<String>) -> Self {
        self.error_html = html.into();
        self
    }
}
