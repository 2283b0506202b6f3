use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::PopupAuthError;

/// One authorization attempt: the page to open and how to recognize its end.
///
/// A `redirect_prefix` selects the OAuth redirect flow. Without one the popup
/// is expected to land on a direct callback carrying `token` / `PayerID`
/// (PayPal order approval).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub authorization_url: Url,
    pub popup_width: Option<u32>,
    pub popup_height: Option<u32>,
    pub redirect_prefix: Option<String>,
}

impl AuthorizationRequest {
    /// Parses `authorization_url` and takes the redirect prefix from its
    /// `redirect_uri` query parameter, if any.
    pub fn new(authorization_url: &str) -> Result<Self, PopupAuthError> {
        let authorization_url = Url::parse(authorization_url)?;
        let redirect_prefix = authorization_url
            .query_pairs()
            .find(|(key, _)| key == "redirect_uri")
            .filter(|(_, value)| !value.is_empty())
            .map(|(_, value)| normalize_prefix(&value));

        Ok(Self {
            authorization_url,
            popup_width: None,
            popup_height: None,
            redirect_prefix,
        })
    }

    pub fn with_popup_size(mut self, width: u32, height: u32) -> Self {
        self.popup_width = Some(width);
        self.popup_height = Some(height);
        self
    }

    pub fn with_redirect_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.redirect_prefix = Some(normalize_prefix(&prefix.into()));
        self
    }

    pub fn without_redirect_prefix(mut self) -> Self {
        self.redirect_prefix = None;
        self
    }

    /// PayPal order id carried as `token` on the approval URL.
    pub fn order_id(&self) -> Option<String> {
        self.authorization_url
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    pub fn flow(&self) -> FlowKind {
        match &self.redirect_prefix {
            Some(prefix) => FlowKind::Redirect {
                prefix: prefix.clone(),
            },
            None => FlowKind::DirectCallback,
        }
    }
}

/// Popup locations are compared in `Url`'s serialized form (lowercase host,
/// default port dropped), so the prefix is brought into the same form. A
/// prefix that is not an absolute URL is kept as given.
fn normalize_prefix(prefix: &str) -> String {
    match Url::parse(prefix) {
        Ok(url) => url.to_string(),
        Err(_) => prefix.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowKind {
    /// Capture once the popup URL starts with `prefix`.
    Redirect { prefix: String },
    /// Decide from the `token` / `PayerID` query parameters alone.
    DirectCallback,
}

/// Query parameters captured from the popup's final URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackFields(BTreeMap<String, String>);

impl CallbackFields {
    pub fn from_url(url: &Url) -> Self {
        url.query_pairs().into_owned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    pub fn token(&self) -> Option<&str> {
        self.get("token")
    }

    pub fn payer_id(&self) -> Option<&str> {
        self.get("PayerID")
    }

    /// Fails when the provider reported an `error` in the callback.
    pub fn check_error(&self) -> Result<(), PopupAuthError> {
        match self.get("error") {
            Some(error) => Err(PopupAuthError::Provider {
                error: error.to_string(),
                description: self.get("error_description").map(str::to_string),
            }),
            None => Ok(()),
        }
    }

    /// Fails when a returned `state` differs from `expected`. A callback
    /// without `state` passes.
    pub fn check_state(&self, expected: &str) -> Result<(), PopupAuthError> {
        match self.state() {
            Some(received) if received != expected => Err(PopupAuthError::StateMismatch {
                expected: expected.to_string(),
                received: received.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Fails unless the returned `token` is the order the approval was
    /// started for.
    pub fn check_token(&self, expected_order_id: &str) -> Result<(), PopupAuthError> {
        match self.token() {
            Some(received) if received == expected_order_id => Ok(()),
            Some(received) => Err(PopupAuthError::OrderMismatch {
                expected: expected_order_id.to_string(),
                received: received.to_string(),
            }),
            None => Err(PopupAuthError::MissingOrderToken),
        }
    }
}

impl FromIterator<(String, String)> for CallbackFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    Timeout,
    UserClosed,
    UserCancelled,
}

/// Result of one attempt, committed to the host as its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        fields: CallbackFields,
    },
    Cancelled {
        reason: CancelReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
}

impl Outcome {
    pub fn cancelled(reason: CancelReason) -> Self {
        Self::Cancelled {
            reason,
            token: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn fields(&self) -> Option<&CallbackFields> {
        match self {
            Self::Success { fields } => Some(fields),
            Self::Cancelled { .. } => None,
        }
    }
}
