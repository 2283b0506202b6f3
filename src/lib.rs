//! Popup-window authorization flows.
//!
//! Opens a centered popup on a provider's authorization page, polls the
//! popup's location until it lands on the callback, and resolves exactly one
//! [`Outcome`]: the captured query parameters, or a cancellation (user closed
//! the popup, user cancelled at the provider, or timeout). Covers OAuth 2.0
//! redirect flows and PayPal order approval. No token exchange is done here.

mod error;
mod flow;
#[cfg(feature = "loopback")]
mod loopback;
mod poller;
mod popup;
mod types;
mod widget;

pub use error::PopupAuthError;
pub use flow::{PopupFlow, PopupFlowConfig};
#[cfg(feature = "loopback")]
pub use loopback::{LoopbackConfig, LoopbackOpener, LoopbackPopup};
pub use poller::{Classification, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, Poller, classify};
pub use popup::{LocationError, PopupGeometry, PopupWindow, ScreenSize, WindowOpener, launch};
pub use types::{AuthorizationRequest, CallbackFields, CancelReason, FlowKind, Outcome};
pub use widget::{AuthorizeButton, ButtonView, Host, RenderArgs};
