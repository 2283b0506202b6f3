use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{AuthorizationRequest, PopupAuthError};

/// Chrome disabled on the popup; geometry is appended by [`PopupGeometry::features`].
const WINDOW_FEATURES: &str = "toolbar=no, location=no, directories=no, status=no, menubar=no, resizable=no, copyhistory=no";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Size and position of a popup centered on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupGeometry {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
}

impl PopupGeometry {
    /// Positions can go negative when the popup is larger than the screen.
    pub fn centered(screen: ScreenSize, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            left: centered_offset(screen.width, width),
            top: centered_offset(screen.height, height),
        }
    }

    /// `window.open` feature string.
    pub fn features(&self) -> String {
        format!(
            "{WINDOW_FEATURES},width={},height={},top={},left={}",
            self.width, self.height, self.top, self.left
        )
    }
}

fn centered_offset(screen: u32, popup: u32) -> i32 {
    let offset = (i64::from(screen) - i64::from(popup)) / 2;
    i32::try_from(offset).unwrap_or(if offset < 0 { i32::MIN } else { i32::MAX })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The popup is still on another origin. Normal while the user is on the
    /// provider's pages.
    #[error("popup location is cross-origin")]
    CrossOrigin,

    #[error("{0}")]
    Other(String),
}

/// A window opened by a [`WindowOpener`].
pub trait PopupWindow: Send {
    /// True once the window is gone, whoever closed it.
    fn is_closed(&self) -> bool;

    /// Current URL of the window, including its query string.
    fn location(&self) -> Result<Url, LocationError>;

    fn close(&mut self);

    fn focus(&mut self) {}
}

/// Creates popup windows; a browser `window.open` or a native stand-in.
pub trait WindowOpener: Send + Sync {
    type Popup: PopupWindow;

    fn screen(&self) -> ScreenSize {
        ScreenSize::default()
    }

    /// `Ok(None)` means the window could not be created, e.g. a popup blocker.
    fn open(
        &self,
        url: &Url,
        target_name: &str,
        geometry: &PopupGeometry,
    ) -> Result<Option<Self::Popup>, PopupAuthError>;
}

/// Opens the popup for `request`, centered on the opener's screen, and
/// focuses it.
///
/// Missing dimensions fall back to `default_size`; a zero dimension is an
/// error and no window is opened.
pub fn launch<O: WindowOpener>(
    opener: &O,
    request: &AuthorizationRequest,
    target_name: &str,
    default_size: (u32, u32),
) -> Result<O::Popup, PopupAuthError> {
    let width = request.popup_width.unwrap_or(default_size.0);
    let height = request.popup_height.unwrap_or(default_size.1);
    if width == 0 || height == 0 {
        return Err(PopupAuthError::InvalidPopupSize { width, height });
    }

    let geometry = PopupGeometry::centered(opener.screen(), width, height);
    let Some(mut popup) = opener.open(&request.authorization_url, target_name, &geometry)? else {
        warn!(url = %request.authorization_url, "popup window was blocked");
        return Err(PopupAuthError::PopupBlocked);
    };
    popup.focus();

    info!(
        url = %request.authorization_url,
        width,
        height,
        left = geometry.left,
        top = geometry.top,
        "opened authorization popup"
    );
    Ok(popup)
}
