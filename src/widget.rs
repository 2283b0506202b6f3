//! The authorize button as a host-framework component.
//!
//! The host renders the component with [`RenderArgs`] and receives the
//! [`Outcome`] of each attempt as the component's value.

use serde::Deserialize;
use tracing::debug;

use crate::flow::PopupFlow;
use crate::popup::WindowOpener;
use crate::{AuthorizationRequest, Outcome, PopupAuthError};

/// Arguments the host passes on every render.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderArgs {
    pub authorization_url: String,
    #[serde(default)]
    pub popup_height: Option<u32>,
    #[serde(default)]
    pub popup_width: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub use_container_width: bool,
    #[serde(default)]
    pub auto_click: bool,
}

impl RenderArgs {
    pub fn from_value(value: serde_json::Value) -> Result<Self, PopupAuthError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Lifecycle and value calls into the host framework.
pub trait Host {
    fn set_component_ready(&mut self);

    /// Ask the host to re-measure the component frame.
    fn set_frame_height(&mut self);

    fn set_component_value(&mut self, outcome: &Outcome);
}

/// What the button currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    /// Background image of the icon; `None` collapses the icon to zero size.
    pub icon: Option<String>,
    pub full_width: bool,
}

const DEFAULT_LABEL: &str = "AUTHORIZE";

pub struct AuthorizeButton<O: WindowOpener, H: Host> {
    flow: PopupFlow<O>,
    host: H,
    view: ButtonView,
    request: Option<AuthorizationRequest>,
    opened_as_popup: bool,
    auto_clicked: bool,
}

impl<O: WindowOpener, H: Host> AuthorizeButton<O, H> {
    /// Creates the button and tells the host it is ready.
    pub fn new(flow: PopupFlow<O>, mut host: H) -> Self {
        host.set_component_ready();
        Self {
            flow,
            host,
            view: ButtonView {
                label: DEFAULT_LABEL.to_string(),
                ..ButtonView::default()
            },
            request: None,
            opened_as_popup: false,
            auto_clicked: false,
        }
    }

    /// Marks this instance as living inside an authorization popup, which
    /// disables auto-click.
    pub fn opened_as_popup(mut self, opened_as_popup: bool) -> Self {
        self.opened_as_popup = opened_as_popup;
        self
    }

    pub fn view(&self) -> &ButtonView {
        &self.view
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn request(&self) -> Option<&AuthorizationRequest> {
        self.request.as_ref()
    }

    /// Applies new render args. Returns true when the caller should click
    /// the button now; that happens at most once per instance.
    pub fn render(&mut self, args: RenderArgs) -> Result<bool, PopupAuthError> {
        let mut request = AuthorizationRequest::new(&args.authorization_url)?;
        request.popup_width = args.popup_width;
        request.popup_height = args.popup_height;
        debug!(authorization_url = %request.authorization_url, "rendered authorize button");

        self.request = Some(request);
        self.view = ButtonView {
            label: if args.name.is_empty() {
                DEFAULT_LABEL.to_string()
            } else {
                args.name
            },
            icon: args.icon.filter(|icon| !icon.is_empty()),
            full_width: args.use_container_width,
        };
        self.host.set_frame_height();

        let auto_click = args.auto_click && !self.opened_as_popup && !self.auto_clicked;
        if auto_click {
            self.auto_clicked = true;
        }
        Ok(auto_click)
    }

    /// Runs one attempt and commits its outcome to the host. Errors are
    /// returned without committing anything.
    pub async fn click(&mut self) -> Result<Outcome, PopupAuthError> {
        let request = self.request.as_ref().ok_or(PopupAuthError::NotConfigured)?;
        let outcome = self.flow.authorize(request).await?;
        self.host.set_component_value(&outcome);
        Ok(outcome)
    }

    /// [`render`](Self::render), then [`click`](Self::click) if auto-click
    /// fired.
    pub async fn on_render(
        &mut self,
        args: RenderArgs,
    ) -> Result<Option<Outcome>, PopupAuthError> {
        if self.render(args)? {
            self.click().await.map(Some)
        } else {
            Ok(None)
        }
    }
}
