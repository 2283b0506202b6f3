//! The authorize button against a recording host.

mod common;

use common::{ScriptedOpener, ScriptedPopup};
use popup_auth::{
    AuthorizeButton, ButtonView, CancelReason, Host, Outcome, PopupAuthError, PopupFlow,
    PopupFlowConfig, RenderArgs,
};
use serde_json::json;

#[derive(Debug, Default)]
struct RecordingHost {
    ready: usize,
    frame_height_requests: usize,
    values: Vec<Outcome>,
}

impl Host for RecordingHost {
    fn set_component_ready(&mut self) {
        self.ready += 1;
    }

    fn set_frame_height(&mut self) {
        self.frame_height_requests += 1;
    }

    fn set_component_value(&mut self, outcome: &Outcome) {
        self.values.push(outcome.clone());
    }
}

fn new_button(opener: ScriptedOpener) -> AuthorizeButton<ScriptedOpener, RecordingHost> {
    AuthorizeButton::new(
        PopupFlow::new(opener, PopupFlowConfig::new()),
        RecordingHost::default(),
    )
}

fn args(auto_click: bool) -> RenderArgs {
    RenderArgs::from_value(json!({
        "authorization_url": "https://idp.example/authorize?redirect_uri=https%3A%2F%2Fapp.example%2Fcb",
        "name": "Continue with Google",
        "icon": "data:image/svg+xml;base64,PHN2Zy8+",
        "popup_height": 700,
        "popup_width": 500,
        "use_container_width": true,
        "auto_click": auto_click,
    }))
    .unwrap()
}

#[test]
fn signals_ready_once_and_requests_frame_height_per_render() {
    let mut button = new_button(ScriptedOpener::default());
    assert_eq!(button.host().ready, 1);
    assert_eq!(button.view().label, "AUTHORIZE");

    button.render(args(false)).unwrap();
    button.render(args(false)).unwrap();

    assert_eq!(button.host().ready, 1);
    assert_eq!(button.host().frame_height_requests, 2);
    assert_eq!(
        button.view(),
        &ButtonView {
            label: "Continue with Google".to_string(),
            icon: Some("data:image/svg+xml;base64,PHN2Zy8+".to_string()),
            full_width: true,
        }
    );

    let request = button.request().unwrap();
    assert_eq!(request.popup_width, Some(500));
    assert_eq!(request.popup_height, Some(700));
    assert_eq!(request.redirect_prefix.as_deref(), Some("https://app.example/cb"));
}

#[test]
fn missing_icon_collapses() {
    let mut button = new_button(ScriptedOpener::default());
    let args = RenderArgs::from_value(json!({
        "authorization_url": "https://idp.example/authorize",
        "name": "Pay",
        "icon": "",
    }))
    .unwrap();
    button.render(args).unwrap();
    assert_eq!(button.view().icon, None);
    assert!(!button.view().full_width);
}

#[test]
fn auto_click_fires_once_per_instance() {
    let mut button = new_button(ScriptedOpener::default());
    assert!(button.render(args(true)).unwrap());
    assert!(!button.render(args(true)).unwrap());

    let mut other = new_button(ScriptedOpener::default());
    assert!(!other.render(args(false)).unwrap());
    assert!(other.render(args(true)).unwrap());
}

#[test]
fn auto_click_is_skipped_inside_popup() {
    let mut button = new_button(ScriptedOpener::default()).opened_as_popup(true);
    assert!(!button.render(args(true)).unwrap());
}

#[test]
fn bad_authorization_url_is_rejected() {
    let mut button = new_button(ScriptedOpener::default());
    let args = RenderArgs::from_value(json!({"authorization_url": "not a url"})).unwrap();
    assert!(matches!(button.render(args), Err(PopupAuthError::Url(_))));
    assert!(button.request().is_none());
}

#[tokio::test(start_paused = true)]
async fn click_commits_outcome_to_host() {
    let popup = ScriptedPopup::default();
    popup.navigate("https://app.example/cb?code=abc&state=xyz");
    let mut button = new_button(ScriptedOpener::new(popup));
    button.render(args(false)).unwrap();

    let outcome = button.click().await.unwrap();

    assert_eq!(outcome.fields().unwrap().code(), Some("abc"));
    assert_eq!(button.host().values, vec![outcome]);
}

#[tokio::test(start_paused = true)]
async fn on_render_runs_auto_click() {
    let popup = ScriptedPopup::default();
    popup.user_close();
    let opener = ScriptedOpener::new(popup);
    let mut button = new_button(opener.clone());

    let outcome = button.on_render(args(true)).await.unwrap();
    assert_eq!(outcome, Some(Outcome::cancelled(CancelReason::UserClosed)));

    let outcome = button.on_render(args(true)).await.unwrap();
    assert_eq!(outcome, None);
    assert_eq!(opener.opens(), 1);
    assert_eq!(button.host().values.len(), 1);
}

#[tokio::test]
async fn click_before_render_is_not_configured() {
    let mut button = new_button(ScriptedOpener::default());
    assert!(matches!(
        button.click().await,
        Err(PopupAuthError::NotConfigured)
    ));
    assert!(button.host().values.is_empty());
}

#[tokio::test]
async fn blocked_popup_commits_nothing() {
    let mut button = new_button(ScriptedOpener::blocked());
    button.render(args(false)).unwrap();

    assert!(matches!(
        button.click().await,
        Err(PopupAuthError::PopupBlocked)
    ));
    assert!(button.host().values.is_empty());
}
