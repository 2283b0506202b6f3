#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use popup_auth::{
    LocationError, Outcome, PopupAuthError, PopupGeometry, PopupWindow, WindowOpener,
};
use url::Url;

#[derive(Debug, Default)]
struct Window {
    closed: bool,
    close_calls: usize,
    location: Option<Result<Url, LocationError>>,
}

/// A popup whose location and closed state are driven by the test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPopup(Arc<Mutex<Window>>);

impl ScriptedPopup {
    pub fn navigate(&self, url: &str) {
        self.0.lock().unwrap().location = Some(Ok(Url::parse(url).unwrap()));
    }

    pub fn fail(&self, error: LocationError) {
        self.0.lock().unwrap().location = Some(Err(error));
    }

    pub fn user_close(&self) {
        self.0.lock().unwrap().closed = true;
    }

    pub fn is_closed_now(&self) -> bool {
        self.0.lock().unwrap().closed
    }

    pub fn close_calls(&self) -> usize {
        self.0.lock().unwrap().close_calls
    }
}

impl PopupWindow for ScriptedPopup {
    fn is_closed(&self) -> bool {
        self.0.lock().unwrap().closed
    }

    fn location(&self) -> Result<Url, LocationError> {
        self.0
            .lock()
            .unwrap()
            .location
            .clone()
            .unwrap_or(Err(LocationError::CrossOrigin))
    }

    fn close(&mut self) {
        let mut window = self.0.lock().unwrap();
        window.closed = true;
        window.close_calls += 1;
    }
}

/// Hands out the same scripted popup on every open, or nothing when blocked.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOpener {
    pub popup: ScriptedPopup,
    pub blocked: bool,
    opens: Arc<AtomicUsize>,
}

impl ScriptedOpener {
    pub fn new(popup: ScriptedPopup) -> Self {
        Self {
            popup,
            blocked: false,
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl WindowOpener for ScriptedOpener {
    type Popup = ScriptedPopup;

    fn open(
        &self,
        _url: &Url,
        _target_name: &str,
        _geometry: &PopupGeometry,
    ) -> Result<Option<ScriptedPopup>, PopupAuthError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.blocked {
            Ok(None)
        } else {
            Ok(Some(self.popup.clone()))
        }
    }
}

pub fn fields(outcome: &Outcome) -> Vec<(String, String)> {
    outcome
        .fields()
        .expect("expected a successful outcome")
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
