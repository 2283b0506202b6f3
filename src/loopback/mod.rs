//! A native popup: the system browser plus a loopback HTTP listener on the
//! callback URL, which is the only page whose location can be read.

mod config;
mod http;
mod popup;

pub use config::LoopbackConfig;
pub use popup::{LoopbackOpener, LoopbackPopup};
