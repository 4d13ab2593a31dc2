//! Binary support for the ratings service: settings and the HTTP application.
mod application;
pub mod settings;

pub use application::{app, launch};
pub use settings::Settings;
