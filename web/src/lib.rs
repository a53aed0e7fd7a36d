//! VidGrab - web server library
//!
//! Server-rendered front end for the VidGrab video download service. All
//! data lives behind the backend REST API; this crate proxies it, guards the
//! account and admin areas, and generates the site's SEO artifacts.

#[macro_use]
mod macros;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
