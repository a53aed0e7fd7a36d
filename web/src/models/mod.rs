//! Resource records exchanged with the backend API.

pub mod application;
pub mod download;
pub mod page;
pub mod platform;
pub mod server;
pub mod settings;
pub mod subscription;
pub mod user;
