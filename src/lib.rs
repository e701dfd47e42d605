// The binary entry point is main.rs; the module tree lives here so that
// integration tests and criterion benches can reach it via `mathfc::*`.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod session;
pub mod store;
pub mod ui;
