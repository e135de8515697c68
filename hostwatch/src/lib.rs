//! Library surface of the hostwatch client, shared by the binary and tests.

pub mod app;
pub mod history;
pub mod types;
pub mod ui;
pub mod ws;
