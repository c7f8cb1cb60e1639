//! Profile resolution and notification glue for the presale launchpad.
//!
//! Library modules are shared by the HTTP server binary and by tests.

pub mod address;
pub mod api;
pub mod config;
pub mod neynar;
pub mod profile;
