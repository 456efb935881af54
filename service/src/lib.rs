//! Infrastructure shared by every crate in the workspace: configuration and logging.
//!
//! Configuration is always handed to consumers explicitly as a `Config` value;
//! nothing below this crate reads the process environment.

pub mod config;
pub mod logging;
