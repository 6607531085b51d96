//! Utilities shared by the Tegaki packages.

pub mod logger;
pub mod time;
