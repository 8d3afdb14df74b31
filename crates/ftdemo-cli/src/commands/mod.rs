//! CLI command implementations.

pub mod aggregate;
pub mod calibration;
pub mod catalog;
pub mod common;
pub mod process;
pub mod run;
pub mod show;
pub mod version;
