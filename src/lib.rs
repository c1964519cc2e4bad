// Library exports for streamtail

pub mod cli;
pub mod config;
pub mod error;
pub mod locator;
pub mod query;
pub mod session;
pub mod sink;
pub mod tail;
