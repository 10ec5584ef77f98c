#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostic_log;
pub mod errors;
pub mod server;
pub mod sparql;
pub mod tools;
