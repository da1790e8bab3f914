//! Shared helpers: process execution, unit conversion, temp paths.

pub mod exec;
pub mod platform;
#[cfg(test)]
pub mod testing;
pub mod units;
