//! HTTP handlers for the contract service.

pub mod contract;
pub mod health;
pub mod metrics;
