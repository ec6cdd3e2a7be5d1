//! Calendar synchronization: ports, reconciliation, and orchestration

pub mod ports;
pub mod reconciler;
pub mod service;
pub mod strategy;
pub mod token;
