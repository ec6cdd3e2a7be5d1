//! Pure domain utilities

pub mod classify;
