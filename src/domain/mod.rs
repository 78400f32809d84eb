//! Core domain types and logic.

pub mod record;
pub mod calculator;
pub mod form;
pub mod store;
pub mod sample;
pub mod loader;
pub mod export;
pub mod gate;
pub mod settings;
pub mod error;
