//! cotdesk: weekly Commitment of Traders positioning desk.
//!
//! Hexagonal layout: the pair/record model and its operations in [`domain`],
//! port traits in [`ports`], concrete implementations in [`adapters`], and
//! the command-line surface in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
