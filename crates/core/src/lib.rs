//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Accounts, journal lines and the balance sign convention
//! - `reports` - Trial balance and balance summary (accounting equation)
//! - `reconciliation` - Bank reconciliation arithmetic and lifecycle

pub mod ledger;
pub mod reconciliation;
pub mod reports;
