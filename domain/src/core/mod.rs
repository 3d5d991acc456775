//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`] - a validated investigation query
//! - [`error::DomainError`] - domain-level errors
//! - [`validation::ConfigIssue`] - structured configuration problems

pub mod error;
pub mod query;
pub mod validation;
