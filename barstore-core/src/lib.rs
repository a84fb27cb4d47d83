//! Barstore Core: stock bar storage with criteria-based querying.
//!
//! This crate contains:
//! - Domain types (stock bars, ids, symbol reference entries)
//! - Field filters and the per-request `BarCriteria`
//! - The criteria compiler producing one composite predicate for fetch, page and count
//! - `field.operator=value` parameter parsing
//! - Storage collaborators (in-memory and JSON file)
//! - The CRUD service with its identity rules
//! - Market data fetch and chart ingest
//! - TOML configuration

pub mod config;
pub mod criteria;
pub mod data;
pub mod domain;
pub mod filter;
pub mod params;
pub mod query;
pub mod service;
pub mod store;
