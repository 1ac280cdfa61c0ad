//! # scion-kathara - SCION topology to Kathara lab converter
//!
//! This library turns the output of the SCION topology generator (one
//! `AS*` directory per autonomous system, each with service configurations
//! and a `topology.json`) into a Kathara lab where every AS is one node on a
//! single shared subnet.
//!
//! ## Overview
//!
//! The generator gives each AS its own loopback addresses and may split its
//! border routers across several processes. In the lab:
//!
//! - every node `as_<N>` lives at `10.0.0.<N>`
//! - each node runs exactly one border router, `br`, owning all interfaces
//! - each inter-AS link gets its own underlay port, identical on both ends
//! - metrics, tracing and test-only sections are dropped
//!
//! ## Architecture
//!
//! - `config`: run settings, YAML loading and validation
//! - `registry`: AS directory discovery and node ordering
//! - `ip`: node address mapping and link port allocation
//! - `topology`: node/link identifiers and border router consolidation
//! - `service`: `br.toml`, `cs.toml` and `sd.toml` rewriting
//! - `lab`: `lab.conf` and startup script generation
//! - `utils`: atomic writes and directory copies
//! - `orchestrator`: one complete run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use scion_kathara::{config::ConvertConfig, orchestrator};
//!
//! let config = ConvertConfig::default();
//! let report = orchestrator::run_conversion(&config)?;
//! println!("{} nodes, {} links", report.nodes.len(), report.links.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`error::ConvertError`]. The binary wraps them
//! with `color_eyre` for reporting.

pub mod config;
pub mod error;
pub mod ip;
pub mod lab;
pub mod orchestrator;
pub mod registry;
pub mod service;
pub mod topology;
pub mod utils;

pub use error::{ConvertError, Result};
