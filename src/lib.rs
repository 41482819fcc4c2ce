//! AffiliateAura - affiliate link tracking and partnership management
//!
//! # Architecture
//! - `storage`: SeaORM backend for links, click logs, partnerships and profiles
//! - `services`: redirect resolution, links, partnerships, directory, email, shortener
//! - `metadata`: `Key: value` notes codec for business partnership details
//! - `api`: HTTP handlers, JWT sessions and auth middleware
//! - `config`: Configuration management
//! - `runtime`: Server startup and shutdown
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod metadata;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
