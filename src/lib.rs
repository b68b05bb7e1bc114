//! Assessment Lead API Library
//!
//! Accepts security-assessment form submissions, enriches them with regional crime
//! statistics, stores the scored lead in the CRM, and alerts the sales chat.
//!
//! # Modules
//!
//! - `alerts`: Alert formatting and the Telegram channel.
//! - `config`: Configuration management.
//! - `contact_store`: CRM contact persistence.
//! - `crime_data`: FBI crime data client.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `pipeline`: Lookup, scoring, persistence and alert orchestration.
//! - `scoring`: Lead scoring and CRM field mapping.

pub mod alerts;
pub mod config;
pub mod contact_store;
pub mod crime_data;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod scoring;
