//! Promotion authoring client.
//!
//! A four-step wizard (general info, rules, rewards, review) that builds a promotion
//! draft, validates each step, maps the draft to the backend's wire format and submits
//! it. Condition and action kinds come from the backend's metadata catalog and are
//! rendered through a static registry of field widgets.
//!
//! The [`mock`] module serves an in-memory stand-in of the backend for local runs and
//! the integration tests.

pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod mapper;
pub mod mock;
pub mod models;
pub mod registry;
pub mod validation;
pub mod wizard;
