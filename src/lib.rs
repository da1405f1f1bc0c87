//! Job board scraper.
//!
//! Pulls listings from several boards concurrently, keeps the software roles,
//! tags them with canonical skills and posts the batch to the backend.

pub mod collectors;
pub mod config;
pub mod error;
pub mod models;
pub mod publisher;
pub mod skills;
