//! AppDeck - curated app-link portal for school zones
//!
//! This library provides the core functionality for the AppDeck portal
//! server: the session-gated admin API and the cached app catalog.

pub mod api;
pub mod catalog;
pub mod config;
pub mod session;
pub mod storage;
pub mod types;
