//! Last Call server - drink orders over WhatsApp, SMS and the web.
//!
//! # Architecture
//!
//! - Axum webhook + JSON API surface
//! - Free-text drink resolution against a file-backed catalog
//! - In-memory order queue (deliberately not persisted)
//! - `PostgreSQL` for the durable stock ledger and push subscriptions
//! - Best-effort notification fan-out: WhatsApp, SMS, web push, SSE

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod queue;
pub mod routes;
pub mod services;
pub mod state;
