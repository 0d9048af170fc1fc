//! Logistics Dashboard API Library
//!
//! Backend for the logistics dashboard: user deletion against the identity
//! provider and Firestore, CRM lead lookup and search, and typed read access
//! to the `orders`, `inventory` and `users` collections.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components (handlers, router, OpenAPI document).
//! - `core`: Models, validation, and error types.
//! - `integrations`: Clients for external services.
//! - `config`: Configuration management.
//! - `credentials`: Service-account access tokens.
//! - `db`: Firestore REST client.
//! - `db_storage`: Typed collection reader.
//! - `documents`: Firestore document decoding.

pub mod api;
pub mod core;
pub mod integrations;

pub mod api_docs;
pub mod config;
pub mod credentials;
pub mod crm_client;
pub mod db;
pub mod db_storage;
pub mod documents;
pub mod errors;
pub mod handlers;
pub mod identity_client;
pub mod models;
pub mod router;
pub mod validation;
