// SPDX-License-Identifier: MIT

//! Goaltrack: backend API for a consumer goal-tracking product.
//!
//! This crate provides the API for creating and listing user-owned goals,
//! gated by a hosted identity provider and backed by a relational store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::identity::IdentityProvider;
use services::{GoalService, UserDirectory};
use std::sync::Arc;

/// Shared application state.
///
/// Constructed once at startup and dependency-injected into the router;
/// there is no hidden process-wide store handle, so tests substitute
/// their own database and identity provider.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub directory: UserDirectory,
    pub goals: GoalService,
    pub identity: Arc<dyn IdentityProvider>,
}
