// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod directory;
pub mod goals;
pub mod identity;

pub use directory::UserDirectory;
pub use goals::GoalService;
pub use identity::{Caller, CallerIdentity, IdentityProvider, SessionVerifier};
