// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod goal;
pub mod user;

pub use goal::{Goal, GoalType, NewGoal};
pub use user::User;
