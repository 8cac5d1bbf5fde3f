//! API handlers

pub mod auth;
pub mod food_log;
pub mod health;
pub mod users;
