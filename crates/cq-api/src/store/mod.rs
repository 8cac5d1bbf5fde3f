//! Persistence interfaces
//!
//! Two backends implement these traits:
//! - `MemoryStore`: process-local maps, used for tests and `DATABASE_URL=mem://`
//! - `SurrealStore`: SurrealDB over WebSocket

pub mod memory;
pub mod surreal;

pub use memory::MemoryStore;
pub use surreal::SurrealStore;

use crate::auth::models::User;
use crate::auth::ownership::Owner;
use crate::food::{CreateFoodLogRequest, FoodLogEntry, UpdateFoodLogRequest};
use async_trait::async_trait;
use chrono::NaiveDate;
use cq_core::{DailyGoals, Profile, Result};
use uuid::Uuid;

/// Credential store keyed by email
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user if no user with the same email exists
    ///
    /// The check and the insert are one atomic step; a conflict returns
    /// `CqError::AlreadyExists`.
    async fn insert_user(&self, user: User) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Merge `profile` into the stored profile of `email`
    async fn update_profile(&self, email: &str, profile: Profile) -> Result<User>;

    /// Merge `goals` into the stored goals of `email`
    async fn update_goals(&self, email: &str, goals: DailyGoals) -> Result<User>;

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> Result<()>;
}

/// Food log persistence, scoped to one owner per call
///
/// Records belonging to another owner are indistinguishable from records
/// that do not exist.
#[async_trait]
pub trait FoodLogStore: Send + Sync {
    async fn create_log(&self, owner: &Owner, request: CreateFoodLogRequest)
        -> Result<FoodLogEntry>;

    /// Entries of `owner` ordered by `logged_at`, optionally restricted to one UTC day
    async fn list_logs(&self, owner: &Owner, date: Option<NaiveDate>)
        -> Result<Vec<FoodLogEntry>>;

    async fn get_log(&self, owner: &Owner, id: Uuid) -> Result<Option<FoodLogEntry>>;

    /// Returns `None` when no entry with `id` belongs to `owner`
    async fn update_log(
        &self,
        owner: &Owner,
        id: Uuid,
        update: UpdateFoodLogRequest,
    ) -> Result<Option<FoodLogEntry>>;

    /// Returns `false` when no entry with `id` belongs to `owner`
    async fn delete_log(&self, owner: &Owner, id: Uuid) -> Result<bool>;
}
