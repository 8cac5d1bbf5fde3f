//! In-memory store
//!
//! Backs the test suite and `DATABASE_URL=mem://`. Data lives as long as the
//! process.

use super::{FoodLogStore, UserStore};
use crate::auth::models::User;
use crate::auth::ownership::Owner;
use crate::food::{CreateFoodLogRequest, FoodLogEntry, UpdateFoodLogRequest};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use cq_core::{CqError, DailyGoals, Profile, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    food_logs: RwLock<HashMap<Uuid, FoodLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(CqError::AlreadyExists(user.email));
        }
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn update_profile(&self, email: &str, profile: Profile) -> Result<User> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(email)
            .ok_or_else(|| CqError::NotFound(format!("user {email}")))?;
        user.profile.merge(profile);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_goals(&self, email: &str, goals: DailyGoals) -> Result<User> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(email)
            .ok_or_else(|| CqError::NotFound(format!("user {email}")))?;
        user.goals.merge(goals);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl FoodLogStore for MemoryStore {
    async fn create_log(
        &self,
        owner: &Owner,
        request: CreateFoodLogRequest,
    ) -> Result<FoodLogEntry> {
        let entry = FoodLogEntry::new(owner, request);
        self.food_logs
            .write()
            .await
            .insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn list_logs(
        &self,
        owner: &Owner,
        date: Option<NaiveDate>,
    ) -> Result<Vec<FoodLogEntry>> {
        let mut entries: Vec<FoodLogEntry> = self
            .food_logs
            .read()
            .await
            .values()
            .filter(|e| owner.owns(&e.owner))
            .filter(|e| date.map_or(true, |d| e.logged_on(d)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.logged_at.cmp(&b.logged_at));
        Ok(entries)
    }

    async fn get_log(&self, owner: &Owner, id: Uuid) -> Result<Option<FoodLogEntry>> {
        Ok(self
            .food_logs
            .read()
            .await
            .get(&id)
            .filter(|e| owner.owns(&e.owner))
            .cloned())
    }

    async fn update_log(
        &self,
        owner: &Owner,
        id: Uuid,
        update: UpdateFoodLogRequest,
    ) -> Result<Option<FoodLogEntry>> {
        let mut logs = self.food_logs.write().await;
        match logs.get_mut(&id) {
            Some(entry) if owner.owns(&entry.owner) => {
                entry.apply(update);
                Ok(Some(entry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_log(&self, owner: &Owner, id: Uuid) -> Result<bool> {
        let mut logs = self.food_logs.write().await;
        match logs.get(&id) {
            Some(entry) if owner.owns(&entry.owner) => {
                logs.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
