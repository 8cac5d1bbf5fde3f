//! Calorie Quest Core - domain types, configuration and nutrition math
//!
//! This crate defines the types shared by the API server:
//! - Profile and daily goal structures
//! - Meal classification
//! - Common error types
//! - Configuration management
//! - Daily calorie target calculation

pub mod config;
pub mod nutrition;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use nutrition::{daily_calorie_target, NutritionTotals};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Calorie Quest operations
#[derive(Error, Debug)]
pub enum CqError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Stored record does not match the expected shape: {0}")]
    CorruptRecord(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CqError>;

// ============================================================================
// Profile
// ============================================================================

/// Biological sex used by the BMR equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Habitual activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to the basal metabolic rate
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Body weight goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeightGoal {
    Lose,
    Maintain,
    Gain,
}

impl WeightGoal {
    /// Daily calorie adjustment relative to maintenance (about 1lb per week)
    pub fn calorie_adjustment(self) -> f64 {
        match self {
            WeightGoal::Lose => -500.0,
            WeightGoal::Maintain => 0.0,
            WeightGoal::Gain => 500.0,
        }
    }
}

/// Optional profile attributes of a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Height in centimetres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<WeightGoal>,
}

impl Profile {
    /// Overwrite the fields that are set in `update`
    pub fn merge(&mut self, update: Profile) {
        if update.age.is_some() {
            self.age = update.age;
        }
        if update.gender.is_some() {
            self.gender = update.gender;
        }
        if update.height.is_some() {
            self.height = update.height;
        }
        if update.weight.is_some() {
            self.weight = update.weight;
        }
        if update.activity_level.is_some() {
            self.activity_level = update.activity_level;
        }
        if update.goal.is_some() {
            self.goal = update.goal;
        }
    }
}

/// Optional per-day nutrition goals of a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyGoals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_calorie_goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_protein_goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_carb_goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_fat_goal: Option<f64>,
}

impl DailyGoals {
    /// Overwrite the goals that are set in `update`
    pub fn merge(&mut self, update: DailyGoals) {
        if update.daily_calorie_goal.is_some() {
            self.daily_calorie_goal = update.daily_calorie_goal;
        }
        if update.daily_protein_goal.is_some() {
            self.daily_protein_goal = update.daily_protein_goal;
        }
        if update.daily_carb_goal.is_some() {
            self.daily_carb_goal = update.daily_carb_goal;
        }
        if update.daily_fat_goal.is_some() {
            self.daily_fat_goal = update.daily_fat_goal;
        }
    }
}

// ============================================================================
// Food log
// ============================================================================

/// Meal classification of a food log entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    #[default]
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
