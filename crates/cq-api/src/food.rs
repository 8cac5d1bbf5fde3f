//! Food log entries
//!
//! Request types carry no owner field: the owner is stamped server-side from
//! the authenticated identity when an entry is created.

use crate::auth::ownership::Owner;
use chrono::{DateTime, NaiveDate, Utc};
use cq_core::{DailyGoals, MealType, NutritionTotals};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A single food intake record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FoodLogEntry {
    pub id: Uuid,
    /// Email of the owning user
    #[serde(rename = "user_id")]
    pub owner: String,
    pub food_name: String,
    /// Free-form serving description, e.g. "2 slices"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    pub logged_at: DateTime<Utc>,
}

impl FoodLogEntry {
    /// Build a new entry owned by `owner` with a fresh id
    pub fn new(owner: &Owner, request: CreateFoodLogRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.as_str().to_string(),
            food_name: request.food_name,
            quantity: request.quantity,
            calories: request.calories,
            protein: request.protein,
            carbs: request.carbs,
            fat: request.fat,
            meal_type: request.meal_type,
            logged_at: request.logged_at.unwrap_or_else(Utc::now),
        }
    }

    /// Apply the fields present in `update`
    pub fn apply(&mut self, update: UpdateFoodLogRequest) {
        if let Some(food_name) = update.food_name {
            self.food_name = food_name;
        }
        if update.quantity.is_some() {
            self.quantity = update.quantity;
        }
        if let Some(calories) = update.calories {
            self.calories = calories;
        }
        if let Some(protein) = update.protein {
            self.protein = protein;
        }
        if let Some(carbs) = update.carbs {
            self.carbs = carbs;
        }
        if let Some(fat) = update.fat {
            self.fat = fat;
        }
        if let Some(meal_type) = update.meal_type {
            self.meal_type = meal_type;
        }
        if let Some(logged_at) = update.logged_at {
            self.logged_at = logged_at;
        }
    }

    /// Whether the entry was logged on `date` (UTC calendar day)
    pub fn logged_on(&self, date: NaiveDate) -> bool {
        self.logged_at.date_naive() == date
    }
}

/// Food log creation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFoodLogRequest {
    #[serde(alias = "name")]
    #[validate(length(min = 1, message = "Food name must not be empty"))]
    pub food_name: String,

    #[serde(default)]
    pub quantity: Option<String>,

    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub calories: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub protein: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub carbs: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub fat: f64,

    #[serde(default)]
    pub meal_type: MealType,

    /// Defaults to the time of creation
    #[serde(default, alias = "date")]
    pub logged_at: Option<DateTime<Utc>>,
}

/// Partial food log update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateFoodLogRequest {
    #[serde(default, alias = "name")]
    #[validate(length(min = 1, message = "Food name must not be empty"))]
    pub food_name: Option<String>,

    #[serde(default)]
    pub quantity: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub calories: Option<f64>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub protein: Option<f64>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub carbs: Option<f64>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub fat: Option<f64>,

    #[serde(default)]
    pub meal_type: Option<MealType>,

    #[serde(default, alias = "date")]
    pub logged_at: Option<DateTime<Utc>>,
}

/// Intake of one day compared with the user's goals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub entries: usize,
    pub totals: NutritionTotals,
    pub goals: DailyGoals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_calories: Option<f64>,
}

impl DailySummary {
    pub fn from_entries(date: NaiveDate, entries: &[FoodLogEntry], goals: DailyGoals) -> Self {
        let mut totals = NutritionTotals::default();
        let mut count = 0;
        for entry in entries.iter().filter(|e| e.logged_on(date)) {
            totals.add(entry.calories, entry.protein, entry.carbs, entry.fat);
            count += 1;
        }

        Self {
            date,
            entries: count,
            remaining_calories: totals.remaining_calories(&goals),
            totals,
            goals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn egg() -> CreateFoodLogRequest {
        serde_json::from_value(serde_json::json!({ "name": "egg", "calories": 70 })).unwrap()
    }

    #[test]
    fn test_create_request_defaults() {
        let request = egg();
        assert_eq!(request.food_name, "egg");
        assert_eq!(request.calories, 70.0);
        assert_eq!(request.protein, 0.0);
        assert_eq!(request.meal_type, MealType::Snack);
        assert!(request.logged_at.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_client_owner_field_is_ignored() {
        let request: CreateFoodLogRequest = serde_json::from_value(serde_json::json!({
            "food_name": "toast",
            "calories": 120,
            "user_id": "mallory@x.com",
        }))
        .unwrap();

        let entry = FoodLogEntry::new(&Owner::for_tests("alice@x.com"), request);
        assert_eq!(entry.owner, "alice@x.com");
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut request = egg();
        request.fat = -1.0;
        assert!(request.validate().is_err());

        let update = UpdateFoodLogRequest {
            calories: Some(-5.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_empty_food_name_rejected() {
        let mut request = egg();
        request.food_name = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut entry = FoodLogEntry::new(&Owner::for_tests("alice@x.com"), egg());
        let id = entry.id;

        entry.apply(UpdateFoodLogRequest {
            calories: Some(90.0),
            meal_type: Some(MealType::Breakfast),
            ..Default::default()
        });

        assert_eq!(entry.id, id);
        assert_eq!(entry.food_name, "egg");
        assert_eq!(entry.calories, 90.0);
        assert_eq!(entry.meal_type, MealType::Breakfast);
        assert_eq!(entry.owner, "alice@x.com");
    }

    #[test]
    fn test_serialized_owner_name() {
        let entry = FoodLogEntry::new(&Owner::for_tests("alice@x.com"), egg());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["user_id"], "alice@x.com");
        assert_eq!(json["id"], entry.id.to_string());
    }

    #[test]
    fn test_daily_summary() {
        let owner = Owner::for_tests("alice@x.com");
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let mut breakfast = FoodLogEntry::new(&owner, egg());
        breakfast.logged_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let mut lunch = FoodLogEntry::new(&owner, egg());
        lunch.calories = 500.0;
        lunch.logged_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let mut next_day = FoodLogEntry::new(&owner, egg());
        next_day.logged_at = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();

        let goals = DailyGoals {
            daily_calorie_goal: Some(2000.0),
            ..Default::default()
        };
        let summary = DailySummary::from_entries(day, &[breakfast, lunch, next_day], goals);

        assert_eq!(summary.entries, 2);
        assert_eq!(summary.totals.calories, 570.0);
        assert_eq!(summary.remaining_calories, Some(1430.0));
    }
}
