//! Daily calorie targets and intake totals
//!
//! The target uses the Mifflin-St Jeor equation for basal metabolic rate,
//! scaled by the activity multiplier and shifted by the weight goal.

use crate::{DailyGoals, Gender, Profile};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Recommended daily calories for a profile
///
/// Returns `None` until every input the equation needs is present.
pub fn daily_calorie_target(profile: &Profile) -> Option<u32> {
    let age = f64::from(profile.age?);
    let height = profile.height?;
    let weight = profile.weight?;

    let bmr = match profile.gender? {
        Gender::Male => 10.0 * weight + 6.25 * height - 5.0 * age + 5.0,
        Gender::Female => 10.0 * weight + 6.25 * height - 5.0 * age - 161.0,
    };

    let tdee = bmr * profile.activity_level?.multiplier();
    let target = tdee + profile.goal?.calorie_adjustment();

    Some(target.round().max(0.0) as u32)
}

/// Summed nutrition values of a set of food log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutritionTotals {
    pub fn add(&mut self, calories: f64, protein: f64, carbs: f64, fat: f64) {
        self.calories += calories;
        self.protein += protein;
        self.carbs += carbs;
        self.fat += fat;
    }

    /// Calories left before the daily goal is reached (negative when over)
    pub fn remaining_calories(&self, goals: &DailyGoals) -> Option<f64> {
        goals.daily_calorie_goal.map(|goal| goal - self.calories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActivityLevel, WeightGoal};

    fn profile(gender: Gender, goal: WeightGoal) -> Profile {
        Profile {
            age: Some(30),
            gender: Some(gender),
            height: Some(180.0),
            weight: Some(80.0),
            activity_level: Some(ActivityLevel::Moderate),
            goal: Some(goal),
        }
    }

    #[test]
    fn test_male_maintain() {
        // BMR = 800 + 1125 - 150 + 5 = 1780; * 1.55 = 2759
        assert_eq!(
            daily_calorie_target(&profile(Gender::Male, WeightGoal::Maintain)),
            Some(2759)
        );
    }

    #[test]
    fn test_female_lose() {
        // BMR = 800 + 1125 - 150 - 161 = 1614; * 1.55 = 2501.7; - 500 = 2001.7
        assert_eq!(
            daily_calorie_target(&profile(Gender::Female, WeightGoal::Lose)),
            Some(2002)
        );
    }

    #[test]
    fn test_gain_adds_surplus() {
        let maintain = daily_calorie_target(&profile(Gender::Male, WeightGoal::Maintain)).unwrap();
        let gain = daily_calorie_target(&profile(Gender::Male, WeightGoal::Gain)).unwrap();
        assert_eq!(gain - maintain, 500);
    }

    #[test]
    fn test_incomplete_profile() {
        let mut p = profile(Gender::Male, WeightGoal::Maintain);
        p.activity_level = None;
        assert_eq!(daily_calorie_target(&p), None);
        assert_eq!(daily_calorie_target(&Profile::default()), None);
    }

    #[test]
    fn test_totals_and_remaining() {
        let mut totals = NutritionTotals::default();
        totals.add(70.0, 6.0, 0.5, 5.0);
        totals.add(230.0, 4.0, 40.0, 2.0);

        assert_eq!(totals.calories, 300.0);
        assert_eq!(totals.protein, 10.0);

        let goals = DailyGoals {
            daily_calorie_goal: Some(2000.0),
            ..Default::default()
        };
        assert_eq!(totals.remaining_calories(&goals), Some(1700.0));
        assert_eq!(totals.remaining_calories(&DailyGoals::default()), None);
    }
}
