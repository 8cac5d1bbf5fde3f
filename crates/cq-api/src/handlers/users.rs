//! User profile and goal handlers
//!
//! Every handler here addresses the user record of the authenticated caller;
//! none takes an email from the request.

use crate::auth::{AuthenticatedUser, UserPublic};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::UserStore;
use axum::{extract::State, Extension, Json};
use cq_core::{daily_calorie_target, ActivityLevel, DailyGoals, Gender, Profile, WeightGoal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Partial profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    /// Height in centimetres
    #[validate(range(exclusive_min = 0.0, message = "Height must be positive"))]
    pub height: Option<f64>,
    /// Weight in kilograms
    #[validate(range(exclusive_min = 0.0, message = "Weight must be positive"))]
    pub weight: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<WeightGoal>,
}

impl From<UpdateProfileRequest> for Profile {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            age: req.age,
            gender: req.gender,
            height: req.height,
            weight: req.weight,
            activity_level: req.activity_level,
            goal: req.goal,
        }
    }
}

/// Partial goals update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateGoalsRequest {
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub daily_calorie_goal: Option<f64>,
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub daily_protein_goal: Option<f64>,
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub daily_carb_goal: Option<f64>,
    #[validate(range(min = 0.0, message = "Must not be negative"))]
    pub daily_fat_goal: Option<f64>,
}

impl From<UpdateGoalsRequest> for DailyGoals {
    fn from(req: UpdateGoalsRequest) -> Self {
        Self {
            daily_calorie_goal: req.daily_calorie_goal,
            daily_protein_goal: req.daily_protein_goal,
            daily_carb_goal: req.daily_carb_goal,
            daily_fat_goal: req.daily_fat_goal,
        }
    }
}

/// Recommended daily intake for the caller's profile
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalorieTargetResponse {
    /// `null` until age, gender, height, weight, activity level and goal are all set
    pub daily_calorie_target: Option<u32>,
    pub daily_calorie_goal: Option<f64>,
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users/all",
    tag = "users",
    responses(
        (status = 200, description = "All users, without credentials", body = [UserPublic]),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserPublic>>, AppError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.iter().map(|u| u.to_public()).collect()))
}

/// Get the caller's profile and goals
#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "users",
    responses(
        (status = 200, description = "Profile", body = UserPublic),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(Extension(user): Extension<AuthenticatedUser>) -> Json<UserPublic> {
    Json(user.user)
}

/// Update the caller's profile; absent fields keep their value
#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserPublic),
        (status = 400, description = "Invalid profile values", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserPublic>, AppError> {
    request.validate()?;

    let updated = state
        .users
        .update_profile(&user.email, request.into())
        .await?;

    tracing::debug!(email = %user.email, "Profile updated");
    Ok(Json(updated.to_public()))
}

/// Update the caller's daily goals; absent goals keep their value
#[utoipa::path(
    put,
    path = "/api/users/profile/goals",
    tag = "users",
    request_body = UpdateGoalsRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserPublic),
        (status = 400, description = "Negative goal", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateGoalsRequest>,
) -> Result<Json<UserPublic>, AppError> {
    request.validate()?;

    let updated = state.users.update_goals(&user.email, request.into()).await?;
    Ok(Json(updated.to_public()))
}

/// Recommended daily calories (Mifflin-St Jeor)
#[utoipa::path(
    get,
    path = "/api/users/profile/target",
    tag = "users",
    responses(
        (status = 200, description = "Calorie target", body = CalorieTargetResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_calorie_target(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<CalorieTargetResponse> {
    Json(CalorieTargetResponse {
        daily_calorie_target: daily_calorie_target(&user.user.profile),
        daily_calorie_goal: user.user.goals.daily_calorie_goal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_validation() {
        let valid = UpdateProfileRequest {
            age: Some(30),
            height: Some(180.0),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let zero_age = UpdateProfileRequest {
            age: Some(0),
            ..Default::default()
        };
        assert!(zero_age.validate().is_err());

        let zero_weight = UpdateProfileRequest {
            weight: Some(0.0),
            ..Default::default()
        };
        assert!(zero_weight.validate().is_err());

        // Nothing set is a no-op update, not an error
        assert!(UpdateProfileRequest::default().validate().is_ok());
    }

    #[test]
    fn test_goals_validation() {
        let negative = UpdateGoalsRequest {
            daily_fat_goal: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let goals = DailyGoals::from(UpdateGoalsRequest {
            daily_calorie_goal: Some(2000.0),
            ..Default::default()
        });
        assert_eq!(goals.daily_calorie_goal, Some(2000.0));
        assert_eq!(goals.daily_protein_goal, None);
    }
}
