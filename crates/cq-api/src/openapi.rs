//! OpenAPI document

use crate::auth::{CredentialsForm, TokenResponse, UserPublic};
use crate::error::ApiError;
use crate::food::{CreateFoodLogRequest, DailySummary, FoodLogEntry, UpdateFoodLogRequest};
use crate::handlers::food_log::DeleteResponse;
use crate::handlers::health::HealthResponse;
use crate::handlers::users::{CalorieTargetResponse, UpdateGoalsRequest, UpdateProfileRequest};
use crate::handlers::{auth, food_log, health, users};
use cq_core::{ActivityLevel, DailyGoals, Gender, MealType, NutritionTotals, Profile, WeightGoal};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Calorie Quest API",
        description = "Calorie tracking backend: accounts, profiles, goals and food logs"
    ),
    paths(
        health::health_check,
        auth::register_handler,
        auth::login_handler,
        auth::me_handler,
        users::list_users,
        users::get_profile,
        users::update_profile,
        users::update_goals,
        users::get_calorie_target,
        food_log::create_log,
        food_log::list_logs,
        food_log::get_log,
        food_log::update_log,
        food_log::delete_log,
        food_log::daily_summary,
    ),
    components(schemas(
        ApiError,
        CredentialsForm,
        TokenResponse,
        UserPublic,
        Profile,
        DailyGoals,
        Gender,
        ActivityLevel,
        WeightGoal,
        UpdateProfileRequest,
        UpdateGoalsRequest,
        CalorieTargetResponse,
        MealType,
        FoodLogEntry,
        CreateFoodLogRequest,
        UpdateFoodLogRequest,
        DeleteResponse,
        NutritionTotals,
        DailySummary,
        HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Profile and goals of the caller"),
        (name = "food", description = "Food log of the caller"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/users/register"));
        assert!(paths.contains_key("/api/auth/login"));
        assert!(paths.contains_key("/api/food/log/{id}"));
        assert!(paths.contains_key("/healthz"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
