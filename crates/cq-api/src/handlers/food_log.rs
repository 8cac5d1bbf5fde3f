//! Food log handlers
//!
//! Each handler derives an [`Owner`] from the authenticated user and passes it
//! to the store. Entries of other users answer 404 exactly like ids that do
//! not exist.

use crate::auth::{AuthenticatedUser, Owner};
use crate::error::AppError;
use crate::food::{CreateFoodLogRequest, DailySummary, FoodLogEntry, UpdateFoodLogRequest};
use crate::state::AppState;
use crate::store::FoodLogStore;
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

const FOOD_LOG: &str = "Food log";

/// Optional day filter, `YYYY-MM-DD` (UTC)
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    fn parse(&self) -> Result<Option<NaiveDate>, AppError> {
        self.date
            .as_deref()
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|_| AppError::BadRequest(format!("Invalid date: {d}")))
            })
            .transpose()
    }
}

/// Deletion confirmation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub id: Uuid,
}

fn parse_log_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::BadRequest("Invalid log id".to_string()))
}

/// Create a food log entry owned by the caller
#[utoipa::path(
    post,
    path = "/api/food/log",
    tag = "food",
    request_body = CreateFoodLogRequest,
    responses(
        (status = 200, description = "Entry created", body = FoodLogEntry),
        (status = 400, description = "Invalid entry", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateFoodLogRequest>,
) -> Result<Json<FoodLogEntry>, AppError> {
    request.validate()?;

    let entry = state
        .food_logs
        .create_log(&Owner::from(&user), request)
        .await?;

    tracing::debug!(id = %entry.id, owner = %entry.owner, "Food log created");
    Ok(Json(entry))
}

/// List the caller's entries
#[utoipa::path(
    get,
    path = "/api/food/log",
    tag = "food",
    params(DateQuery),
    responses(
        (status = 200, description = "Caller's entries, oldest first", body = [FoodLogEntry]),
        (status = 400, description = "Invalid date", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<FoodLogEntry>>, AppError> {
    let date = query.parse()?;
    let entries = state
        .food_logs
        .list_logs(&Owner::from(&user), date)
        .await?;

    Ok(Json(entries))
}

/// Get one of the caller's entries
#[utoipa::path(
    get,
    path = "/api/food/log/{id}",
    tag = "food",
    params(("id" = String, Path, description = "Entry id (UUID)")),
    responses(
        (status = 200, description = "Entry", body = FoodLogEntry),
        (status = 400, description = "Malformed id", body = crate::error::ApiError),
        (status = 404, description = "No such entry for this user", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<FoodLogEntry>, AppError> {
    let id = parse_log_id(&id)?;

    state
        .food_logs
        .get_log(&Owner::from(&user), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(FOOD_LOG.to_string()))
}

/// Update one of the caller's entries
#[utoipa::path(
    put,
    path = "/api/food/log/{id}",
    tag = "food",
    params(("id" = String, Path, description = "Entry id (UUID)")),
    request_body = UpdateFoodLogRequest,
    responses(
        (status = 200, description = "Updated entry", body = FoodLogEntry),
        (status = 400, description = "Malformed id or invalid values", body = crate::error::ApiError),
        (status = 404, description = "No such entry for this user", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(update): Json<UpdateFoodLogRequest>,
) -> Result<Json<FoodLogEntry>, AppError> {
    let id = parse_log_id(&id)?;
    update.validate()?;

    state
        .food_logs
        .update_log(&Owner::from(&user), id, update)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(FOOD_LOG.to_string()))
}

/// Delete one of the caller's entries
#[utoipa::path(
    delete,
    path = "/api/food/log/{id}",
    tag = "food",
    params(("id" = String, Path, description = "Entry id (UUID)")),
    responses(
        (status = 200, description = "Entry deleted", body = DeleteResponse),
        (status = 400, description = "Malformed id", body = crate::error::ApiError),
        (status = 404, description = "No such entry for this user", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_log_id(&id)?;

    if !state.food_logs.delete_log(&Owner::from(&user), id).await? {
        return Err(AppError::NotFound(FOOD_LOG.to_string()));
    }

    Ok(Json(DeleteResponse {
        message: "Food log deleted".to_string(),
        id,
    }))
}

/// Daily totals against the caller's goals; defaults to today (UTC)
#[utoipa::path(
    get,
    path = "/api/food/summary",
    tag = "food",
    params(DateQuery),
    responses(
        (status = 200, description = "Daily summary", body = DailySummary),
        (status = 400, description = "Invalid date", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn daily_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailySummary>, AppError> {
    let date = query.parse()?.unwrap_or_else(|| Utc::now().date_naive());

    let entries = state
        .food_logs
        .list_logs(&Owner::from(&user), Some(date))
        .await?;

    Ok(Json(DailySummary::from_entries(
        date,
        &entries,
        user.user.goals,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_log_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_log_id("507f1f77bcf86cd799439011"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_date_query() {
        let query = DateQuery {
            date: Some("2024-03-01".to_string()),
        };
        assert_eq!(
            query.parse().unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );

        assert_eq!(DateQuery::default().parse().unwrap(), None);

        let bad = DateQuery {
            date: Some("03/01/2024".to_string()),
        };
        assert!(matches!(bad.parse(), Err(AppError::BadRequest(_))));
    }
}
