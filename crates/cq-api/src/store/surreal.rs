//! SurrealDB store
//!
//! Users are keyed by email (`users:⟨email⟩`) with a UNIQUE index on the email
//! field as well, so a second `CREATE` for the same address fails inside the
//! database. Food logs carry their owner's email and every statement that
//! touches one filters on it.

use super::{FoodLogStore, UserStore};
use crate::auth::models::User;
use crate::auth::ownership::Owner;
use crate::food::{CreateFoodLogRequest, FoodLogEntry, UpdateFoodLogRequest};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use cq_core::{CqError, DailyGoals, DatabaseConfig, MealType, Profile, Result};
use serde::{Deserialize, Serialize};
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use uuid::Uuid;

const USER_FIELDS: &str = "email, password_hash, profile, goals, created_at, updated_at";
const LOG_FIELDS: &str =
    "log_id, owner, food_name, quantity, calories, protein, carbs, fat, meal_type, logged_at, log_date";

pub struct SurrealStore {
    client: Surreal<Client>,
}

impl SurrealStore {
    /// Connect, authenticate and select the configured namespace and database
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        // The ws engine adds the scheme itself
        let url = config
            .url
            .strip_prefix("ws://")
            .or_else(|| config.url.strip_prefix("wss://"))
            .unwrap_or(&config.url);

        let client = Surreal::new::<Ws>(url)
            .await
            .map_err(|e| CqError::DatabaseError(format!("SurrealDB connection failed: {e}")))?;

        client
            .signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| CqError::DatabaseError(format!("SurrealDB auth failed: {e}")))?;

        client
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| CqError::DatabaseError(format!("SurrealDB namespace error: {e}")))?;

        tracing::info!(
            namespace = %config.namespace,
            database = %config.database,
            "Connected to SurrealDB"
        );

        Ok(Self { client })
    }

    /// Define tables and indexes; safe to run on every start
    pub async fn init_schema(&self) -> Result<()> {
        self.client
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS users SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS users_email ON users FIELDS email UNIQUE;
                DEFINE TABLE IF NOT EXISTS food_logs SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS food_logs_log_id ON food_logs FIELDS log_id UNIQUE;
                DEFINE INDEX IF NOT EXISTS food_logs_owner ON food_logs FIELDS owner, log_date;
            "#,
            )
            .await
            .map_err(|e| CqError::DatabaseError(format!("Schema init failed: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("Schema init failed: {e}")))?;

        Ok(())
    }

    async fn fetch_user(&self, email: &str) -> Result<Option<UserRecord>> {
        let records: Vec<UserRecord> = self
            .client
            .query(format!("SELECT {USER_FIELDS} FROM users WHERE email = $email"))
            .bind(("email", email.to_string()))
            .await
            .map_err(|e| CqError::DatabaseError(format!("User lookup failed: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("User lookup failed: {e}")))?
            .take(0)
            .map_err(|e| CqError::CorruptRecord(format!("users: {e}")))?;

        Ok(records.into_iter().next())
    }

    /// Merge a partial section into a stored user in one statement
    ///
    /// Fields absent from `patch` keep their stored values, so concurrent
    /// updates of different fields do not overwrite each other.
    async fn merge_user<T>(&self, email: &str, section: UserSection, patch: T) -> Result<User>
    where
        T: Serialize + Send + 'static,
    {
        let updated: Vec<UserRecord> = self
            .client
            .query(merge_user_query(section))
            .bind(("email", email.to_string()))
            .bind(("patch", patch))
            .bind(("now", Utc::now()))
            .await
            .map_err(|e| CqError::DatabaseError(format!("User update failed: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("User update failed: {e}")))?
            .take(0)
            .map_err(|e| CqError::CorruptRecord(format!("users: {e}")))?;

        updated
            .into_iter()
            .next()
            .map(User::from)
            .ok_or_else(|| CqError::NotFound(format!("user {email}")))
    }

    async fn select_logs(&self, owner: &Owner, id: Option<Uuid>) -> Result<Vec<FoodLogEntry>> {
        let mut sql = format!("SELECT {LOG_FIELDS} FROM food_logs WHERE owner = $owner");
        if id.is_some() {
            sql.push_str(" AND log_id = $log_id");
        }
        sql.push_str(" ORDER BY logged_at");

        let rows: Vec<FoodLogRow> = self
            .client
            .query(sql)
            .bind(("owner", owner.as_str().to_string()))
            .bind(("log_id", id.map(|i| i.to_string())))
            .await
            .map_err(|e| CqError::DatabaseError(format!("Food log query failed: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("Food log query failed: {e}")))?
            .take(0)
            .map_err(|e| CqError::CorruptRecord(format!("food_logs: {e}")))?;

        rows.into_iter().map(FoodLogEntry::try_from).collect()
    }
}

/// Nested object of a user record that accepts partial updates
#[derive(Debug, Clone, Copy)]
enum UserSection {
    Profile,
    Goals,
}

impl UserSection {
    fn field(self) -> &'static str {
        match self {
            UserSection::Profile => "profile",
            UserSection::Goals => "goals",
        }
    }
}

/// `MERGE` deep-merges `$patch` into the section; unset options are skipped
/// when serialized and never reach the statement. The `WHERE` keeps the
/// statement from creating a missing user.
fn merge_user_query(section: UserSection) -> String {
    format!(
        "UPDATE type::thing('users', $email) MERGE {{ {}: $patch, updated_at: $now }} \
         WHERE email = $email RETURN {USER_FIELDS}",
        section.field()
    )
}

/// A uniqueness violation reported by SurrealDB, either on the record id or
/// on the UNIQUE index
fn is_conflict(message: &str) -> bool {
    message.contains("already exists") || message.contains("already contains")
}

/// Stored shape of a user; unlike `User` it serializes the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    email: String,
    password_hash: String,
    #[serde(default)]
    profile: Profile,
    #[serde(default)]
    goals: DailyGoals,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            profile: user.profile.clone(),
            goals: user.goals.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            email: record.email,
            password_hash: record.password_hash,
            profile: record.profile,
            goals: record.goals,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Stored shape of a food log entry
///
/// `log_date` duplicates the UTC day of `logged_at` so that date filtering can
/// use the owner index.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FoodLogRow {
    log_id: String,
    owner: String,
    food_name: String,
    #[serde(default)]
    quantity: Option<String>,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    meal_type: MealType,
    logged_at: DateTime<Utc>,
    log_date: String,
}

impl From<&FoodLogEntry> for FoodLogRow {
    fn from(entry: &FoodLogEntry) -> Self {
        Self {
            log_id: entry.id.to_string(),
            owner: entry.owner.clone(),
            food_name: entry.food_name.clone(),
            quantity: entry.quantity.clone(),
            calories: entry.calories,
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
            meal_type: entry.meal_type,
            logged_at: entry.logged_at,
            log_date: entry.logged_at.date_naive().to_string(),
        }
    }
}

impl TryFrom<FoodLogRow> for FoodLogEntry {
    type Error = CqError;

    fn try_from(row: FoodLogRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.log_id)
            .map_err(|e| CqError::CorruptRecord(format!("food_logs.log_id {}: {e}", row.log_id)))?;

        Ok(Self {
            id,
            owner: row.owner,
            food_name: row.food_name,
            quantity: row.quantity,
            calories: row.calories,
            protein: row.protein,
            carbs: row.carbs,
            fat: row.fat,
            meal_type: row.meal_type,
            logged_at: row.logged_at,
        })
    }
}

#[async_trait]
impl UserStore for SurrealStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        let response = self
            .client
            .query("CREATE type::thing('users', $email) CONTENT $record RETURN NONE")
            .bind(("email", user.email.clone()))
            .bind(("record", UserRecord::from(&user)))
            .await
            .map_err(|e| CqError::DatabaseError(format!("Failed to create user: {e}")))?;

        match response.check() {
            Ok(_) => Ok(user),
            Err(e) if is_conflict(&e.to_string()) => Err(CqError::AlreadyExists(user.email)),
            Err(e) => Err(CqError::DatabaseError(format!("Failed to create user: {e}"))),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.fetch_user(email).await?.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let records: Vec<UserRecord> = self
            .client
            .query(format!("SELECT {USER_FIELDS} FROM users ORDER BY created_at"))
            .await
            .map_err(|e| CqError::DatabaseError(format!("Failed to list users: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("Failed to list users: {e}")))?
            .take(0)
            .map_err(|e| CqError::CorruptRecord(format!("users: {e}")))?;

        Ok(records.into_iter().map(User::from).collect())
    }

    async fn update_profile(&self, email: &str, profile: Profile) -> Result<User> {
        self.merge_user(email, UserSection::Profile, profile).await
    }

    async fn update_goals(&self, email: &str, goals: DailyGoals) -> Result<User> {
        self.merge_user(email, UserSection::Goals, goals).await
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .health()
            .await
            .map_err(|e| CqError::DatabaseError(format!("SurrealDB health check failed: {e}")))
    }
}

#[async_trait]
impl FoodLogStore for SurrealStore {
    async fn create_log(
        &self,
        owner: &Owner,
        request: CreateFoodLogRequest,
    ) -> Result<FoodLogEntry> {
        let entry = FoodLogEntry::new(owner, request);

        self.client
            .query("CREATE type::thing('food_logs', $log_id) CONTENT $row RETURN NONE")
            .bind(("log_id", entry.id.to_string()))
            .bind(("row", FoodLogRow::from(&entry)))
            .await
            .map_err(|e| CqError::DatabaseError(format!("Failed to add food log: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("Failed to add food log: {e}")))?;

        Ok(entry)
    }

    async fn list_logs(
        &self,
        owner: &Owner,
        date: Option<NaiveDate>,
    ) -> Result<Vec<FoodLogEntry>> {
        let Some(date) = date else {
            return self.select_logs(owner, None).await;
        };

        let rows: Vec<FoodLogRow> = self
            .client
            .query(format!(
                "SELECT {LOG_FIELDS} FROM food_logs WHERE owner = $owner AND log_date = $date ORDER BY logged_at"
            ))
            .bind(("owner", owner.as_str().to_string()))
            .bind(("date", date.to_string()))
            .await
            .map_err(|e| CqError::DatabaseError(format!("Food log query failed: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("Food log query failed: {e}")))?
            .take(0)
            .map_err(|e| CqError::CorruptRecord(format!("food_logs: {e}")))?;

        rows.into_iter().map(FoodLogEntry::try_from).collect()
    }

    async fn get_log(&self, owner: &Owner, id: Uuid) -> Result<Option<FoodLogEntry>> {
        Ok(self.select_logs(owner, Some(id)).await?.into_iter().next())
    }

    async fn update_log(
        &self,
        owner: &Owner,
        id: Uuid,
        update: UpdateFoodLogRequest,
    ) -> Result<Option<FoodLogEntry>> {
        let Some(mut entry) = self.get_log(owner, id).await? else {
            return Ok(None);
        };
        entry.apply(update);

        // The owner condition is repeated on the write itself
        let rows: Vec<FoodLogRow> = self
            .client
            .query(format!(
                "UPDATE type::thing('food_logs', $log_id) CONTENT $row WHERE owner = $owner RETURN {LOG_FIELDS}"
            ))
            .bind(("log_id", id.to_string()))
            .bind(("owner", owner.as_str().to_string()))
            .bind(("row", FoodLogRow::from(&entry)))
            .await
            .map_err(|e| CqError::DatabaseError(format!("Failed to update food log: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("Failed to update food log: {e}")))?
            .take(0)
            .map_err(|e| CqError::CorruptRecord(format!("food_logs: {e}")))?;

        rows.into_iter().next().map(FoodLogEntry::try_from).transpose()
    }

    async fn delete_log(&self, owner: &Owner, id: Uuid) -> Result<bool> {
        let rows: Vec<FoodLogRow> = self
            .client
            .query("DELETE food_logs WHERE log_id = $log_id AND owner = $owner RETURN BEFORE")
            .bind(("log_id", id.to_string()))
            .bind(("owner", owner.as_str().to_string()))
            .await
            .map_err(|e| CqError::DatabaseError(format!("Failed to delete food log: {e}")))?
            .check()
            .map_err(|e| CqError::DatabaseError(format!("Failed to delete food log: {e}")))?
            .take(0)
            .map_err(|e| CqError::CorruptRecord(format!("food_logs: {e}")))?;

        Ok(!rows.is_empty())
    }
}
