use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::non_blank;

/// Session length used when a new table does not specify `hours`.
pub const DEFAULT_HOURS: i64 = 2;
pub const MAX_HOURS: i64 = 720;

#[derive(Serialize, utoipa::ToSchema)]
pub struct TableListItem {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = 5)]
    pub table_number: i32,
    #[schema(example = "table5")]
    pub login: String,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::table::Model> for TableListItem {
    fn from(t: crate::entity::table::Model) -> Self {
        Self {
            id: t.id,
            table_number: t.table_number,
            login: t.login,
            expires_at: t.expires_at,
            is_active: t.is_active,
            created_at: t.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TableListResponse {
    pub tables: Vec<TableListItem>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct CreateTableRequest {
    #[schema(example = 5)]
    pub table_number: Option<i32>,
    #[schema(example = "table5")]
    pub login: Option<String>,
    #[schema(example = "s3cure_P@ss!")]
    pub password: Option<String>,
    /// Session length in hours (1-720, default 2).
    #[schema(example = 3)]
    pub hours: Option<i64>,
    /// Admin creating the table.
    pub admin_id: Option<i32>,
}

#[derive(Debug)]
pub struct NewTable<'a> {
    pub table_number: i32,
    pub login: &'a str,
    pub password: &'a str,
    pub hours: i64,
    pub admin_id: Option<i32>,
}

pub fn validate_create_table(payload: &CreateTableRequest) -> Result<NewTable<'_>, AppError> {
    let (Some(table_number), Some(login), Some(password)) = (
        payload.table_number.filter(|n| *n > 0),
        non_blank(&payload.login),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Table number, login and password required".into(),
        ));
    };

    Ok(NewTable {
        table_number,
        login,
        password,
        hours: validate_hours(payload.hours.unwrap_or(DEFAULT_HOURS))?,
        admin_id: payload.admin_id,
    })
}

pub fn validate_hours(hours: i64) -> Result<i64, AppError> {
    if (1..=MAX_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(AppError::Validation(format!(
            "hours must be between 1 and {MAX_HOURS}"
        )))
    }
}

/// Expiry of a session of `hours` starting at `now`.
pub fn expiry_from(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now + Duration::hours(hours)
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateTableRequest {
    #[schema(example = 3)]
    pub id: Option<i32>,
    pub table_number: Option<i32>,
    pub login: Option<String>,
    pub password: Option<String>,
    /// Extends the session to `now + hours` and reactivates the table.
    pub hours: Option<i64>,
}

/// Fields of a table update that passed validation. `None` leaves a column alone.
#[derive(Debug, Default)]
pub struct TableChanges<'a> {
    pub table_number: Option<i32>,
    pub login: Option<&'a str>,
    pub password: Option<&'a str>,
    pub hours: Option<i64>,
}

pub fn validate_update_table(
    payload: &UpdateTableRequest,
) -> Result<(i32, TableChanges<'_>), AppError> {
    let Some(id) = payload.id.filter(|id| *id > 0) else {
        return Err(AppError::Validation("Table ID required".into()));
    };

    let changes = TableChanges {
        table_number: payload.table_number.filter(|n| *n > 0),
        login: non_blank(&payload.login),
        password: payload.password.as_deref().filter(|p| !p.is_empty()),
        hours: payload.hours.map(validate_hours).transpose()?,
    };

    if changes.table_number.is_none()
        && changes.login.is_none()
        && changes.password.is_none()
        && changes.hours.is_none()
    {
        return Err(AppError::Validation("No fields to update".into()));
    }

    Ok((id, changes))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TableSummary {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = 5)]
    pub table_number: i32,
    #[schema(example = "table5")]
    pub login: String,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<crate::entity::table::Model> for TableSummary {
    fn from(t: crate::entity::table::Model) -> Self {
        Self {
            id: t.id,
            table_number: t.table_number,
            login: t.login,
            expires_at: t.expires_at,
            is_active: t.is_active,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TableMutationResponse {
    #[schema(example = true)]
    pub success: bool,
    pub table: TableSummary,
}

impl TableMutationResponse {
    pub fn new(table: crate::entity::table::Model) -> Self {
        Self {
            success: true,
            table: table.into(),
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TableIdQuery {
    /// Table to deactivate.
    pub id: Option<i32>,
}
