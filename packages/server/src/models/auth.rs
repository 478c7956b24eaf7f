use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for `POST /auth`.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct AuthRequest {
    /// Either `admin_login` or `table_login`.
    #[schema(example = "table_login")]
    #[serde(default)]
    pub action: Option<String>,
    /// Admin username, or the table's login for `table_login`.
    #[schema(example = "table5")]
    #[serde(default)]
    pub username: Option<String>,
    #[schema(example = "s3cure_P@ss!")]
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    AdminLogin,
    TableLogin,
}

/// A login attempt that passed shape validation.
#[derive(Debug, PartialEq, Eq)]
pub struct LoginAttempt<'a> {
    pub action: AuthAction,
    pub username: &'a str,
    pub password: &'a str,
}

/// Credentials are checked before the action, matching the client's expectations
/// for error precedence.
pub fn validate_auth_request(payload: &AuthRequest) -> Result<LoginAttempt<'_>, AppError> {
    let username = payload.username.as_deref().map(str::trim).unwrap_or("");
    let password = payload.password.as_deref().unwrap_or("");
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password required".into(),
        ));
    }

    let action = match payload.action.as_deref() {
        Some("admin_login") => AuthAction::AdminLogin,
        Some("table_login") => AuthAction::TableLogin,
        _ => return Err(AppError::Validation("Invalid action".into())),
    };

    Ok(LoginAttempt {
        action,
        username,
        password,
    })
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserIdentity {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "admin")]
    pub role: String,
}

impl From<crate::entity::user::Model> for UserIdentity {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TableSession {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = 5)]
    pub table_number: i32,
    #[schema(example = "table5")]
    pub login: String,
    /// When the table's session ends.
    pub expires_at: DateTime<Utc>,
}

impl From<crate::entity::table::Model> for TableSession {
    fn from(t: crate::entity::table::Model) -> Self {
        Self {
            id: t.id,
            table_number: t.table_number,
            login: t.login,
            expires_at: t.expires_at,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum LoginResponse {
    Admin { success: bool, user: UserIdentity },
    Table { success: bool, table: TableSession },
}

impl LoginResponse {
    pub fn admin(user: crate::entity::user::Model) -> Self {
        Self::Admin {
            success: true,
            user: user.into(),
        }
    }

    pub fn table(table: crate::entity::table::Model) -> Self {
        Self::Table {
            success: true,
            table: table.into(),
        }
    }
}
