use crate::auth;
use crate::error::{ApiError, ApiResult};
use crate::orm::users;
use chrono::Utc;
use sea_orm::{entity::*, query::*, sea_query::Expr, ConnectionTrait, DbErr, Set};
use serde::Serialize;

/// Public view of an account.
#[derive(Clone, Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub role_id: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl From<users::Model> for UserView {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role_id: u.role_id,
            created_at: u.created_at,
        }
    }
}

fn validate_username(name: &str) -> ApiResult<()> {
    if name.len() < 3 || name.len() > 32 {
        return Err(ApiError::bad_request(
            "Username must be between 3 and 32 characters",
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ApiError::bad_request(
            "Username may only contain letters, digits, '.', '_' and '-'",
        ));
    }
    Ok(())
}

/// Registers an account with the given role.
pub async fn create_user<C>(
    db: &C,
    username: &str,
    password: &str,
    role_id: i32,
) -> ApiResult<users::Model>
where
    C: ConnectionTrait,
{
    let username = username.trim();
    validate_username(username)?;
    if password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    if find_by_username(db, username).await?.is_some() {
        return Err(ApiError::conflict("Username is taken"));
    }

    let user = users::ActiveModel {
        username: Set(username.to_string()),
        password: Set(auth::hash_password(password)?),
        role_id: Set(role_id),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        last_active_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("Registered user {} ({})", user.id, user.username);
    Ok(user)
}

/// Case-insensitive lookup by username.
pub async fn find_by_username<C>(db: &C, username: &str) -> Result<Option<users::Model>, DbErr>
where
    C: ConnectionTrait,
{
    users::Entity::find()
        .filter(
            Expr::cust_with_values("LOWER(username) = ?", vec![username.to_lowercase()]),
        )
        .one(db)
        .await
}

/// Returns the user when the credentials match.
pub async fn authenticate<C>(db: &C, username: &str, password: &str) -> ApiResult<users::Model>
where
    C: ConnectionTrait,
{
    let user = find_by_username(db, username.trim()).await?;
    match user {
        Some(user) if auth::verify_password(password, &user.password) => Ok(user),
        _ => {
            log::info!("Failed login for {:?}", username);
            Err(ApiError::Unauthorized)
        }
    }
}

/// Ids of every super-admin, lowest first.
pub async fn super_admin_ids<C>(db: &C) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(users::Entity::find()
        .filter(users::Column::RoleId.eq(users::ROLE_SUPER_ADMIN))
        .order_by_asc(users::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect())
}

/// Records activity for the online indicator.
pub async fn touch_last_active<C>(db: &C, user_id: i32) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    users::Entity::update_many()
        .col_expr(
            users::Column::LastActiveAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(users::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Creates the super-admin account on first start, or promotes an existing
/// account with that name.
pub async fn ensure_super_admin<C>(db: &C, username: &str, password: &str) -> ApiResult<i32>
where
    C: ConnectionTrait,
{
    match find_by_username(db, username.trim()).await? {
        Some(user) if user.role_id == users::ROLE_SUPER_ADMIN => Ok(user.id),
        Some(user) => {
            users::Entity::update_many()
                .col_expr(users::Column::RoleId, Expr::value(users::ROLE_SUPER_ADMIN))
                .filter(users::Column::Id.eq(user.id))
                .exec(db)
                .await?;
            log::warn!("Promoted user {} ({}) to super-admin", user.id, user.username);
            Ok(user.id)
        }
        None => {
            let user = create_user(db, username, password, users::ROLE_SUPER_ADMIN).await?;
            log::warn!("Created super-admin {} ({})", user.id, user.username);
            Ok(user.id)
        }
    }
}
