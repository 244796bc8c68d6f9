use super::body::Body;
use crate::middleware::client_ctx::{SESSION_ROLE_ID, SESSION_USER_ID};
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use crate::notifications;
use crate::orm::users;
use crate::user::{self, UserView};
use actix_web::{get, post, web, Error, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_register).service(view_me);
}

#[derive(Deserialize)]
pub struct RegisterFormData {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct AccountResponse {
    success: bool,
    user: UserView,
}

#[derive(Serialize)]
struct MeResponse {
    success: bool,
    user: UserView,
    is_super_admin: bool,
    /// Community id to ambassador role.
    ambassador_of: HashMap<i32, &'static str>,
    unread_notifications: u64,
}

/// Registers a member account and logs it in.
#[post("/api/register")]
pub async fn post_register(
    cookies: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    form: Body<RegisterFormData>,
) -> Result<HttpResponse, Error> {
    let user = user::create_user(
        db.get_ref(),
        &form.username,
        &form.password,
        users::ROLE_MEMBER,
    )
    .await?;

    cookies.renew();
    cookies.insert(SESSION_USER_ID, user.id)?;
    cookies.insert(SESSION_ROLE_ID, user.role_id)?;

    Ok(HttpResponse::Created().json(AccountResponse {
        success: true,
        user: user.into(),
    }))
}

#[get("/api/me")]
pub async fn view_me(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let user = users::Entity::find_by_id(caps.user_id)
        .one(db.get_ref())
        .await
        .map_err(ApiError::from)?
        .ok_or(ApiError::Unauthorized)?;
    let unread_notifications = notifications::count_unread(db.get_ref(), caps.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(MeResponse {
        success: true,
        user: user.into(),
        is_super_admin: caps.is_super_admin(),
        ambassador_of: caps
            .ambassador_of
            .iter()
            .map(|(community, role)| (*community, role.as_str()))
            .collect(),
        unread_notifications,
    }))
}
