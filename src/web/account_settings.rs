//! Account settings and presence routes

use super::body::Body;
use crate::app_config;
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use crate::presence;
use crate::settings::{self, SettingsUpdate};
use actix_web::{get, put, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_settings)
        .service(update_settings)
        .service(view_presence);
}

#[get("/api/settings")]
pub async fn view_settings(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let settings = settings::get_settings(db.get_ref(), caps.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "settings": settings })))
}

#[put("/api/settings")]
pub async fn update_settings(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: Body<SettingsUpdate>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let settings = settings::update_settings(db.get_ref(), caps.user_id, &form).await?;

    log::debug!("User {} updated settings", caps.user_id);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "settings": settings })))
}

#[get("/api/users/{user_id}/presence")]
pub async fn view_presence(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let presence = presence::presence_of(
        db.get_ref(),
        client.get_id(),
        path.into_inner(),
        app_config::presence().online_window_seconds,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "presence": presence })))
}
