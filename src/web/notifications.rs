//! Notification inbox routes

use crate::app_config;
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use crate::notifications;
use crate::orm::notifications as notification_orm;
use actix_web::{delete, get, post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_notifications)
        .service(unread_count)
        .service(mark_all_read)
        .service(mark_read)
        .service(delete_notification);
}

#[derive(Debug, Serialize)]
struct NotificationDisplay {
    id: i32,
    actor_id: Option<i32>,
    #[serde(rename = "type")]
    notification_type: String,
    reference_id: Option<i32>,
    message: String,
    is_read: bool,
    created_at: chrono::NaiveDateTime,
}

impl From<notification_orm::Model> for NotificationDisplay {
    fn from(n: notification_orm::Model) -> Self {
        Self {
            id: n.id,
            actor_id: n.actor_id,
            notification_type: n.type_,
            reference_id: n.reference_id,
            message: n.message,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

#[get("/api/notifications")]
pub async fn view_notifications(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let limit = app_config::limits().notifications_limit;

    let list: Vec<NotificationDisplay> =
        notifications::list_notifications(db.get_ref(), caps.user_id, limit)
            .await
            .map_err(ApiError::from)?
            .into_iter()
            .map(NotificationDisplay::from)
            .collect();
    let unread = notifications::count_unread(db.get_ref(), caps.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "notifications": list,
        "unread": unread,
    })))
}

#[get("/api/notifications/unread-count")]
pub async fn unread_count(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let count = notifications::count_unread(db.get_ref(), caps.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "count": count })))
}

/// Clears the inbox.
#[post("/api/notifications/mark-all-read")]
pub async fn mark_all_read(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let removed = notifications::mark_all_read(db.get_ref(), caps.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "removed": removed })))
}

#[post("/api/notifications/{id}/read")]
pub async fn mark_read(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let found = notifications::mark_read(db.get_ref(), path.into_inner(), caps.user_id)
        .await
        .map_err(ApiError::from)?;
    if !found {
        return Err(ApiError::not_found("Notification not found").into());
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[delete("/api/notifications/{id}")]
pub async fn delete_notification(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let found = notifications::delete_notification(db.get_ref(), path.into_inner(), caps.user_id)
        .await
        .map_err(ApiError::from)?;
    if !found {
        return Err(ApiError::not_found("Notification not found").into());
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
