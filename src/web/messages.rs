//! Direct message routes

use super::body::{flexible_id, Body, FlexibleId};
use crate::app_config;
use crate::error::ApiError;
use crate::messages;
use crate::middleware::ClientCtx;
use crate::orm::messages as message_orm;
use actix_web::{get, post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // unread-count must be registered before the {user_id} route.
    conf.service(unread_count)
        .service(send_message)
        .service(view_conversation)
        .service(mark_conversation_read);
}

#[derive(Deserialize)]
pub struct MessageFormData {
    pub recipient_id: Option<FlexibleId>,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

#[derive(Serialize)]
struct MessageDisplay {
    id: i32,
    sender_id: i32,
    recipient_id: i32,
    content: String,
    is_read: bool,
    created_at: chrono::NaiveDateTime,
}

impl From<message_orm::Model> for MessageDisplay {
    fn from(m: message_orm::Model) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            content: m.content,
            is_read: m.is_read,
            created_at: m.created_at,
        }
    }
}

#[get("/api/messages/unread-count")]
pub async fn unread_count(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let count = messages::unread_count(db.get_ref(), caps.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "count": count })))
}

#[post("/api/messages")]
pub async fn send_message(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: Body<MessageFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let recipient_id = flexible_id(&form.recipient_id)
        .ok_or_else(|| ApiError::bad_request("Recipient is required"))?;
    let message = messages::send_message(db.get_ref(), caps, recipient_id, &form.content).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": MessageDisplay::from(message),
    })))
}

#[get("/api/messages/{user_id}")]
pub async fn view_conversation(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let list: Vec<MessageDisplay> = messages::conversation(
        db.get_ref(),
        caps.user_id,
        path.into_inner(),
        query.page.unwrap_or(1),
        app_config::limits().messages_page_size,
    )
    .await?
    .into_iter()
    .map(MessageDisplay::from)
    .collect();

    Ok(HttpResponse::Ok().json(json!({ "success": true, "messages": list })))
}

#[post("/api/messages/{user_id}/read")]
pub async fn mark_conversation_read(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let updated = messages::mark_conversation_read(db.get_ref(), caps.user_id, path.into_inner())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "updated": updated })))
}
