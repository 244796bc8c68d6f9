//! Feed and follow routes

use super::body::{flexible_id, Body, FlexibleId};
use crate::app_config;
use crate::error::ApiError;
use crate::feed;
use crate::middleware::ClientCtx;
use crate::settings::FeedScope;
use actix_web::{delete, get, post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_feed).service(follow).service(unfollow);
}

#[derive(Deserialize)]
pub struct FeedQuery {
    pub scope: Option<String>,
    pub page: Option<u64>,
}

#[derive(Deserialize)]
pub struct FollowFormData {
    #[serde(default)]
    pub target_type: String,
    pub target_id: Option<FlexibleId>,
}

#[get("/api/feed")]
pub async fn view_feed(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let scope = match query.scope.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Some(
            FeedScope::parse(s)
                .ok_or_else(|| ApiError::bad_request("Scope must be 'following' or 'all'"))?,
        ),
        None => None,
    };

    let page = feed::fetch_feed(
        db.get_ref(),
        caps.user_id,
        scope,
        query.page.unwrap_or(1),
        app_config::limits().feed_page_size,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "scope": page.scope,
        "page": page.page,
        "threads": page.threads,
    })))
}

#[post("/api/follows")]
pub async fn follow(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: Body<FollowFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let target_id =
        flexible_id(&form.target_id).ok_or_else(|| ApiError::bad_request("Target id is required"))?;
    feed::follow(db.get_ref(), caps, &form.target_type, target_id).await?;

    Ok(HttpResponse::Created().json(json!({ "success": true })))
}

#[delete("/api/follows")]
pub async fn unfollow(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: Body<FollowFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let target_id =
        flexible_id(&form.target_id).ok_or_else(|| ApiError::bad_request("Target id is required"))?;
    feed::unfollow(db.get_ref(), caps, &form.target_type, target_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
