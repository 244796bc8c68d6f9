//! Community, forum, announcement and event routes

use super::body::Body;
use crate::app_config;
use crate::content::{self, NewAnnouncement, NewCommunity, NewEvent, NewForum};
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use actix_web::{get, post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_communities)
        .service(create_community)
        .service(list_forums)
        .service(create_forum)
        .service(list_announcements)
        .service(create_announcement)
        .service(list_events)
        .service(create_event);
}

#[get("/api/communities")]
pub async fn list_communities(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let communities = content::list_communities(db.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "communities": communities })))
}

#[post("/api/communities")]
pub async fn create_community(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: Body<NewCommunity>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let community = content::create_community(db.get_ref(), caps, &form).await?;

    Ok(HttpResponse::Created().json(json!({ "success": true, "community": community })))
}

#[get("/api/communities/{community_id}/forums")]
pub async fn list_forums(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let forums = content::list_forums(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "forums": forums })))
}

#[post("/api/communities/{community_id}/forums")]
pub async fn create_forum(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Body<NewForum>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let forum = content::create_forum(db.get_ref(), caps, path.into_inner(), &form).await?;

    Ok(HttpResponse::Created().json(json!({ "success": true, "forum": forum })))
}

#[get("/api/communities/{community_id}/announcements")]
pub async fn list_announcements(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let announcements = content::list_announcements(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "announcements": announcements })))
}

#[post("/api/communities/{community_id}/announcements")]
pub async fn create_announcement(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Body<NewAnnouncement>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let announcement = content::create_announcement(
        db.get_ref(),
        caps,
        path.into_inner(),
        &form,
        app_config::limits().max_post_length,
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({ "success": true, "announcement": announcement })))
}

#[get("/api/communities/{community_id}/events")]
pub async fn list_events(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let events = content::list_events(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "events": events })))
}

#[post("/api/communities/{community_id}/events")]
pub async fn create_event(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Body<NewEvent>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let event = content::create_event(db.get_ref(), caps, path.into_inner(), &form).await?;

    Ok(HttpResponse::Created().json(json!({ "success": true, "event": event })))
}
