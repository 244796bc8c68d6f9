//! Thread and post routes

use super::body::{flexible_id, Body, FlexibleId};
use crate::app_config;
use crate::content::{self, NewPost, NewThread};
use crate::middleware::ClientCtx;
use actix_web::{get, post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_threads)
        .service(create_thread)
        .service(view_thread)
        .service(create_post);
}

#[derive(Deserialize)]
pub struct NewPostFormData {
    #[serde(default)]
    pub content: String,
    pub reply_to: Option<FlexibleId>,
}

#[get("/api/forums/{forum_id}/threads")]
pub async fn list_threads(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let threads = content::list_threads(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "threads": threads })))
}

#[post("/api/forums/{forum_id}/threads")]
pub async fn create_thread(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Body<NewThread>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let thread = content::create_thread(
        db.get_ref(),
        caps,
        path.into_inner(),
        &form,
        app_config::limits().max_post_length,
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({ "success": true, "thread": thread })))
}

#[get("/api/threads/{thread_id}")]
pub async fn view_thread(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let detail = content::get_thread(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "thread": detail.thread,
        "posts": detail.posts,
    })))
}

#[post("/api/threads/{thread_id}/posts")]
pub async fn create_post(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Body<NewPostFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let form = form.into_inner();
    let input = NewPost {
        reply_to: flexible_id(&form.reply_to),
        content: form.content,
    };

    let post = content::create_post(
        db.get_ref(),
        caps,
        path.into_inner(),
        &input,
        app_config::limits().max_post_length,
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({ "success": true, "post": post })))
}
