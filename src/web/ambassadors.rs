//! Community ambassador management

use super::body::{flexible_id, Body, FlexibleId};
use crate::ambassadors;
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use actix_web::{delete, get, post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_ambassadors)
        .service(add_ambassador)
        .service(remove_ambassador);
}

#[derive(Deserialize)]
pub struct AmbassadorFormData {
    pub user_id: Option<FlexibleId>,
    #[serde(default)]
    pub role: String,
}

#[get("/api/communities/{community_id}/ambassadors")]
pub async fn list_ambassadors(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let list = ambassadors::list_ambassadors(db.get_ref(), path.into_inner())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "ambassadors": list })))
}

#[post("/api/communities/{community_id}/ambassadors")]
pub async fn add_ambassador(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Body<AmbassadorFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let user_id =
        flexible_id(&form.user_id).ok_or_else(|| ApiError::bad_request("User id is required"))?;

    let ambassador =
        ambassadors::add_ambassador(db.get_ref(), caps, path.into_inner(), user_id, &form.role)
            .await?;

    Ok(HttpResponse::Created().json(json!({ "success": true, "ambassador": ambassador })))
}

#[delete("/api/communities/{community_id}/ambassadors/{user_id}")]
pub async fn remove_ambassador(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let (community_id, user_id) = path.into_inner();
    ambassadors::remove_ambassador(db.get_ref(), caps, community_id, user_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
