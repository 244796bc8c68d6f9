use super::body::{flexible_id, Body, FlexibleId};
use crate::connections;
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use actix_web::{delete, get, post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_connections)
        .service(list_pending)
        .service(request_connection)
        .service(accept_connection)
        .service(remove_connection);
}

#[derive(Deserialize)]
pub struct ConnectionFormData {
    #[serde(alias = "addressee_id")]
    pub user_id: Option<FlexibleId>,
}

#[get("/api/connections")]
pub async fn list_connections(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let list = connections::list_connections(db.get_ref(), caps.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "connections": list })))
}

#[get("/api/connections/pending")]
pub async fn list_pending(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let list = connections::list_pending(db.get_ref(), caps.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "requests": list })))
}

#[post("/api/connections")]
pub async fn request_connection(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: Body<ConnectionFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let user_id =
        flexible_id(&form.user_id).ok_or_else(|| ApiError::bad_request("User id is required"))?;
    let connection = connections::request_connection(db.get_ref(), caps, user_id).await?;

    Ok(HttpResponse::Created().json(json!({ "success": true, "connection": connection })))
}

#[post("/api/connections/{connection_id}/accept")]
pub async fn accept_connection(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let connection = connections::accept_connection(db.get_ref(), caps, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "connection": connection })))
}

#[delete("/api/connections/{connection_id}")]
pub async fn remove_connection(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    connections::remove_connection(db.get_ref(), caps, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
