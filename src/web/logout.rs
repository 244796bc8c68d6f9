use crate::middleware::ClientCtx;
use actix_web::{post, Error, HttpResponse};
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_logout);
}

#[post("/api/logout")]
pub async fn post_logout(
    client: ClientCtx,
    cookies: actix_session::Session,
) -> Result<HttpResponse, Error> {
    match client.get_id() {
        Some(id) => log::info!("User {} logged out", id),
        None => log::debug!("post_logout: no active session (already logged out?)"),
    }
    cookies.purge();
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
