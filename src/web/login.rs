use super::body::Body;
use crate::middleware::client_ctx::{SESSION_ROLE_ID, SESSION_USER_ID};
use crate::user::{self, UserView};
use actix_web::{post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_login);
}

#[derive(Deserialize)]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    user: UserView,
}

#[post("/api/login")]
pub async fn post_login(
    cookies: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    form: Body<LoginFormData>,
) -> Result<HttpResponse, Error> {
    let user = user::authenticate(db.get_ref(), &form.username, &form.password).await?;

    cookies.renew();
    cookies.insert(SESSION_USER_ID, user.id)?;
    cookies.insert(SESSION_ROLE_ID, user.role_id)?;

    log::info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        user: user.into(),
    }))
}
