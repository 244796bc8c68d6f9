use super::body::Body;
use crate::middleware::ClientCtx;
use crate::votes;
use actix_web::{post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(vote_on_post);
}

#[derive(Deserialize)]
pub struct VoteFormData {
    #[serde(default, alias = "type")]
    pub vote_type: String,
}

/// Casts, retracts or switches the caller's vote.
#[post("/api/posts/{post_id}/vote")]
pub async fn vote_on_post(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Body<VoteFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let result = votes::cast_vote(db.get_ref(), caps, path.into_inner(), &form.vote_type).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "post_id": result.post_id,
        "upvotes": result.upvotes,
        "downvotes": result.downvotes,
        "user_vote": result.user_vote,
    })))
}
