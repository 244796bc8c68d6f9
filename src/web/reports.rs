//! Report submission and moderation endpoints

use super::body::{flexible_id, Body, FlexibleId};
use crate::app_config;
use crate::middleware::ClientCtx;
use crate::moderation::{self, ResolveReport, SubmitReport};
use actix_web::{get, post, web, Error, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(submit_report)
        .service(list_reports)
        .service(view_report)
        .service(resolve_report);
}

#[derive(Deserialize)]
pub struct ReportFormData {
    #[serde(default)]
    pub item_type: String,
    pub item_id: Option<FlexibleId>,
    /// Older clients send `reason` instead of `reason_code`.
    #[serde(default, alias = "reason")]
    pub reason_code: String,
    pub reason_text: Option<String>,
    pub details: Option<String>,
}

#[derive(Deserialize)]
pub struct ResolveFormData {
    #[serde(default)]
    pub action: String,
    #[serde(alias = "resolution_notes")]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct ReportQuery {
    pub status: Option<String>,
}

#[post("/api/reports")]
pub async fn submit_report(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: Body<ReportFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let form = form.into_inner();

    let submitted = moderation::submit_report(
        db.get_ref(),
        caps,
        SubmitReport {
            item_type: form.item_type,
            item_id: flexible_id(&form.item_id),
            reason_code: form.reason_code,
            reason_text: form.reason_text,
            details: form.details,
        },
        &app_config::moderation(),
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "report": submitted.report,
        "auto_hidden": submitted.auto_hidden,
        "notified": submitted.notified,
    })))
}

#[get("/api/reports")]
pub async fn list_reports(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let reports = moderation::list_reports(db.get_ref(), caps, query.status.as_deref()).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "reports": reports })))
}

#[get("/api/reports/{report_id}")]
pub async fn view_report(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let report = moderation::get_report(db.get_ref(), caps, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "report": report })))
}

#[post("/api/reports/{report_id}/resolve")]
pub async fn resolve_report(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: Body<ResolveFormData>,
) -> Result<HttpResponse, Error> {
    let caps = client.require_login()?;
    let form = form.into_inner();

    let resolved = moderation::resolve_report(
        db.get_ref(),
        caps,
        path.into_inner(),
        ResolveReport {
            action: form.action,
            notes: form.notes,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "report": resolved.report,
        "action": resolved.action,
        "changed": resolved.changed,
        "removed": resolved.removed,
    })))
}
