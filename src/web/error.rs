//! Extractor failures rendered in the API error format.

use crate::error::ApiError;
use actix_web::web::{PathConfig, QueryConfig};
use actix_web::HttpResponse;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.app_data(PathConfig::default().error_handler(|err, req| {
        log::debug!("Bad path {}: {}", req.path(), err);
        ApiError::not_found("Not found").into()
    }))
    .app_data(QueryConfig::default().error_handler(|err, req| {
        log::debug!("Bad query string on {}: {}", req.path(), err);
        ApiError::bad_request("Invalid query string").into()
    }));
}

/// Fallback for unmatched routes.
pub async fn render_404() -> HttpResponse {
    actix_web::ResponseError::error_response(&ApiError::not_found("Not found"))
}
