// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use crate::services::SessionRegistry;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(registry: web::Data<SessionRegistry>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "storymap-places",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": registry.count().await
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
