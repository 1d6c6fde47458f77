// src/handlers/sessions.rs
// DOCUMENTATION: HTTP handlers for map sessions
// PURPOSE: Forward UI events to a session's ViewportController and return its state

use crate::errors::PlacesError;
use crate::models::{RateRequest, SearchQuery, Viewport};
use crate::services::{CatalogMode, MapPress, Platform, SessionRegistry, USER_ID_HEADER};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MarkersQuery {
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsQuery {
    pub platform: Platform,
}

/// POST /sessions
/// Open a map session
pub async fn create_session(
    registry: web::Data<SessionRegistry>,
) -> Result<impl Responder, PlacesError> {
    let (id, controller) = registry.create().await;
    let snapshot = controller.snapshot();
    Ok(HttpResponse::Created().json(json!({
        "session_id": id,
        "snapshot": snapshot.as_ref()
    })))
}

/// GET /sessions/{id}
/// Current snapshot
pub async fn get_session(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let controller = registry.get(path.into_inner()).await?;
    let snapshot = controller.snapshot();
    Ok(HttpResponse::Ok().json(snapshot.as_ref()))
}

/// DELETE /sessions/{id}
pub async fn delete_session(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    registry.remove(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /sessions/{id}/filter
/// Switch catalog mode; responds once the catalog fetch has settled
pub async fn set_filter(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
    body: web::Json<CatalogMode>,
) -> Result<impl Responder, PlacesError> {
    let controller = registry.get(path.into_inner()).await?;
    let snapshot = controller.set_mode(body.into_inner()).await;
    Ok(HttpResponse::Ok().json(snapshot.as_ref()))
}

/// PUT /sessions/{id}/region
/// Viewport moved; the provider fetch happens after the debounce window
pub async fn set_region(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
    body: web::Json<Viewport>,
) -> Result<impl Responder, PlacesError> {
    let controller = registry.get(path.into_inner()).await?;
    let update = controller.on_region_change(body.into_inner())?;
    Ok(HttpResponse::Accepted().json(update))
}

/// PUT /sessions/{id}/query
pub async fn set_query(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
    body: web::Json<SearchQuery>,
) -> Result<impl Responder, PlacesError> {
    let controller = registry.get(path.into_inner()).await?;
    controller.on_query_change(body.into_inner());
    Ok(HttpResponse::Accepted().finish())
}

/// POST /sessions/{id}/press
pub async fn press(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
    body: web::Json<MapPress>,
) -> Result<impl Responder, PlacesError> {
    let controller = registry.get(path.into_inner()).await?;
    let selection = controller.on_press(body.into_inner());
    Ok(HttpResponse::Ok().json(selection))
}

/// POST /sessions/{id}/background
pub async fn background(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let controller = registry.get(path.into_inner()).await?;
    controller.on_screen_background();
    Ok(HttpResponse::NoContent().finish())
}

/// POST /sessions/{id}/search-results/{provider_id}/select
/// Returns the viewport the map should animate to
pub async fn select_search_result(
    registry: web::Data<SessionRegistry>,
    path: web::Path<(Uuid, String)>,
) -> Result<impl Responder, PlacesError> {
    let (id, provider_id) = path.into_inner();
    let controller = registry.get(id).await?;
    let focus = controller.select_search_result(&provider_id)?;
    Ok(HttpResponse::Ok().json(json!({ "viewport": focus })))
}

/// POST /sessions/{id}/ratings
/// Requires the X-User-Id header
pub async fn rate_place(
    req: HttpRequest,
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
    body: web::Json<RateRequest>,
) -> Result<impl Responder, PlacesError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(PlacesError::Unauthorized)?
        .to_string();

    let controller = registry.get(path.into_inner()).await?;
    let request = body.into_inner();
    let place_id = request.place_id.clone();
    let average = controller.rate_place(&user_id, request).await?;

    Ok(HttpResponse::Ok().json(json!({
        "place_id": place_id,
        "average_rating": average
    })))
}

/// GET /sessions/{id}/markers
/// Visible markers, or a GeoJSON FeatureCollection with ?format=geojson
pub async fn get_markers(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
    query: web::Query<MarkersQuery>,
) -> Result<impl Responder, PlacesError> {
    let controller = registry.get(path.into_inner()).await?;
    let markers = controller.visible_markers();

    match query.format.as_deref() {
        None | Some("json") => Ok(HttpResponse::Ok().json(markers)),
        Some("geojson") => Ok(HttpResponse::Ok()
            .content_type("application/geo+json")
            .json(markers.to_feature_collection())),
        Some(other) => Err(PlacesError::InvalidInput(format!(
            "Unsupported marker format: {}",
            other
        ))),
    }
}

/// GET /sessions/{id}/directions?platform=ios|android
/// Walking-directions deep link to the selected place
pub async fn get_directions(
    registry: web::Data<SessionRegistry>,
    path: web::Path<Uuid>,
    query: web::Query<DirectionsQuery>,
) -> Result<impl Responder, PlacesError> {
    let controller = registry.get(path.into_inner()).await?;
    let url = controller.directions(query.platform)?;
    Ok(HttpResponse::Ok().json(json!({ "url": url })))
}

/// Configuration for session routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sessions")
            .route("", web::post().to(create_session))
            .route("/{id}", web::get().to(get_session))
            .route("/{id}", web::delete().to(delete_session))
            .route("/{id}/filter", web::put().to(set_filter))
            .route("/{id}/region", web::put().to(set_region))
            .route("/{id}/query", web::put().to(set_query))
            .route("/{id}/press", web::post().to(press))
            .route("/{id}/background", web::post().to(background))
            .route(
                "/{id}/search-results/{provider_id}/select",
                web::post().to(select_search_result),
            )
            .route("/{id}/ratings", web::post().to(rate_place))
            .route("/{id}/markers", web::get().to(get_markers))
            .route("/{id}/directions", web::get().to(get_directions)),
    );
}
