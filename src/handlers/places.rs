// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for place search
// PURPOSE: Parse requests, run the pipeline, return list and map payloads

use crate::config::CategoryCatalog;
use crate::errors::PlacesError;
use crate::models::{SearchFilter, SearchQuery, SearchResponse, ACCESSIBILITY_ADVISORY};
use crate::services::{PresentationAssembler, SearchPipeline};
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

/// Shared state of the /places scope
pub struct PlacesState {
    pub pipeline: SearchPipeline,
    pub catalog: CategoryCatalog,
    pub default_radius_m: u32,
}

/// GET /places/search
/// Geocode the location, search nearby and return enriched places
pub async fn search_places(
    state: web::Data<PlacesState>,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, PlacesError> {
    let query = query.into_inner();

    // Validate request
    if let Err(e) = query.validate() {
        return Err(PlacesError::InvalidInput(e.to_string()));
    }

    let category = match query.category.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(
            state
                .catalog
                .resolve(name)
                .map(str::to_string)
                .ok_or_else(|| PlacesError::InvalidInput(format!("Unknown category '{}'", name)))?,
        ),
        _ => None,
    };

    let filter = SearchFilter {
        radius_m: query.radius_meters(state.default_radius_m),
        category,
    };

    let outcome = state.pipeline.run(&query.location, &filter).await?;
    let map = PresentationAssembler::map_view(
        outcome.location.coordinates,
        filter.radius_m,
        &outcome.views,
    );

    Ok(HttpResponse::Ok().json(SearchResponse {
        location: outcome.location,
        radius_m: filter.radius_m,
        category: query.category,
        places: outcome.views,
        map,
        advisory: ACCESSIBILITY_ADVISORY,
        searched_at: Utc::now(),
    }))
}

/// GET /places/categories
/// Category names for the search form
pub async fn list_categories(state: web::Data<PlacesState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "categories": state.catalog.names()
    }))
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .route("/search", web::get().to(search_places))
            .route("/categories", web::get().to(list_categories)),
    );
}
