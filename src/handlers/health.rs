// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use crate::config::Provider;
use crate::services::GeocodeCache;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;

pub async fn health_check(
    provider: web::Data<Provider>,
    cache: web::Data<Arc<GeocodeCache>>,
) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "sensory-places",
        "provider": provider.as_str(),
        "geocode_cache": cache.stats().await,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::Value;

    #[actix_rt::test]
    async fn test_health_reports_provider_and_cache() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Provider::Google))
                .app_data(web::Data::new(Arc::new(GeocodeCache::new(None))))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "sensory-places");
        assert_eq!(body["provider"], "google");
        assert_eq!(body["geocode_cache"]["total_entries"], 0);
    }
}
