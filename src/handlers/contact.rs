// src/handlers/contact.rs
// DOCUMENTATION: Contact form handler
// PURPOSE: Accept feedback messages and relay them to the operator

use crate::errors::PlacesError;
use crate::models::ContactMessage;
use crate::services::ContactDesk;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// POST /contact
/// Validate and relay a contact message
pub async fn submit_contact(
    desk: web::Data<ContactDesk>,
    req: web::Json<ContactMessage>,
) -> Result<impl Responder, PlacesError> {
    desk.submit(&req.into_inner()).await?;

    Ok(HttpResponse::Accepted().json(json!({
        "status": "accepted",
        "message": "Thank you for your message!"
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/contact", web::post().to(submit_contact));
}
