pub mod health;
pub mod auth;
pub mod profile;
pub mod services_catalog;
pub mod resources;
pub mod bookings;
pub mod contact;
pub mod admin;

use actix_web::{web, HttpResponse};

use crate::services::booking_service::BookingError;
use crate::services::token_service::TokenError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(profile::profile_routes)
            .configure(services_catalog::services_routes)
            .configure(resources::resources_routes)
            .configure(bookings::booking_routes)
            .configure(contact::contact_routes)
            .configure(admin::admin_routes)
    );
}

/// Mappe une BookingError vers la réponse HTTP correspondante.
/// Les erreurs de validation gardent leur kind pour que le front affiche
/// un message précis ; les erreurs BD deviennent un 500 générique.
pub fn booking_error_response(e: BookingError) -> HttpResponse {
    if let BookingError::Db(ref db_err) = e {
        tracing::error!(error = %db_err, "booking operation failed on storage");
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "kind": "Internal",
            "error": "Internal server error"
        }));
    }

    let body = serde_json::json!({
        "kind": e.kind(),
        "error": e.to_string()
    });

    match e {
        BookingError::DateOutOfRange
        | BookingError::LeadTimeTooShort
        | BookingError::OutsideBusinessHours
        | BookingError::ClosedDay => HttpResponse::BadRequest().json(body),
        BookingError::SlotTaken
        | BookingError::DuplicateActiveBooking
        | BookingError::InvalidTransition => HttpResponse::Conflict().json(body),
        BookingError::ServiceNotFound | BookingError::NotFound => {
            HttpResponse::NotFound().json(body)
        }
        BookingError::Forbidden => HttpResponse::Forbidden().json(body),
        BookingError::Db(_) => unreachable!("handled above"),
    }
}

/// Mappe une TokenError : lien invalide (400), déjà utilisé (409),
/// expiré (410 - le front propose de redemander un lien)
pub fn token_error_response(e: TokenError) -> HttpResponse {
    if let TokenError::Db(ref db_err) = e {
        tracing::error!(error = %db_err, "token operation failed on storage");
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "kind": "Internal",
            "error": "Internal server error"
        }));
    }

    let body = serde_json::json!({
        "kind": e.kind(),
        "error": e.to_string()
    });

    match e {
        TokenError::NotFound => HttpResponse::BadRequest().json(body),
        TokenError::AlreadyConsumed => HttpResponse::Conflict().json(body),
        TokenError::Expired => HttpResponse::Gone().json(body),
        TokenError::Db(_) => unreachable!("handled above"),
    }
}
