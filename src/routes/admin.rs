use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait, Set, ActiveModelTrait};
use serde::Deserialize;

use crate::middleware::StaffUser;
use crate::models::bookings::{Entity as Bookings, Column as BookingColumn, BookingStatus};
use crate::models::contact_messages::{
    Entity as ContactMessages, Column as ContactColumn,
    ActiveModel as ContactActiveModel, ContactStatus,
};
use crate::models::documents::{Entity as Documents, ActiveModel as DocumentActiveModel};
use crate::routes::booking_error_response;
use crate::services::booking_service::BookingService;
use crate::services::notification_service::NotificationService;

#[derive(Deserialize)]
pub struct BookingFilterQuery {
    pub status: Option<BookingStatus>,
}

// DTO de transition administrative d'une réservation
#[derive(Deserialize)]
pub struct TransitionRequest {
    pub status: BookingStatus,
    pub note: Option<String>,
    pub assigned_to: Option<i32>,
}

// DTO de vérification d'un document
#[derive(Deserialize)]
pub struct VerifyDocumentRequest {
    pub approved: bool,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct ContactFilterQuery {
    pub status: Option<ContactStatus>,
}

// DTO de triage d'un message de contact
#[derive(Deserialize)]
pub struct ContactStatusRequest {
    pub status: ContactStatus,
    pub notes: Option<String>,
    pub assigned_to: Option<i32>,
}

/// GET /admin/bookings?status= - Toutes les réservations (STAFF)
#[get("/bookings")]
pub async fn list_all_bookings(
    _staff: StaffUser,
    query: web::Query<BookingFilterQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let mut select = Bookings::find();

    if let Some(status) = query.status {
        select = select.filter(BookingColumn::Status.eq(status));
    }

    let bookings = select
        .order_by_desc(BookingColumn::CreatedAt)
        .all(db.get_ref())
        .await;

    match bookings {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(e) => {
            tracing::error!(error = %e, "admin booking list failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// POST /admin/bookings/{id}/transition - Transition administrative (STAFF)
/// Adjacence stricte de la machine à états, note optionnelle archivée
#[post("/bookings/{id}/transition")]
pub async fn transition_booking(
    staff: StaffUser,
    path: web::Path<i32>,
    body: web::Json<TransitionRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<NotificationService>,
) -> HttpResponse {
    let booking = match Bookings::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(booking)) => booking,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Booking not found"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "booking lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    match BookingService::transition(
        db.get_ref(),
        notifier.get_ref(),
        booking,
        body.status,
        staff.0.user_id,
        body.note.clone(),
        body.assigned_to,
    )
    .await
    {
        Ok(booking) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "booking": booking
        })),
        Err(e) => booking_error_response(e),
    }
}

/// POST /admin/documents/{id}/verify - Vérifier un document (STAFF)
#[post("/documents/{id}/verify")]
pub async fn verify_document(
    staff: StaffUser,
    path: web::Path<i32>,
    body: web::Json<VerifyDocumentRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let document = match Documents::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(document)) => document,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Document not found"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "document lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let mut active_model: DocumentActiveModel = document.into();
    active_model.is_verified = Set(body.approved);
    active_model.verified_by = Set(Some(staff.0.user_id));
    active_model.verification_notes = Set(body.notes.clone());
    active_model.verification_date = Set(Some(Utc::now().naive_utc()));

    match active_model.update(db.get_ref()).await {
        Ok(document) => HttpResponse::Ok().json(document),
        Err(e) => {
            tracing::error!(error = %e, "document verification failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update document"
            }))
        }
    }
}

/// GET /admin/contact?status= - Messages de contact (STAFF)
#[get("/contact")]
pub async fn list_contact_messages(
    _staff: StaffUser,
    query: web::Query<ContactFilterQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let mut select = ContactMessages::find();

    if let Some(status) = query.status {
        select = select.filter(ContactColumn::Status.eq(status));
    }

    let messages = select
        .order_by_desc(ContactColumn::CreatedAt)
        .all(db.get_ref())
        .await;

    match messages {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => {
            tracing::error!(error = %e, "contact list failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// POST /admin/contact/{id}/status - Triage d'un message (STAFF)
#[post("/contact/{id}/status")]
pub async fn update_contact_status(
    staff: StaffUser,
    path: web::Path<i32>,
    body: web::Json<ContactStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let message = match ContactMessages::find_by_id(path.into_inner()).one(db.get_ref()).await {
        Ok(Some(message)) => message,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Contact message not found"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "contact lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let mut active_model: ContactActiveModel = message.into();
    active_model.status = Set(body.status);
    if let Some(notes) = &body.notes {
        active_model.admin_notes = Set(Some(notes.clone()));
    }
    active_model.assigned_to = Set(body.assigned_to.or(Some(staff.0.user_id)));
    if matches!(body.status, ContactStatus::Resolved | ContactStatus::Closed) {
        active_model.resolved_at = Set(Some(Utc::now().naive_utc()));
    }

    match active_model.update(db.get_ref()).await {
        Ok(message) => HttpResponse::Ok().json(message),
        Err(e) => {
            tracing::error!(error = %e, "contact status update failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update contact message"
            }))
        }
    }
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(list_all_bookings)
            .service(transition_booking)
            .service(verify_document)
            .service(list_contact_messages)
            .service(update_contact_status)
    );
}
