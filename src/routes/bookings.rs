use actix_web::{get, post, web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait};
use serde::Deserialize;
use validator::Validate;

use crate::config::BookingPolicy;
use crate::middleware::AuthUser;
use crate::models::bookings::{Entity as Bookings, Column as BookingColumn, Model as BookingModel};
use crate::routes::booking_error_response;
use crate::services::booking_service::{BookingError, BookingService};
use crate::services::notification_service::NotificationService;

// DTO de création d'une réservation
#[derive(Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub service_id: i32,
    pub date: String, // Format: "2025-06-19"
    pub time: String, // Format: "10:00"
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

// DTO de replanification
#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub date: String,
    pub time: String,
}

fn parse_slot(date: &str, time: &str) -> Result<(NaiveDate, NaiveTime), HttpResponse> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid date, expected YYYY-MM-DD"
        }))
    })?;

    let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid time, expected HH:MM"
        }))
    })?;

    Ok((date, time))
}

/// Charge une réservation et vérifie que l'appelant y a accès
/// (propriétaire ou staff)
async fn load_booking_for(
    db: &DatabaseConnection,
    booking_id: i32,
    auth_user: &AuthUser,
) -> Result<BookingModel, BookingError> {
    let booking = Bookings::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or(BookingError::NotFound)?;

    if booking.user_id != auth_user.user_id && !auth_user.is_staff {
        return Err(BookingError::Forbidden);
    }

    Ok(booking)
}

/// POST /bookings - Proposer une réservation (PROTÉGÉE)
/// Toutes les règles passent -> réservation créée en PENDING
#[post("")]
pub async fn create_booking(
    auth_user: AuthUser,
    body: web::Json<CreateBookingRequest>,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<BookingPolicy>,
    notifier: web::Data<NotificationService>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("{}", e)
        }));
    }

    let (date, time) = match parse_slot(&body.date, &body.time) {
        Ok(slot) => slot,
        Err(response) => return response,
    };

    match BookingService::propose(
        db.get_ref(),
        policy.get_ref(),
        notifier.get_ref(),
        auth_user.user_id,
        body.service_id,
        date,
        time,
        body.message.clone(),
    )
    .await
    {
        Ok(booking) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": format!(
                "Your booking has been submitted successfully! Booking reference: #{}. \
                 We will contact you soon to confirm the details.",
                booking.id
            ),
            "booking": booking
        })),
        Err(e) => booking_error_response(e),
    }
}

/// GET /bookings - Lister ses réservations (PROTÉGÉE)
#[get("")]
pub async fn list_my_bookings(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let bookings = Bookings::find()
        .filter(BookingColumn::UserId.eq(auth_user.user_id))
        .order_by_desc(BookingColumn::CreatedAt)
        .all(db.get_ref())
        .await;

    match bookings {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(e) => {
            tracing::error!(error = %e, "booking list failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// GET /bookings/{id} - Détail d'une réservation (PROTÉGÉE, owner ou staff)
#[get("/{id}")]
pub async fn get_booking(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match load_booking_for(db.get_ref(), path.into_inner(), &auth_user).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(e) => booking_error_response(e),
    }
}

/// POST /bookings/{id}/reschedule - Replanifier (PROTÉGÉE, owner ou staff)
/// Re-validation complète du nouveau créneau, retour en PENDING
#[post("/{id}/reschedule")]
pub async fn reschedule_booking(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<RescheduleRequest>,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<BookingPolicy>,
    notifier: web::Data<NotificationService>,
) -> HttpResponse {
    let (date, time) = match parse_slot(&body.date, &body.time) {
        Ok(slot) => slot,
        Err(response) => return response,
    };

    let booking = match load_booking_for(db.get_ref(), path.into_inner(), &auth_user).await {
        Ok(booking) => booking,
        Err(e) => return booking_error_response(e),
    };

    match BookingService::reschedule(
        db.get_ref(),
        policy.get_ref(),
        notifier.get_ref(),
        booking,
        date,
        time,
    )
    .await
    {
        Ok(booking) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Your booking has been rescheduled and is pending confirmation",
            "booking": booking
        })),
        Err(e) => booking_error_response(e),
    }
}

/// POST /bookings/{id}/cancel - Annuler (PROTÉGÉE, owner ou staff)
/// Uniquement depuis PENDING ou CONFIRMED
#[post("/{id}/cancel")]
pub async fn cancel_booking(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<NotificationService>,
) -> HttpResponse {
    let booking = match load_booking_for(db.get_ref(), path.into_inner(), &auth_user).await {
        Ok(booking) => booking,
        Err(e) => return booking_error_response(e),
    };

    match BookingService::cancel(
        db.get_ref(),
        notifier.get_ref(),
        booking,
        auth_user.user_id,
        auth_user.is_staff,
    )
    .await
    {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Your booking has been cancelled"
        })),
        Err(e) => booking_error_response(e),
    }
}

pub fn booking_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .service(create_booking)
            .service(list_my_bookings)
            .service(get_booking)
            .service(reschedule_booking)
            .service(cancel_booking)
    );
}
