use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, ActiveModelTrait};
use serde::Deserialize;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::contact_messages::{ActiveModel as ContactActiveModel, ContactStatus};
use crate::services::notification_service::{NotificationEvent, NotificationService};

// DTO du formulaire de contact
#[derive(Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// POST /contact - Envoyer un message (PUBLIC, user_id renseigné si connecté)
#[post("")]
pub async fn submit_contact(
    auth_user: Option<AuthUser>,
    body: web::Json<ContactRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<NotificationService>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("{}", e)
        }));
    }

    let new_message = ContactActiveModel {
        name: Set(body.name.clone()),
        email: Set(body.email.clone()),
        phone: Set(body.phone.clone()),
        subject: Set(body.subject.clone()),
        message: Set(body.message.clone()),
        status: Set(ContactStatus::New),
        user_id: Set(auth_user.map(|u| u.user_id)),
        created_at: Set(Some(Utc::now().naive_utc())),
        ..Default::default()
    };

    match new_message.insert(db.get_ref()).await {
        Ok(message) => {
            // Accusé de réception best-effort
            notifier.notify_detached(NotificationEvent::ContactReceived {
                email: message.email.clone(),
                subject: message.subject.clone(),
            });

            HttpResponse::Created().json(serde_json::json!({
                "success": true,
                "message": "Your message has been received. We will get back to you soon.",
                "contact_id": message.id
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "contact message insert failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to submit your message"
            }))
        }
    }
}

pub fn contact_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/contact")
            .service(submit_contact)
    );
}
