// Dispatch de notifications best-effort (emails).
//
// Contrat : un échec d'envoi est loggé en warn et ne fait JAMAIS échouer
// l'opération métier qui l'a déclenché (création de réservation, émission
// de token...). Les routes passent par notify_detached qui envoie dans
// une tâche tokio séparée.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;

use crate::models::bookings::BookingStatus;

/// Événement sortant vers le dispatcher. Le coeur métier ne connaît que
/// cette enveloppe, pas le canal de livraison.
#[derive(Debug, Clone, Serialize)]
pub enum NotificationEvent {
    BookingStatusChanged {
        booking_id: i32,
        old_status: Option<BookingStatus>,
        new_status: BookingStatus,
        user_email: String,
        service_name: String,
    },
    EmailVerification {
        email: String,
        token: String,
        expires_at: NaiveDateTime,
    },
    PasswordReset {
        email: String,
        token: String,
        expires_at: NaiveDateTime,
    },
    ContactReceived {
        email: String,
        subject: String,
    },
}

/// Canal de livraison (SMTP en prod, no-op sans config et dans les tests)
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

pub struct SmtpChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

#[async_trait]
impl NotificationChannel for SmtpChannel {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| format!("Invalid recipient address '{}': {}", to, e))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| format!("Failed to build email: {}", e))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| format!("SMTP send failed: {}", e))
    }
}

/// Canal silencieux : utilisé quand SMTP n'est pas configuré
pub struct NoopChannel;

#[async_trait]
impl NotificationChannel for NoopChannel {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), String> {
        tracing::debug!(to, subject, "notification dropped (no SMTP configured)");
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    channel: Arc<dyn NotificationChannel>,
    base_url: String,
}

impl NotificationService {
    pub fn noop() -> Self {
        NotificationService {
            channel: Arc::new(NoopChannel),
            base_url: "http://localhost:8080".to_string(),
        }
    }

    /// Construit le service depuis l'environnement. Sans SMTP_HOST on
    /// retombe sur le canal no-op : le backend reste fonctionnel.
    pub fn from_env() -> Self {
        let base_url = std::env::var("SITE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let host = match std::env::var("SMTP_HOST") {
            Ok(h) => h,
            Err(_) => {
                tracing::warn!("SMTP_HOST not set, emails will not be sent");
                return NotificationService {
                    channel: Arc::new(NoopChannel),
                    base_url,
                };
            }
        };

        let from: Mailbox = match std::env::var("SMTP_FROM")
            .unwrap_or_else(|_| "EduBridge <no-reply@edubridge.local>".to_string())
            .parse()
        {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Invalid SMTP_FROM ({}), emails will not be sent", e);
                return NotificationService {
                    channel: Arc::new(NoopChannel),
                    base_url,
                };
            }
        };

        let mut builder = match AsyncSmtpTransport::<Tokio1Executor>::relay(&host) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("SMTP relay setup failed ({}), emails will not be sent", e);
                return NotificationService {
                    channel: Arc::new(NoopChannel),
                    base_url,
                };
            }
        };

        if let (Ok(username), Ok(password)) =
            (std::env::var("SMTP_USERNAME"), std::env::var("SMTP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        NotificationService {
            channel: Arc::new(SmtpChannel {
                transport: builder.build(),
                from,
            }),
            base_url,
        }
    }

    /// Envoie l'événement. Retourne false en cas d'échec (déjà loggé),
    /// ne propage jamais d'erreur.
    pub async fn notify(&self, event: NotificationEvent) -> bool {
        let (to, subject, body) = self.render(&event);

        match self.channel.send(&to, &subject, &body).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, to, subject, "notification dispatch failed");
                false
            }
        }
    }

    /// Fire-and-forget : l'opération appelante n'attend pas la livraison
    pub fn notify_detached(&self, event: NotificationEvent) {
        let this = self.clone();
        tokio::spawn(async move {
            this.notify(event).await;
        });
    }

    fn render(&self, event: &NotificationEvent) -> (String, String, String) {
        match event {
            NotificationEvent::BookingStatusChanged {
                booking_id,
                old_status,
                new_status,
                user_email,
                service_name,
            } => {
                let subject = match old_status {
                    None => format!("Booking received - {}", service_name),
                    Some(_) => format!("Booking update - {}", service_name),
                };
                let body = format!(
                    "Your booking #{} for \"{}\" is now {:?}.\n\n\
                     You can follow it at {}/bookings.\n",
                    booking_id, service_name, new_status, self.base_url
                );
                (user_email.clone(), subject, body)
            }
            NotificationEvent::EmailVerification {
                email,
                token,
                expires_at,
            } => {
                let body = format!(
                    "Welcome to EduBridge!\n\n\
                     Please verify your email address by visiting:\n\
                     {}/api/auth/verify-email?token={}\n\n\
                     This link expires at {} UTC.\n",
                    self.base_url, token, expires_at
                );
                (email.clone(), "Verify your email - EduBridge".to_string(), body)
            }
            NotificationEvent::PasswordReset {
                email,
                token,
                expires_at,
            } => {
                let body = format!(
                    "A password reset was requested for your account.\n\n\
                     Use this token to set a new password: {}\n\n\
                     It expires at {} UTC. If you did not request this, ignore this email.\n",
                    token, expires_at
                );
                (email.clone(), "Password reset - EduBridge".to_string(), body)
            }
            NotificationEvent::ContactReceived { email, subject } => {
                let body = format!(
                    "We received your message \"{}\" and will get back to you soon.\n",
                    subject
                );
                (email.clone(), "Message received - EduBridge".to_string(), body)
            }
        }
    }
}
