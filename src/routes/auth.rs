use actix_web::{post, get, web, HttpResponse};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait, Set, ActiveModelTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::users::{Entity as Users, Column as UserColumn, ActiveModel as UserActiveModel};
use crate::models::verification_tokens::TokenPurpose;
use crate::services::notification_service::{NotificationEvent, NotificationService};
use crate::services::token_service::TokenService;
use crate::utils::{password, jwt};
use crate::middleware::AuthUser;
use crate::routes::token_error_response;

// DTO pour l'inscription
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 120))]
    pub display_name: String,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// DTO pour changer le mot de passe
#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

#[derive(Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

// Réponse après login/register
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
}

// Réponse pour /auth/me
#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: i32,
    pub email: String,
    pub is_staff: bool,
}

/// POST /auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<NotificationService>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("{}", e)
        }));
    }

    // 1. Vérifier si l'email est déjà pris
    let existing_user = Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    match existing_user {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "An account with this email already exists"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
        _ => {}
    }

    // 2. Hash le mot de passe
    let password_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    // 3. Créer l'utilisateur (email non vérifié tant que le token
    //    de vérification n'est pas consommé)
    let new_user = UserActiveModel {
        email: Set(body.email.clone()),
        display_name: Set(body.display_name.clone()),
        password_hash: Set(password_hash),
        is_active: Set(true),
        is_staff: Set(false),
        email_verified: Set(false),
        created_at: Set(Some(Utc::now().naive_utc())),
        ..Default::default()
    };

    let user = match new_user.insert(db.get_ref()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "user creation failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create account"
            }));
        }
    };

    // 4. Émettre le token de vérification et envoyer l'email.
    //    Best-effort : un échec ici ne doit pas faire échouer l'inscription.
    match TokenService::issue(
        db.get_ref(),
        user.id,
        TokenPurpose::EmailVerify,
        Some(user.email.clone()),
    )
    .await
    {
        Ok(token) => {
            notifier.notify_detached(NotificationEvent::EmailVerification {
                email: user.email.clone(),
                token: token.token,
                expires_at: token.expires_at,
            });
        }
        Err(e) => {
            tracing::warn!(error = %e, user_id = user.id, "verification token issuance failed");
        }
    }

    // 5. Générer le JWT
    let token = match jwt::generate_token(user.id, &user.email, user.is_staff) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "JWT generation failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
        display_name: user.display_name,
        email_verified: user.email_verified,
    })
}

/// POST /auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Trouver l'utilisateur
    let user = Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    // 2. Compte désactivé = mêmes apparences qu'un mauvais mot de passe
    if !user.is_active {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid email or password"
        }));
    }

    // 3. Vérifier le mot de passe
    let is_valid = match password::verify_password(&body.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!(error = %e, "password verification failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid email or password"
        }));
    }

    // 4. Générer le JWT
    let token = match jwt::generate_token(user.id, &user.email, user.is_staff) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "JWT generation failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
        display_name: user.display_name,
        email_verified: user.email_verified,
    })
}

/// GET /auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth_user.user_id,
        email: auth_user.email,
        is_staff: auth_user.is_staff,
    })
}

/// POST /auth/change-password - Changer son mot de passe (PROTÉGÉE)
#[post("/change-password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("{}", e)
        }));
    }

    // 1. Récupérer l'utilisateur
    let user = match Users::find_by_id(auth_user.user_id).one(db.get_ref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    // 2. Vérifier l'ancien mot de passe
    let is_valid = match password::verify_password(&body.current_password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!(error = %e, "password verification failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Current password is incorrect"
        }));
    }

    // 3. Hasher et enregistrer le nouveau mot de passe
    let new_password_hash = match password::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let mut active_model: UserActiveModel = user.into();
    active_model.password_hash = Set(new_password_hash);

    match active_model.update(db.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Password changed successfully"
        })),
        Err(e) => {
            tracing::error!(error = %e, "password update failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update password"
            }))
        }
    }
}

/// GET /auth/verify-email?token=xxx - Consommer un token de vérification (PUBLIC)
#[get("/verify-email")]
pub async fn verify_email(
    query: web::Query<VerifyEmailQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Consommer le token (atomique, une seule fois)
    let consumed = match TokenService::validate_and_consume(
        db.get_ref(),
        &query.token,
        TokenPurpose::EmailVerify,
    )
    .await
    {
        Ok(consumed) => consumed,
        Err(e) => return token_error_response(e),
    };

    // 2. Appliquer l'effet aval : marquer l'email vérifié
    //    (et adopter la nouvelle adresse si le token en visait une autre)
    let user = match Users::find_by_id(consumed.user_id).one(db.get_ref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let mut active_model: UserActiveModel = user.into();
    active_model.email_verified = Set(true);
    if let Some(email) = consumed.email {
        active_model.email = Set(email);
    }

    match active_model.update(db.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Email verified successfully"
        })),
        Err(e) => {
            tracing::error!(error = %e, "email verification update failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// POST /auth/resend-verification - Redemander un lien de vérification (PROTÉGÉE)
/// Réutilise le token vivant s'il en existe un (un seul lien valide à la fois)
#[post("/resend-verification")]
pub async fn resend_verification(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<NotificationService>,
) -> HttpResponse {
    let token = match TokenService::issue(
        db.get_ref(),
        auth_user.user_id,
        TokenPurpose::EmailVerify,
        Some(auth_user.email.clone()),
    )
    .await
    {
        Ok(token) => token,
        Err(e) => return token_error_response(e),
    };

    notifier.notify_detached(NotificationEvent::EmailVerification {
        email: auth_user.email,
        token: token.token,
        expires_at: token.expires_at,
    });

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Verification email sent"
    }))
}

/// POST /auth/forgot-password - Demander un reset de mot de passe (PUBLIC)
/// Répond toujours 200 avec le même message, que le compte existe ou non
/// (pas d'énumération d'emails)
#[post("/forgot-password")]
pub async fn forgot_password(
    body: web::Json<ForgotPasswordRequest>,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<NotificationService>,
) -> HttpResponse {
    let generic_response = || {
        HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "If that email is registered, a reset link has been sent"
        }))
    };

    if body.validate().is_err() {
        return generic_response();
    }

    let user = match Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .filter(UserColumn::IsActive.eq(true))
        .one(db.get_ref())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return generic_response(),
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed");
            return generic_response();
        }
    };

    match TokenService::issue(db.get_ref(), user.id, TokenPurpose::PasswordReset, None).await {
        Ok(token) => {
            notifier.notify_detached(NotificationEvent::PasswordReset {
                email: user.email,
                token: token.token,
                expires_at: token.expires_at,
            });
        }
        Err(e) => {
            tracing::warn!(error = %e, user_id = user.id, "reset token issuance failed");
        }
    }

    generic_response()
}

/// POST /auth/reset-password - Consommer le token et poser le nouveau mot de passe (PUBLIC)
#[post("/reset-password")]
pub async fn reset_password(
    body: web::Json<ResetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("{}", e)
        }));
    }

    // 1. Consommer le token AVANT de toucher au mot de passe : un token
    //    consommé ne peut pas resservir même si la suite échoue
    let consumed = match TokenService::validate_and_consume(
        db.get_ref(),
        &body.token,
        TokenPurpose::PasswordReset,
    )
    .await
    {
        Ok(consumed) => consumed,
        Err(e) => return token_error_response(e),
    };

    // 2. Hasher et poser le nouveau mot de passe
    let new_password_hash = match password::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let user = match Users::find_by_id(consumed.user_id).one(db.get_ref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let mut active_model: UserActiveModel = user.into();
    active_model.password_hash = Set(new_password_hash);

    match active_model.update(db.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Password reset successfully"
        })),
        Err(e) => {
            tracing::error!(error = %e, "password reset update failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
            .service(change_password)
            .service(verify_email)
            .service(resend_verification)
            .service(forgot_password)
            .service(reset_password)
    );
}
