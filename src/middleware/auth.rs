use actix_web::{dev::Payload, Error, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::utils::jwt;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub is_staff: bool,
}

/// Extracteur pour les routes réservées au staff : même extraction que
/// AuthUser, plus le contrôle du flag is_staff (403 sinon)
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthUser);

fn unauthorized(message: &str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "error": message
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

fn extract_user(req: &HttpRequest) -> Result<AuthUser, Error> {
    // 1. Extraire le header Authorization
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    // 2. Convertir le header en string
    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    // 3. Extraire le token (format: "Bearer <token>")
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format (expected: Bearer <token>)"))?;

    // 4. Vérifier le token JWT
    let claims = jwt::verify_token(token)
        .map_err(|e| unauthorized(&format!("Invalid token: {}", e)))?;

    Ok(AuthUser {
        user_id: claims.sub,
        email: claims.email,
        is_staff: claims.is_staff,
    })
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}

impl FromRequest for StaffUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = extract_user(req).and_then(|user| {
            if user.is_staff {
                Ok(StaffUser(user))
            } else {
                let response = HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "Staff access required"
                }));
                Err(actix_web::error::InternalError::from_response("", response).into())
            }
        });

        ready(result)
    }
}
