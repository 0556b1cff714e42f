use actix_web::{get, post, put, delete, web, HttpResponse};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait, Set, ActiveModelTrait, ModelTrait};
use serde::Deserialize;
use validator::Validate;

use crate::models::documents::{
    self, Entity as Documents, Column as DocumentColumn, ActiveModel as DocumentActiveModel,
    DocumentType,
};
use crate::models::profiles::{
    Entity as Profiles, Column as ProfileColumn, ActiveModel as ProfileActiveModel,
    EducationLevel, Model as ProfileModel,
};
use crate::middleware::AuthUser;

// DTO de mise à jour du profil : seuls les champs fournis sont modifiés
#[derive(Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>, // Format: "2000-04-25"
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub education_level: Option<EducationLevel>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

// DTO d'enregistrement des métadonnées d'un document (le blob est
// uploadé vers le stockage externe par le front)
#[derive(Deserialize, Validate)]
pub struct RegisterDocumentRequest {
    pub document_type: DocumentType,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    pub file_size_bytes: i64,
    pub description: Option<String>,
}

/// Get-or-create : au plus un profil par user, créé paresseusement
/// au premier accès
async fn get_or_create_profile(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<ProfileModel, sea_orm::DbErr> {
    if let Some(profile) = Profiles::find()
        .filter(ProfileColumn::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(profile);
    }

    let new_profile = ProfileActiveModel {
        user_id: Set(user_id),
        is_verified: Set(false),
        created_at: Set(Some(Utc::now().naive_utc())),
        ..Default::default()
    };

    new_profile.insert(db).await
}

/// GET /profile - Récupérer son profil (PROTÉGÉE)
#[get("")]
pub async fn get_profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match get_or_create_profile(db.get_ref(), auth_user.user_id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => {
            tracing::error!(error = %e, "profile get-or-create failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// PUT /profile - Mettre à jour son profil (PROTÉGÉE)
#[put("")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("{}", e)
        }));
    }

    let profile = match get_or_create_profile(db.get_ref(), auth_user.user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(error = %e, "profile get-or-create failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let date_of_birth = match &body.date_of_birth {
        Some(raw) => match chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Invalid date_of_birth, expected YYYY-MM-DD"
                }));
            }
        },
        None => None,
    };

    let mut active_model: ProfileActiveModel = profile.into();
    if let Some(phone) = &body.phone_number {
        active_model.phone_number = Set(Some(phone.clone()));
    }
    if let Some(date) = date_of_birth {
        active_model.date_of_birth = Set(Some(date));
    }
    if let Some(address) = &body.address {
        active_model.address = Set(Some(address.clone()));
    }
    if let Some(city) = &body.city {
        active_model.city = Set(Some(city.clone()));
    }
    if let Some(region) = &body.region {
        active_model.region = Set(Some(region.clone()));
    }
    if let Some(level) = body.education_level {
        active_model.education_level = Set(Some(level));
    }
    if let Some(bio) = &body.bio {
        active_model.bio = Set(Some(bio.clone()));
    }
    if let Some(picture) = &body.profile_picture {
        active_model.profile_picture = Set(Some(picture.clone()));
    }

    match active_model.update(db.get_ref()).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => {
            tracing::error!(error = %e, "profile update failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update profile"
            }))
        }
    }
}

/// GET /profile/documents - Lister ses documents (PROTÉGÉE)
#[get("/documents")]
pub async fn list_documents(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let documents = Documents::find()
        .filter(DocumentColumn::UserId.eq(auth_user.user_id))
        .order_by_desc(DocumentColumn::CreatedAt)
        .all(db.get_ref())
        .await;

    match documents {
        Ok(documents) => HttpResponse::Ok().json(documents),
        Err(e) => {
            tracing::error!(error = %e, "document list failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// POST /profile/documents - Enregistrer les métadonnées d'un document (PROTÉGÉE)
#[post("/documents")]
pub async fn register_document(
    auth_user: AuthUser,
    body: web::Json<RegisterDocumentRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("{}", e)
        }));
    }

    // Allow-list d'extensions + taille max 5MB
    if let Err(message) = documents::validate_upload(&body.file_name, body.file_size_bytes) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": message
        }));
    }

    let new_document = DocumentActiveModel {
        user_id: Set(auth_user.user_id),
        document_type: Set(body.document_type),
        title: Set(body.title.clone()),
        file_name: Set(body.file_name.clone()),
        file_size_bytes: Set(body.file_size_bytes),
        description: Set(body.description.clone()),
        is_verified: Set(false),
        created_at: Set(Some(Utc::now().naive_utc())),
        ..Default::default()
    };

    match new_document.insert(db.get_ref()).await {
        Ok(document) => HttpResponse::Created().json(document),
        Err(e) => {
            tracing::error!(error = %e, "document registration failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to register document"
            }))
        }
    }
}

/// DELETE /profile/documents/{id} - Supprimer un document (PROTÉGÉE)
/// Autorisé pour le propriétaire ou un membre du staff
#[delete("/documents/{id}")]
pub async fn delete_document(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let document_id = path.into_inner();

    let document = match Documents::find_by_id(document_id).one(db.get_ref()).await {
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

    if document.user_id != auth_user.user_id && !auth_user.is_staff {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You do not have access to this document"
        }));
    }

    match document.delete(db.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Document deleted"
        })),
        Err(e) => {
            tracing::error!(error = %e, "document delete failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete document"
            }))
        }
    }
}

pub fn profile_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profile")
            .service(get_profile)
            .service(update_profile)
            .service(list_documents)
            .service(register_document)
            .service(delete_document)
    );
}
