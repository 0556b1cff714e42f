use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Types de documents acceptés pour un dossier de candidature
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    #[sea_orm(string_value = "ID")]
    Id,
    #[sea_orm(string_value = "BIRTH_CERT")]
    BirthCert,
    #[sea_orm(string_value = "ACADEMIC")]
    Academic,
    #[sea_orm(string_value = "RECOMMENDATION")]
    Recommendation,
    #[sea_orm(string_value = "PERSONAL_STATEMENT")]
    PersonalStatement,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

// Métadonnées d'un document uploadé. Le blob lui-même vit dans un
// stockage externe : seul file_name + file_size_bytes sont persistés ici.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    pub document_type: DocumentType,
    pub title: String,
    pub file_name: String,
    pub file_size_bytes: i64,
    pub description: Option<String>,

    // Vérification par un membre du staff uniquement
    pub is_verified: bool,
    pub verified_by: Option<i32>,
    pub verification_notes: Option<String>,
    pub verification_date: Option<DateTime>,

    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::VerifiedBy",
        to = "super::users::Column::Id"
    )]
    Verifier,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// Contraintes d'upload : extensions autorisées et taille max 5MB
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "jpg", "jpeg", "png", "doc", "docx"];
pub const MAX_FILE_SIZE_BYTES: i64 = 5 * 1024 * 1024;

/// Valide le nom de fichier (allow-list d'extensions) et la taille (max 5MB)
/// avant d'enregistrer les métadonnées d'un document.
pub fn validate_upload(file_name: &str, file_size_bytes: i64) -> Result<(), String> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(format!(
            "File type '.{}' is not allowed. Allowed formats: PDF, JPG, PNG, DOC, DOCX",
            extension
        ));
    }

    if file_size_bytes <= 0 || file_size_bytes > MAX_FILE_SIZE_BYTES {
        return Err("File size must be between 1 byte and 5MB".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload_accepts_allowed_extensions() {
        assert!(validate_upload("transcript.pdf", 1024).is_ok());
        assert!(validate_upload("photo.JPG", 1024).is_ok());
        assert!(validate_upload("statement.docx", MAX_FILE_SIZE_BYTES).is_ok());
    }

    #[test]
    fn test_validate_upload_rejects_bad_extension() {
        assert!(validate_upload("virus.exe", 1024).is_err());
        assert!(validate_upload("noextension", 1024).is_err());
    }

    #[test]
    fn test_validate_upload_rejects_oversize() {
        assert!(validate_upload("big.pdf", MAX_FILE_SIZE_BYTES + 1).is_err());
        assert!(validate_upload("empty.pdf", 0).is_err());
    }
}
