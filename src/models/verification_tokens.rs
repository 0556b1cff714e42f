// ============================================================================
// MODÈLE : VERIFICATION TOKENS
// ============================================================================
//
// Description:
//   Tokens à usage unique et durée de vie bornée. Une seule table pour
//   les deux usages (colonne purpose) au lieu de deux tables séparées.
//
// Colonnes de la table verification_tokens:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - user_id (INTEGER, NOT NULL, FK vers users)
//   - token (VARCHAR, UNIQUE, NOT NULL) - UUID v4
//   - purpose (VARCHAR, NOT NULL) - EMAIL_VERIFY ou PASSWORD_RESET
//   - email (VARCHAR, NULL) - adresse visée (EMAIL_VERIFY uniquement)
//   - used (BOOLEAN, DEFAULT FALSE, NOT NULL)
//   - used_at (TIMESTAMP, NULL)
//   - expires_at (TIMESTAMP, NOT NULL)
//   - created_at (TIMESTAMP, DEFAULT CURRENT_TIMESTAMP)
//
// Workflow (email):
//   1. User s'inscrit via POST /api/auth/register
//   2. Backend crée le user avec email_verified = false
//   3. Backend génère un token UUID v4 (TTL 24h) et l'insère ici
//   4. Backend envoie l'email avec le lien contenant le token
//   5. Frontend appelle GET /api/auth/verify-email?token=xxx
//   6. Backend consomme le token (UPDATE conditionnel WHERE used = false)
//   7. Backend met users.email_verified = true
//   Reset password : même mécanique, TTL 2h, pas de colonne email.
//
// Points d'attention:
//   - Un token ne peut être consommé qu'une fois (used = true, atomique)
//   - Expiration : now > expires_at => expiré ; now == expires_at => valide
//   - Un token expiré n'est JAMAIS marqué used
//   - Ré-émission : un token vivant (non utilisé, non expiré) pour le même
//     (user, purpose) est réutilisé au lieu d'en créer un doublon
//   - ON DELETE CASCADE: si user supprimé, tokens supprimés aussi
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenPurpose {
    #[sea_orm(string_value = "EMAIL_VERIFY")]
    EmailVerify,
    #[sea_orm(string_value = "PASSWORD_RESET")]
    PasswordReset,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    #[sea_orm(unique)]
    pub token: String,

    pub purpose: TokenPurpose,

    pub email: Option<String>,

    pub used: bool,

    pub used_at: Option<DateTime>,

    pub expires_at: DateTime,

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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
