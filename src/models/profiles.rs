use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Niveau d'éducation déclaré par l'utilisateur
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EducationLevel {
    #[sea_orm(string_value = "SHS")]
    Shs,
    #[sea_orm(string_value = "DIPLOMA")]
    Diploma,
    #[sea_orm(string_value = "BACHELOR")]
    Bachelor,
    #[sea_orm(string_value = "MASTER")]
    Master,
    #[sea_orm(string_value = "PHD")]
    Phd,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

// Profil étendu : 1-1 avec users (user_id UNIQUE), créé à la demande
// via get-or-create (voir routes/profile.rs)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,

    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub education_level: Option<EducationLevel>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>, // Référence (chemin) vers le stockage externe

    pub is_verified: bool,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
