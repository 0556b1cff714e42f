// ============================================================================
// MODÈLE : BOOKINGS
// ============================================================================
//
// Description:
//   Réservation d'un service par un utilisateur pour un créneau
//   (service, date, heure). Entité centrale du coeur métier.
//
// Machine à états:
//   PENDING -> CONFIRMED -> IN_PROGRESS -> COMPLETED
//   PENDING/CONFIRMED -> CANCELLED
//   Reschedule : PENDING/CONFIRMED -> PENDING (nouveau créneau, re-validation)
//   COMPLETED et CANCELLED sont terminaux.
//
// Points d'attention:
//   - Un créneau actif (PENDING/CONFIRMED/IN_PROGRESS) est exclusif par
//     (service_id, preferred_date, preferred_time) : index partiel unique
//     bookings_active_slot_idx dans migrations/ (ferme la course
//     check-then-insert, la 2e insertion concurrente échoue -> SlotTaken)
//   - Un user ne peut avoir qu'une réservation active par service
//   - Toute la validation temporelle vit dans services/booking_service.rs
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl BookingStatus {
    /// Statuts qui occupent un créneau (non terminés, non annulés)
    pub const ACTIVE: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
    ];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    pub service_id: i32,

    pub preferred_date: Date,
    pub preferred_time: Time,
    pub message: Option<String>,

    pub status: BookingStatus,
    pub admin_notes: Option<String>,
    pub quoted_price: Option<Decimal>, // Prix coté par l'admin en GHS

    pub assigned_to: Option<i32>,             // Membre du staff assigné
    pub consultancy_purchase_id: Option<i32>, // Couvert par le package consultance

    pub confirmed_at: Option<DateTime>,
    pub completed_at: Option<DateTime>,
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
        from = "Column::AssignedTo",
        to = "super::users::Column::Id"
    )]
    AssignedStaff,

    #[sea_orm(
        belongs_to = "super::services::Entity",
        from = "Column::ServiceId",
        to = "super::services::Column::Id"
    )]
    Service,

    #[sea_orm(
        belongs_to = "super::consultancy_purchases::Entity",
        from = "Column::ConsultancyPurchaseId",
        to = "super::consultancy_purchases::Column::Id"
    )]
    ConsultancyPurchase,

    #[sea_orm(has_many = "super::booking_updates::Entity")]
    Update,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::booking_updates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Update.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_statuses() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(BookingStatus::InProgress.is_active());
        assert!(!BookingStatus::Completed.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
    }
}
