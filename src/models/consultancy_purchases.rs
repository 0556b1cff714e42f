use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

// Achat du package "One-Time Consultancy" : donne accès aux services
// ONE_TIME_CONSULTANCY jusqu'à expiry_date.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consultancy_purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    pub amount_paid: Decimal,
    pub purchase_date: DateTime,
    pub expiry_date: DateTime,
    pub is_active: bool,

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

impl Model {
    /// Le package est-il encore valide à l'instant donné ?
    pub fn is_valid(&self, now: DateTime) -> bool {
        self.is_active && now <= self.expiry_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn purchase(is_active: bool) -> Model {
        let purchase_date = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Model {
            id: 1,
            user_id: 1,
            amount_paid: Decimal::from(500),
            purchase_date,
            expiry_date: purchase_date + chrono::Duration::days(365),
            is_active,
            created_at: None,
        }
    }

    #[test]
    fn test_is_valid_within_expiry() {
        let p = purchase(true);
        assert!(p.is_valid(p.purchase_date + chrono::Duration::days(100)));
        // Borne : valide à l'instant exact d'expiration
        assert!(p.is_valid(p.expiry_date));
        assert!(!p.is_valid(p.expiry_date + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_is_valid_requires_active_flag() {
        let p = purchase(false);
        assert!(!p.is_valid(p.purchase_date));
    }
}
