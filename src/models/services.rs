use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;

// Mode de tarification d'un service du catalogue
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingType {
    #[sea_orm(string_value = "FIXED")]
    Fixed,
    #[sea_orm(string_value = "ADMIN_SET")]
    AdminSet,
    #[sea_orm(string_value = "ONE_TIME_CONSULTANCY")]
    OneTimeConsultancy,
    #[sea_orm(string_value = "FREE")]
    Free,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub short_description: String,

    // Tarification : la résolution dépend de pricing_type (voir effective_price)
    pub pricing_type: PricingType,
    pub price: Option<Decimal>,       // Prix en GHS
    pub admin_price: Option<Decimal>, // Prix fixé par l'admin en GHS

    pub duration: String, // ex: "2 hours", "1 week", "Ongoing"
    pub is_featured: bool,
    pub is_active: bool,
    pub sort_order: i32,

    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_categories::Entity",
        from = "Column::CategoryId",
        to = "super::service_categories::Column::Id"
    )]
    Category,

    #[sea_orm(has_many = "super::bookings::Entity")]
    Booking,
}

impl Related<super::service_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Prix effectif selon le mode de tarification.
    /// Fonction pure : aucun effet de bord, aucune écriture BD.
    pub fn effective_price(&self) -> Decimal {
        match self.pricing_type {
            PricingType::Free => Decimal::ZERO,
            // Inclus dans le package consultance
            PricingType::OneTimeConsultancy => Decimal::ZERO,
            PricingType::AdminSet => self
                .admin_price
                .or(self.price)
                .unwrap_or(Decimal::ZERO),
            PricingType::Fixed => self.price.unwrap_or(Decimal::ZERO),
        }
    }

    /// Affichage du prix pour le front
    pub fn price_display(&self) -> String {
        match self.pricing_type {
            PricingType::Free => "Free".to_string(),
            PricingType::OneTimeConsultancy => "Included in Consultancy".to_string(),
            PricingType::AdminSet => match self.admin_price {
                Some(p) => format!("GHS {:.2}", p),
                None => "Contact for Price".to_string(),
            },
            PricingType::Fixed => {
                let price = self.effective_price();
                if price > Decimal::ZERO {
                    format!("GHS {:.2}", price)
                } else {
                    "Free".to_string()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(pricing_type: PricingType, price: Option<Decimal>, admin_price: Option<Decimal>) -> Model {
        Model {
            id: 1,
            category_id: 1,
            name: "University Application Support".to_string(),
            description: "Full application support".to_string(),
            short_description: "Application support".to_string(),
            pricing_type,
            price,
            admin_price,
            duration: "2 hours".to_string(),
            is_featured: false,
            is_active: true,
            sort_order: 0,
            created_at: None,
        }
    }

    #[test]
    fn test_effective_price_free_is_zero() {
        let s = service(PricingType::Free, Some(Decimal::from(100)), None);
        assert_eq!(s.effective_price(), Decimal::ZERO);
    }

    #[test]
    fn test_effective_price_consultancy_is_zero() {
        let s = service(PricingType::OneTimeConsultancy, Some(Decimal::from(100)), None);
        assert_eq!(s.effective_price(), Decimal::ZERO);
        assert_eq!(s.price_display(), "Included in Consultancy");
    }

    #[test]
    fn test_effective_price_admin_set_prefers_admin_price() {
        let s = service(PricingType::AdminSet, Some(Decimal::from(50)), Some(Decimal::from(75)));
        assert_eq!(s.effective_price(), Decimal::from(75));
    }

    #[test]
    fn test_effective_price_admin_set_falls_back_to_price() {
        let s = service(PricingType::AdminSet, Some(Decimal::from(50)), None);
        assert_eq!(s.effective_price(), Decimal::from(50));
        assert_eq!(s.price_display(), "Contact for Price");
    }

    #[test]
    fn test_effective_price_fixed() {
        let s = service(PricingType::Fixed, Some(Decimal::from(120)), None);
        assert_eq!(s.effective_price(), Decimal::from(120));

        let free = service(PricingType::Fixed, None, None);
        assert_eq!(free.effective_price(), Decimal::ZERO);
        assert_eq!(free.price_display(), "Free");
    }
}
