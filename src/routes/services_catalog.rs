use actix_web::{get, web, HttpResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait, Condition};
use serde::{Deserialize, Serialize};

use crate::config::BookingPolicy;
use crate::models::service_categories::{Entity as ServiceCategories, Column as CategoryColumn};
use crate::models::services::{self, Entity as Services, Column as ServiceColumn};
use crate::routes::booking_error_response;
use crate::services::booking_service::BookingService;

// Filtres de la liste des services
#[derive(Deserialize)]
pub struct ServiceListQuery {
    pub category: Option<i32>,
    pub search: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String, // Format: "2025-06-19"
}

// Réponse service : le modèle + le prix résolu
#[derive(Serialize)]
pub struct ServiceResponse {
    #[serde(flatten)]
    pub service: services::Model,
    pub effective_price: Decimal,
    pub price_display: String,
}

impl From<services::Model> for ServiceResponse {
    fn from(service: services::Model) -> Self {
        let effective_price = service.effective_price();
        let price_display = service.price_display();
        ServiceResponse {
            service,
            effective_price,
            price_display,
        }
    }
}

/// GET /services - Lister les services actifs (PUBLIC)
#[get("")]
pub async fn list_services(
    query: web::Query<ServiceListQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let mut select = Services::find().filter(ServiceColumn::IsActive.eq(true));

    if let Some(category_id) = query.category {
        select = select.filter(ServiceColumn::CategoryId.eq(category_id));
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{}%", search);
        select = select.filter(
            Condition::any()
                .add(ServiceColumn::Name.like(pattern.as_str()))
                .add(ServiceColumn::ShortDescription.like(pattern.as_str()))
                .add(ServiceColumn::Description.like(pattern.as_str())),
        );
    }

    if query.featured == Some(true) {
        select = select.filter(ServiceColumn::IsFeatured.eq(true));
    }

    let services = select
        .order_by_asc(ServiceColumn::SortOrder)
        .order_by_asc(ServiceColumn::Name)
        .all(db.get_ref())
        .await;

    match services {
        Ok(services) => {
            let response: Vec<ServiceResponse> =
                services.into_iter().map(ServiceResponse::from).collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::error!(error = %e, "service list failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// GET /services/categories - Lister les catégories actives (PUBLIC)
#[get("/categories")]
pub async fn list_categories(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let categories = ServiceCategories::find()
        .filter(CategoryColumn::IsActive.eq(true))
        .order_by_asc(CategoryColumn::SortOrder)
        .order_by_asc(CategoryColumn::Name)
        .all(db.get_ref())
        .await;

    match categories {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => {
            tracing::error!(error = %e, "category list failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// GET /services/{id} - Détail d'un service actif (PUBLIC)
#[get("/{id}")]
pub async fn get_service(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let service = Services::find_by_id(path.into_inner())
        .filter(ServiceColumn::IsActive.eq(true))
        .one(db.get_ref())
        .await;

    match service {
        Ok(Some(service)) => HttpResponse::Ok().json(ServiceResponse::from(service)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Service not found"
        })),
        Err(e) => {
            tracing::error!(error = %e, "service lookup failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// GET /services/{id}/slots?date=YYYY-MM-DD - Grille de disponibilité (PUBLIC)
#[get("/{id}/slots")]
pub async fn get_available_slots(
    path: web::Path<i32>,
    query: web::Query<SlotsQuery>,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<BookingPolicy>,
) -> HttpResponse {
    let date = match NaiveDate::parse_from_str(&query.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid date, expected YYYY-MM-DD"
            }));
        }
    };

    match BookingService::available_slots(db.get_ref(), policy.get_ref(), path.into_inner(), date)
        .await
    {
        Ok(slots) => HttpResponse::Ok().json(slots),
        Err(e) => booking_error_response(e),
    }
}

pub fn services_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .service(list_categories)
            .service(list_services)
            .service(get_service)
            .service(get_available_slots)
    );
}
