use actix_web::{get, web, HttpResponse};
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, ColumnTrait, Condition};
use serde::{Deserialize, Serialize};

use crate::models::resource_categories::{Entity as ResourceCategories, Column as CategoryColumn};
use crate::models::resources::{self, Entity as Resources, Column as ResourceColumn, ResourceType};

// Filtres de la liste des ressources
#[derive(Deserialize)]
pub struct ResourceListQuery {
    pub category: Option<i32>,
    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,
    pub search: Option<String>,
    pub featured: Option<bool>,
}

// Réponse ressource : le modèle + les tags déjà découpés
#[derive(Serialize)]
pub struct ResourceResponse {
    #[serde(flatten)]
    pub resource: resources::Model,
    pub tags_list: Vec<String>,
}

impl From<resources::Model> for ResourceResponse {
    fn from(resource: resources::Model) -> Self {
        let tags_list = resource.tags_list();
        ResourceResponse {
            resource,
            tags_list,
        }
    }
}

/// GET /resources - Lister les ressources publiées (PUBLIC)
#[get("")]
pub async fn list_resources(
    query: web::Query<ResourceListQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let mut select = Resources::find().filter(ResourceColumn::IsPublished.eq(true));

    if let Some(category_id) = query.category {
        select = select.filter(ResourceColumn::CategoryId.eq(category_id));
    }

    if let Some(resource_type) = query.resource_type {
        select = select.filter(ResourceColumn::ResourceType.eq(resource_type));
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{}%", search);
        select = select.filter(
            Condition::any()
                .add(ResourceColumn::Title.like(pattern.as_str()))
                .add(ResourceColumn::Description.like(pattern.as_str()))
                .add(ResourceColumn::Content.like(pattern.as_str()))
                .add(ResourceColumn::Tags.like(pattern.as_str())),
        );
    }

    if query.featured == Some(true) {
        select = select.filter(ResourceColumn::IsFeatured.eq(true));
    }

    let result = select
        .order_by_desc(ResourceColumn::PublishedAt)
        .all(db.get_ref())
        .await;

    match result {
        Ok(list) => {
            let response: Vec<ResourceResponse> =
                list.into_iter().map(ResourceResponse::from).collect();
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::error!(error = %e, "resource list failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// GET /resources/categories - Lister les catégories actives (PUBLIC)
#[get("/categories")]
pub async fn list_resource_categories(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let categories = ResourceCategories::find()
        .filter(CategoryColumn::IsActive.eq(true))
        .order_by_asc(CategoryColumn::SortOrder)
        .order_by_asc(CategoryColumn::Name)
        .all(db.get_ref())
        .await;

    match categories {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => {
            tracing::error!(error = %e, "resource category list failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// GET /resources/{id-or-slug} - Détail d'une ressource publiée (PUBLIC)
/// Accepte l'id numérique ou le slug. Incrémente views_count atomiquement
/// (UPDATE relatif, best-effort : un échec ne bloque pas la lecture).
#[get("/{key}")]
pub async fn get_resource(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let key = path.into_inner();

    let mut select = Resources::find().filter(ResourceColumn::IsPublished.eq(true));
    select = match key.parse::<i32>() {
        Ok(id) => select.filter(ResourceColumn::Id.eq(id)),
        Err(_) => select.filter(ResourceColumn::Slug.eq(key.as_str())),
    };

    let resource = match select.one(db.get_ref()).await {
        Ok(Some(resource)) => resource,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Resource not found"
            }));
        }
        Err(e) => {
            tracing::error!(error = %e, "resource lookup failed");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let increment = Resources::update_many()
        .col_expr(
            ResourceColumn::ViewsCount,
            Expr::col(ResourceColumn::ViewsCount).add(1),
        )
        .filter(ResourceColumn::Id.eq(resource.id))
        .exec(db.get_ref())
        .await;

    if let Err(e) = increment {
        tracing::warn!(error = %e, resource_id = resource.id, "view count increment failed");
    }

    HttpResponse::Ok().json(ResourceResponse::from(resource))
}

pub fn resources_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/resources")
            .service(list_resource_categories)
            .service(list_resources)
            .service(get_resource)
    );
}
