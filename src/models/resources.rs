// ============================================================================
// MODÈLE : RESOURCES
// ============================================================================
//
// Description:
//   Bibliothèque publique de ressources éducatives (articles, guides,
//   vidéos, liens). Métadonnées uniquement : les blobs (images, fichiers)
//   vivent dans le stockage externe, comme pour documents.
//
// Points d'attention:
//   - Seules les ressources is_published = true sont servies au public
//   - slug UNIQUE, dérivé du titre quand il n'est pas fourni (slugify)
//   - tags : chaîne séparée par des virgules, tags_list() pour le front
//   - views_count incrémenté atomiquement à la lecture du détail
//     (UPDATE ... SET views_count = views_count + 1, best-effort)
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Type de ressource : conditionne quel champ de contenu est pertinent
// (content pour ARTICLE/GUIDE, video_url pour VIDEO, external_url pour LINK)
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    #[sea_orm(string_value = "ARTICLE")]
    Article,
    #[sea_orm(string_value = "VIDEO")]
    Video,
    #[sea_orm(string_value = "DOCUMENT")]
    Document,
    #[sea_orm(string_value = "LINK")]
    Link,
    #[sea_orm(string_value = "GUIDE")]
    Guide,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub category_id: i32,
    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub resource_type: ResourceType,
    pub description: String,
    pub content: Option<String>,      // Corps complet (ARTICLE, GUIDE)
    pub video_url: Option<String>,    // YouTube/Vimeo (VIDEO)
    pub external_url: Option<String>, // Lien sortant (LINK)
    pub tags: Option<String>,         // Séparés par des virgules

    pub author_id: i32,
    pub is_featured: bool,
    pub is_published: bool,
    pub views_count: i32,

    pub published_at: Option<DateTime>,
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::resource_categories::Entity",
        from = "Column::CategoryId",
        to = "super::resource_categories::Column::Id"
    )]
    Category,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
}

impl Related<super::resource_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Tags sous forme de liste pour le front (chaîne vide -> liste vide)
    pub fn tags_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Slug URL-safe dérivé d'un titre : minuscules, tirets entre les mots,
/// tout caractère non alphanumérique écrasé.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic_title() {
        assert_eq!(slugify("University Application Guide"), "university-application-guide");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("SHS -> University: what next?!"), "shs-university-what-next");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  Scholarships 2025  "), "scholarships-2025");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_tags_list_parsing() {
        let resource = Model {
            id: 1,
            category_id: 1,
            title: "Guide".to_string(),
            slug: "guide".to_string(),
            resource_type: ResourceType::Guide,
            description: "A guide".to_string(),
            content: None,
            video_url: None,
            external_url: None,
            tags: Some("visa, scholarships ,  ,uk".to_string()),
            author_id: 1,
            is_featured: false,
            is_published: true,
            views_count: 0,
            published_at: None,
            created_at: None,
        };

        assert_eq!(resource.tags_list(), vec!["visa", "scholarships", "uk"]);

        let untagged = Model { tags: None, ..resource };
        assert!(untagged.tags_list().is_empty());
    }
}
