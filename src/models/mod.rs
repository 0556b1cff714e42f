// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs (email = identifiant de connexion)
//   - profiles : Profil étendu (1-1 avec users, créé à la demande)
//   - documents : Métadonnées des documents uploadés par les users
//   - service_categories : Catégories du catalogue de services
//   - services : Catalogue de services (pricing FIXED/ADMIN_SET/...)
//   - consultancy_purchases : Achats du package consultance unique
//   - resource_categories : Catégories de la bibliothèque de ressources
//   - resources : Ressources éducatives publiques (métadonnées)
//   - bookings : Réservations de services (coeur métier)
//   - booking_updates : Notes/communications liées à une réservation
//   - contact_messages : Messages du formulaire de contact
//   - verification_tokens : Tokens de vérification email + reset password
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Le schéma SQL correspondant est dans migrations/
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod users;
pub mod profiles;
pub mod documents;
pub mod service_categories;
pub mod services;
pub mod consultancy_purchases;
pub mod resource_categories;
pub mod resources;
pub mod bookings;
pub mod booking_updates;
pub mod contact_messages;
pub mod verification_tokens;
