mod models;
mod routes;
mod db;
mod config;
mod services;
mod utils;
mod middleware;

use actix_web::{App, HttpServer, web};
use tracing_subscriber::EnvFilter;

use crate::services::notification_service::NotificationService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Connecting to database...");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connected");

    // Politique de réservation résolue une fois au démarrage, puis passée
    // explicitement aux handlers (pas de singleton global)
    let policy = config::BookingPolicy::from_env();
    tracing::info!(?policy, "booking policy loaded");

    let notifier = NotificationService::from_env();

    tracing::info!("Starting server on http://127.0.0.1:8080");

    // web::Data est un Arc : on le clone au lieu de la connexion elle-même,
    // car la feature `mock` de sea-orm (dev-dependency) retire Clone de
    // DatabaseConnection lors des builds de test
    let db = web::Data::new(db);

    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(web::Data::new(policy.clone()))
            .app_data(web::Data::new(notifier.clone()))
            .configure(routes::configure_routes)
    })
        .bind(("127.0.0.1", 8080))?
        .run()
        .await
}
