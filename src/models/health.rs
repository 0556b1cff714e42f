use serde::Serialize;
use chrono::{DateTime, Utc};

// Réponse du health check : identifie le service et sa version
// (utile quand plusieurs backends tournent derrière le même proxy)
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub time: DateTime<Utc>,
}
