// Politique de réservation : bornes temporelles et jour de fermeture.
//
// Résolue UNE FOIS au démarrage depuis les variables d'environnement puis
// passée explicitement (web::Data) aux handlers et au BookingService.
// Pas de singleton global : le coeur métier ne voit que cette interface
// étroite, jamais la configuration complète du site.

use chrono::{NaiveTime, Weekday};
use std::env;

#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Début des heures ouvrées (créneau le plus tôt, inclus)
    pub business_open: NaiveTime,
    /// Fin des heures ouvrées (créneau le plus tard, inclus)
    pub business_close: NaiveTime,
    /// Jour de fermeture hebdomadaire
    pub closed_weekday: Weekday,
    /// Fenêtre de réservation : aujourd'hui + N jours max
    pub max_days_ahead: i64,
    /// Délai minimum entre maintenant et le créneau demandé (heures)
    pub min_lead_hours: i64,
    /// Granularité de la grille de créneaux (minutes)
    pub slot_minutes: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        BookingPolicy {
            business_open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            business_close: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            closed_weekday: Weekday::Sun,
            max_days_ahead: 60,
            min_lead_hours: 2,
            slot_minutes: 60,
        }
    }
}

impl BookingPolicy {
    /// Charge la politique depuis l'environnement, avec les valeurs
    /// métier par défaut (09:00-18:00, fermé le dimanche, 60 jours, 2h).
    pub fn from_env() -> Self {
        let defaults = BookingPolicy::default();

        BookingPolicy {
            business_open: parse_time_var("BOOKING_BUSINESS_OPEN", defaults.business_open),
            business_close: parse_time_var("BOOKING_BUSINESS_CLOSE", defaults.business_close),
            closed_weekday: defaults.closed_weekday,
            max_days_ahead: parse_i64_var("BOOKING_MAX_DAYS_AHEAD", defaults.max_days_ahead),
            min_lead_hours: parse_i64_var("BOOKING_MIN_LEAD_HOURS", defaults.min_lead_hours),
            slot_minutes: defaults.slot_minutes,
        }
    }
}

fn parse_time_var(name: &str, default: NaiveTime) -> NaiveTime {
    env::var(name)
        .ok()
        .and_then(|v| NaiveTime::parse_from_str(&v, "%H:%M").ok())
        .unwrap_or(default)
}

fn parse_i64_var(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_business_rules() {
        let policy = BookingPolicy::default();
        assert_eq!(policy.business_open, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(policy.business_close, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(policy.closed_weekday, Weekday::Sun);
        assert_eq!(policy.max_days_ahead, 60);
        assert_eq!(policy.min_lead_hours, 2);
    }
}
