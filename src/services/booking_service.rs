// Moteur de réservation : validation des créneaux, résolution des
// conflits et machine à états.
//
// Règles de validation (ordre fixe, première violation gagne):
//   1. date dans [aujourd'hui, aujourd'hui + max_days_ahead]
//   2. date+heure >= maintenant + min_lead_hours
//   3. heure dans [business_open, business_close] (bornes incluses)
//   4. jour != closed_weekday
//   5. aucun autre user n'occupe le créneau (service, date, heure) avec
//      une réservation active
//   6. le user n'a pas déjà une réservation active sur ce service
//
// La séquence check-then-insert tourne dans une transaction SERIALIZABLE
// et l'index partiel unique bookings_active_slot_idx (migrations/) sert
// de filet : une violation d'unicité à l'insertion devient SlotTaken.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::BookingPolicy;
use crate::models::booking_updates::ActiveModel as BookingUpdateActiveModel;
use crate::models::bookings::{
    ActiveModel as BookingActiveModel, BookingStatus, Column as BookingColumn,
    Entity as Bookings, Model as BookingModel,
};
use crate::models::services::{Column as ServiceColumn, Entity as Services};
use crate::models::users::Entity as Users;
use crate::services::notification_service::{NotificationEvent, NotificationService};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Please select a date between today and the end of the booking window.")]
    DateOutOfRange,

    #[error("Bookings must be made at least 2 hours in advance.")]
    LeadTimeTooShort,

    #[error("Please select a time within business hours (9:00 AM - 6:00 PM).")]
    OutsideBusinessHours,

    #[error("We are closed on that day. Please select another date.")]
    ClosedDay,

    #[error("This time slot is already booked. Please select another time.")]
    SlotTaken,

    #[error("You already have an active booking for this service. Please wait for it to be completed or cancelled before booking again.")]
    DuplicateActiveBooking,

    #[error("This booking cannot change to the requested status.")]
    InvalidTransition,

    #[error("Service not found.")]
    ServiceNotFound,

    #[error("Booking not found.")]
    NotFound,

    #[error("You do not have access to this booking.")]
    Forbidden,

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl BookingError {
    /// Identifiant machine-readable du type d'erreur (renvoyé au front)
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::DateOutOfRange => "DateOutOfRange",
            BookingError::LeadTimeTooShort => "LeadTimeTooShort",
            BookingError::OutsideBusinessHours => "OutsideBusinessHours",
            BookingError::ClosedDay => "ClosedDay",
            BookingError::SlotTaken => "SlotTaken",
            BookingError::DuplicateActiveBooking => "DuplicateActiveBooking",
            BookingError::InvalidTransition => "InvalidTransition",
            BookingError::ServiceNotFound => "ServiceNotFound",
            BookingError::NotFound => "NotFound",
            BookingError::Forbidden => "Forbidden",
            BookingError::Db(_) => "Internal",
        }
    }
}

/// Disponibilité d'un créneau de la grille horaire
#[derive(Debug, Serialize)]
pub struct SlotAvailability {
    pub time: NaiveTime,
    pub available: bool,
}

/// Valide la partie temporelle d'un créneau (règles 1 à 4).
/// Fonction pure : `now` est passé explicitement, donc testable sans BD.
pub fn validate_slot(
    policy: &BookingPolicy,
    now: NaiveDateTime,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<(), BookingError> {
    let today = now.date();
    if date < today || date > today + Duration::days(policy.max_days_ahead) {
        return Err(BookingError::DateOutOfRange);
    }

    let slot = NaiveDateTime::new(date, time);
    if slot < now + Duration::hours(policy.min_lead_hours) {
        return Err(BookingError::LeadTimeTooShort);
    }

    if time < policy.business_open || time > policy.business_close {
        return Err(BookingError::OutsideBusinessHours);
    }

    if date.weekday() == policy.closed_weekday {
        return Err(BookingError::ClosedDay);
    }

    Ok(())
}

/// Grille fixe des créneaux d'une journée ouvrée (bornes incluses)
pub fn slot_grid(policy: &BookingPolicy) -> Vec<NaiveTime> {
    let mut slots = Vec::new();
    let mut t = policy.business_open;

    loop {
        slots.push(t);
        let (next, wrapped) =
            t.overflowing_add_signed(Duration::minutes(policy.slot_minutes as i64));
        if wrapped != 0 || next <= t || next > policy.business_close {
            break;
        }
        t = next;
    }

    slots
}

/// Table d'adjacence de la machine à états. Les sauts d'états
/// (ex: PENDING -> COMPLETED) sont rejetés.
pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    matches!(
        (from, to),
        (BookingStatus::Pending, BookingStatus::Confirmed)
            | (BookingStatus::Pending, BookingStatus::Cancelled)
            | (BookingStatus::Confirmed, BookingStatus::InProgress)
            | (BookingStatus::Confirmed, BookingStatus::Cancelled)
            | (BookingStatus::InProgress, BookingStatus::Completed)
    )
}

pub struct BookingService;

impl BookingService {
    /// Propose une réservation (service, date, heure) pour un user.
    /// Toutes les règles passent -> insertion en PENDING.
    pub async fn propose(
        db: &DatabaseConnection,
        policy: &BookingPolicy,
        notifier: &NotificationService,
        user_id: i32,
        service_id: i32,
        date: NaiveDate,
        time: NaiveTime,
        message: Option<String>,
    ) -> Result<BookingModel, BookingError> {
        let now = Utc::now().naive_utc();

        // Le service doit exister et être actif
        let service = Services::find_by_id(service_id)
            .filter(ServiceColumn::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or(BookingError::ServiceNotFound)?;

        // Règles temporelles 1-4
        validate_slot(policy, now, date, time)?;

        // Règles d'exclusivité 5-6 + insertion, dans une transaction
        // SERIALIZABLE pour fermer la course check-then-insert
        let txn = db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        if Self::slot_occupied(&txn, service_id, date, time, Some(user_id), None).await? {
            return Err(BookingError::SlotTaken);
        }

        if Self::has_active_booking(&txn, user_id, service_id).await? {
            return Err(BookingError::DuplicateActiveBooking);
        }

        let new_booking = BookingActiveModel {
            user_id: Set(user_id),
            service_id: Set(service_id),
            preferred_date: Set(date),
            preferred_time: Set(time),
            message: Set(message),
            status: Set(BookingStatus::Pending),
            created_at: Set(Some(now)),
            ..Default::default()
        };

        let booking = new_booking.insert(&txn).await.map_err(map_conflict_err)?;
        txn.commit().await.map_err(map_conflict_err)?;

        Self::emit_status_event(db, notifier, &booking, None, &service.name).await;

        Ok(booking)
    }

    /// Replanifie une réservation PENDING ou CONFIRMED sur un nouveau
    /// créneau : re-validation complète (règles 1-5, la 6 est satisfaite
    /// d'office puisque c'est la même réservation), retour en PENDING.
    /// L'ancien créneau redevient libre pour les autres.
    pub async fn reschedule(
        db: &DatabaseConnection,
        policy: &BookingPolicy,
        notifier: &NotificationService,
        booking: BookingModel,
        new_date: NaiveDate,
        new_time: NaiveTime,
    ) -> Result<BookingModel, BookingError> {
        let now = Utc::now().naive_utc();
        let old_status = booking.status;

        if !matches!(old_status, BookingStatus::Pending | BookingStatus::Confirmed) {
            return Err(BookingError::InvalidTransition);
        }

        validate_slot(policy, now, new_date, new_time)?;

        let txn = db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        // Conflit sur le nouveau créneau, en excluant sa propre ligne
        if Self::slot_occupied(
            &txn,
            booking.service_id,
            new_date,
            new_time,
            None,
            Some(booking.id),
        )
        .await?
        {
            return Err(BookingError::SlotTaken);
        }

        let service_id = booking.service_id;
        let mut active: BookingActiveModel = booking.into();
        active.preferred_date = Set(new_date);
        active.preferred_time = Set(new_time);
        active.status = Set(BookingStatus::Pending);
        active.confirmed_at = Set(None);

        let updated = active.update(&txn).await.map_err(map_conflict_err)?;
        txn.commit().await.map_err(map_conflict_err)?;

        let service_name = Self::service_name(db, service_id).await;
        Self::emit_status_event(db, notifier, &updated, Some(old_status), &service_name).await;

        Ok(updated)
    }

    /// Annulation par le propriétaire (ou le staff), uniquement depuis
    /// PENDING ou CONFIRMED.
    pub async fn cancel(
        db: &DatabaseConnection,
        notifier: &NotificationService,
        booking: BookingModel,
        actor_user_id: i32,
        actor_is_staff: bool,
    ) -> Result<BookingModel, BookingError> {
        if booking.user_id != actor_user_id && !actor_is_staff {
            return Err(BookingError::Forbidden);
        }

        let old_status = booking.status;
        if !can_transition(old_status, BookingStatus::Cancelled) {
            return Err(BookingError::InvalidTransition);
        }

        let service_id = booking.service_id;
        let mut active: BookingActiveModel = booking.into();
        active.status = Set(BookingStatus::Cancelled);
        let updated = active.update(db).await?;

        let service_name = Self::service_name(db, service_id).await;
        Self::emit_status_event(db, notifier, &updated, Some(old_status), &service_name).await;

        Ok(updated)
    }

    /// Transition administrative (staff uniquement) le long des flèches
    /// de la machine à états. L'adjacence est stricte. Une note
    /// optionnelle est archivée dans booking_updates.
    pub async fn transition(
        db: &DatabaseConnection,
        notifier: &NotificationService,
        booking: BookingModel,
        new_status: BookingStatus,
        staff_user_id: i32,
        note: Option<String>,
        assigned_to: Option<i32>,
    ) -> Result<BookingModel, BookingError> {
        let now = Utc::now().naive_utc();
        let old_status = booking.status;

        if !can_transition(old_status, new_status) {
            return Err(BookingError::InvalidTransition);
        }

        let booking_id = booking.id;
        let service_id = booking.service_id;

        let mut active: BookingActiveModel = booking.into();
        active.status = Set(new_status);
        match new_status {
            BookingStatus::Confirmed => active.confirmed_at = Set(Some(now)),
            BookingStatus::Completed => active.completed_at = Set(Some(now)),
            _ => {}
        }
        if let Some(staff_id) = assigned_to {
            active.assigned_to = Set(Some(staff_id));
        }

        let updated = active.update(db).await?;

        if let Some(note) = note {
            let update_row = BookingUpdateActiveModel {
                booking_id: Set(booking_id),
                message: Set(note),
                created_by: Set(staff_user_id),
                is_internal: Set(false),
                created_at: Set(Some(now)),
                ..Default::default()
            };
            update_row.insert(db).await?;
        }

        let service_name = Self::service_name(db, service_id).await;
        Self::emit_status_event(db, notifier, &updated, Some(old_status), &service_name).await;

        Ok(updated)
    }

    /// Grille des créneaux d'une journée pour un service, chaque créneau
    /// marqué disponible/occupé par les réservations actives.
    /// Lecture pure, aucun verrou.
    pub async fn available_slots(
        db: &DatabaseConnection,
        policy: &BookingPolicy,
        service_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, BookingError> {
        let taken: Vec<NaiveTime> = Bookings::find()
            .filter(BookingColumn::ServiceId.eq(service_id))
            .filter(BookingColumn::PreferredDate.eq(date))
            .filter(BookingColumn::Status.is_in(BookingStatus::ACTIVE))
            .all(db)
            .await?
            .into_iter()
            .map(|b| b.preferred_time)
            .collect();

        Ok(slot_grid(policy)
            .into_iter()
            .map(|time| SlotAvailability {
                time,
                available: !taken.contains(&time),
            })
            .collect())
    }

    // ---- Helpers internes ----

    /// Règle 5 : un autre user occupe-t-il ce créneau ?
    async fn slot_occupied<C: ConnectionTrait>(
        conn: &C,
        service_id: i32,
        date: NaiveDate,
        time: NaiveTime,
        exclude_user: Option<i32>,
        exclude_booking: Option<i32>,
    ) -> Result<bool, BookingError> {
        let mut query = Bookings::find()
            .filter(BookingColumn::ServiceId.eq(service_id))
            .filter(BookingColumn::PreferredDate.eq(date))
            .filter(BookingColumn::PreferredTime.eq(time))
            .filter(BookingColumn::Status.is_in(BookingStatus::ACTIVE));

        if let Some(user_id) = exclude_user {
            query = query.filter(BookingColumn::UserId.ne(user_id));
        }
        if let Some(booking_id) = exclude_booking {
            query = query.filter(BookingColumn::Id.ne(booking_id));
        }

        Ok(query.one(conn).await?.is_some())
    }

    /// Règle 6 : le user a-t-il déjà une réservation active sur ce service ?
    async fn has_active_booking<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        service_id: i32,
    ) -> Result<bool, BookingError> {
        let existing = Bookings::find()
            .filter(BookingColumn::UserId.eq(user_id))
            .filter(BookingColumn::ServiceId.eq(service_id))
            .filter(BookingColumn::Status.is_in(BookingStatus::ACTIVE))
            .one(conn)
            .await?;

        Ok(existing.is_some())
    }

    async fn service_name(db: &DatabaseConnection, service_id: i32) -> String {
        match Services::find_by_id(service_id).one(db).await {
            Ok(Some(service)) => service.name,
            _ => format!("service #{}", service_id),
        }
    }

    /// Émet l'événement de changement de statut vers le dispatcher.
    /// Best-effort : un échec de lookup est loggé, jamais propagé.
    async fn emit_status_event(
        db: &DatabaseConnection,
        notifier: &NotificationService,
        booking: &BookingModel,
        old_status: Option<BookingStatus>,
        service_name: &str,
    ) {
        let user_email = match Users::find_by_id(booking.user_id).one(db).await {
            Ok(Some(user)) => user.email,
            Ok(None) => {
                tracing::warn!(booking_id = booking.id, "booking owner not found, notification skipped");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, booking_id = booking.id, "owner lookup failed, notification skipped");
                return;
            }
        };

        notifier.notify_detached(NotificationEvent::BookingStatusChanged {
            booking_id: booking.id,
            old_status,
            new_status: booking.status,
            user_email,
            service_name: service_name.to_string(),
        });
    }
}

/// Une violation d'unicité sur bookings_active_slot_idx signifie qu'une
/// insertion concurrente a pris le créneau entre le check et l'insert.
fn map_conflict_err(e: DbErr) -> BookingError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        BookingError::SlotTaken
    } else {
        BookingError::Db(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::services;
    use crate::models::users;

    fn policy() -> BookingPolicy {
        BookingPolicy::default()
    }

    // Lundi 9 juin 2025, 08:00
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 9)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_accepts_slot_ten_days_out_at_ten() {
        // Jeudi 19 juin à 10:00
        let result = validate_slot(&policy(), now(), date(2025, 6, 19), time(10, 0));
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_past_date() {
        let result = validate_slot(&policy(), now(), date(2025, 6, 8), time(10, 0));
        assert!(matches!(result, Err(BookingError::DateOutOfRange)));
    }

    #[test]
    fn test_rejects_date_beyond_window() {
        // 61 jours après le 9 juin = 9 août
        let result = validate_slot(&policy(), now(), date(2025, 8, 9), time(10, 0));
        assert!(matches!(result, Err(BookingError::DateOutOfRange)));
    }

    #[test]
    fn test_accepts_last_day_of_window() {
        // 60 jours après le 9 juin = 8 août (vendredi)
        let result = validate_slot(&policy(), now(), date(2025, 8, 8), time(10, 0));
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_lead_time_under_two_hours() {
        // Aujourd'hui 09:30 alors qu'il est 08:00 -> moins de 2h
        let result = validate_slot(&policy(), now(), date(2025, 6, 9), time(9, 30));
        assert!(matches!(result, Err(BookingError::LeadTimeTooShort)));
    }

    #[test]
    fn test_accepts_lead_time_of_exactly_two_hours() {
        // 08:00 + 2h = 10:00 pile
        let result = validate_slot(&policy(), now(), date(2025, 6, 9), time(10, 0));
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_time_before_opening() {
        let result = validate_slot(&policy(), now(), date(2025, 6, 19), time(8, 59));
        assert!(matches!(result, Err(BookingError::OutsideBusinessHours)));
    }

    #[test]
    fn test_rejects_time_after_closing() {
        let result = validate_slot(&policy(), now(), date(2025, 6, 19), time(18, 1));
        assert!(matches!(result, Err(BookingError::OutsideBusinessHours)));
    }

    #[test]
    fn test_accepts_business_hour_bounds() {
        // 09:00 et 18:00 sont inclus
        assert!(validate_slot(&policy(), now(), date(2025, 6, 19), time(9, 0)).is_ok());
        assert!(validate_slot(&policy(), now(), date(2025, 6, 19), time(18, 0)).is_ok());
    }

    #[test]
    fn test_rejects_sunday() {
        // Dimanche 15 juin 2025
        let result = validate_slot(&policy(), now(), date(2025, 6, 15), time(10, 0));
        assert!(matches!(result, Err(BookingError::ClosedDay)));
    }

    #[test]
    fn test_validation_order_date_window_first() {
        // Un dimanche hors fenêtre doit échouer sur DateOutOfRange,
        // pas sur ClosedDay : l'ordre des règles est fixe
        let result = validate_slot(&policy(), now(), date(2025, 9, 14), time(10, 0));
        assert!(matches!(result, Err(BookingError::DateOutOfRange)));
    }

    #[test]
    fn test_validation_order_lead_time_before_hours() {
        // Aujourd'hui 08:30 : à la fois < 2h de délai et avant ouverture.
        // Le délai (règle 2) est vérifié avant les heures ouvrées (règle 3).
        let result = validate_slot(&policy(), now(), date(2025, 6, 9), time(8, 30));
        assert!(matches!(result, Err(BookingError::LeadTimeTooShort)));
    }

    #[test]
    fn test_slot_grid_covers_business_day() {
        let slots = slot_grid(&policy());
        assert_eq!(slots.len(), 10); // 09:00 à 18:00 inclus, pas d'1h
        assert_eq!(slots.first().copied(), Some(time(9, 0)));
        assert_eq!(slots.last().copied(), Some(time(18, 0)));
    }

    #[test]
    fn test_transitions_follow_arrows() {
        use BookingStatus::*;

        assert!(can_transition(Pending, Confirmed));
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(Confirmed, InProgress));
        assert!(can_transition(Confirmed, Cancelled));
        assert!(can_transition(InProgress, Completed));
    }

    #[test]
    fn test_skip_transitions_rejected() {
        use BookingStatus::*;

        // Pas de saut d'états
        assert!(!can_transition(Pending, InProgress));
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Confirmed, Completed));
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        use BookingStatus::*;

        for to in [Pending, Confirmed, InProgress, Completed, Cancelled] {
            assert!(!can_transition(Completed, to));
            assert!(!can_transition(Cancelled, to));
        }
    }

    #[test]
    fn test_no_self_transition() {
        use BookingStatus::*;

        for status in [Pending, Confirmed, InProgress, Completed, Cancelled] {
            assert!(!can_transition(status, status));
        }
    }

    #[test]
    fn test_in_progress_cannot_be_cancelled() {
        assert!(!can_transition(BookingStatus::InProgress, BookingStatus::Cancelled));
    }

    // ---- Règles d'exclusivité 5-6, sur connexion mockée ----

    fn service_row() -> services::Model {
        services::Model {
            id: 1,
            category_id: 1,
            name: "University Application Support".to_string(),
            description: "Full application support".to_string(),
            short_description: "Application support".to_string(),
            pricing_type: services::PricingType::Fixed,
            price: None,
            admin_price: None,
            duration: "2 hours".to_string(),
            is_featured: false,
            is_active: true,
            sort_order: 0,
            created_at: None,
        }
    }

    fn user_row(id: i32) -> users::Model {
        users::Model {
            id,
            email: "ama@example.com".to_string(),
            display_name: "Ama".to_string(),
            password_hash: "pbkdf2:sha256:260000$x$y".to_string(),
            is_active: true,
            is_staff: false,
            email_verified: true,
            created_at: None,
        }
    }

    fn booking_row(id: i32, user_id: i32, d: NaiveDate, t: NaiveTime) -> BookingModel {
        BookingModel {
            id,
            user_id,
            service_id: 1,
            preferred_date: d,
            preferred_time: t,
            message: None,
            status: BookingStatus::Pending,
            admin_notes: None,
            quoted_price: None,
            assigned_to: None,
            consultancy_purchase_id: None,
            confirmed_at: None,
            completed_at: None,
            created_at: None,
        }
    }

    /// Créneau valide par rapport à l'horloge réelle : 10 jours devant,
    /// décalé d'un jour s'il tombe sur le jour de fermeture
    fn future_slot() -> (NaiveDate, NaiveTime) {
        let mut slot_date = Utc::now().date_naive() + Duration::days(10);
        if slot_date.weekday() == policy().closed_weekday {
            slot_date = slot_date + Duration::days(1);
        }
        (slot_date, NaiveTime::from_hms_opt(10, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_propose_rejects_slot_held_by_another_user() {
        let (d, t) = future_slot();
        // Le créneau est déjà tenu par la réservation PENDING du user 2
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![service_row()]])
            .append_query_results([vec![booking_row(3, 2, d, t)]])
            .into_connection();

        let result = BookingService::propose(
            &db,
            &policy(),
            &NotificationService::noop(),
            1,
            1,
            d,
            t,
            None,
        )
        .await;

        assert!(matches!(result, Err(BookingError::SlotTaken)));
    }

    #[tokio::test]
    async fn test_propose_rejects_duplicate_active_booking() {
        let (d, t) = future_slot();
        // Créneau libre, mais le user 1 a déjà une réservation active
        // sur ce service à une autre heure
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![service_row()]])
            .append_query_results([
                Vec::<BookingModel>::new(),
                vec![booking_row(3, 1, d, NaiveTime::from_hms_opt(14, 0, 0).unwrap())],
            ])
            .into_connection();

        let result = BookingService::propose(
            &db,
            &policy(),
            &NotificationService::noop(),
            1,
            1,
            d,
            t,
            None,
        )
        .await;

        assert!(matches!(result, Err(BookingError::DuplicateActiveBooking)));
    }

    #[tokio::test]
    async fn test_propose_creates_pending_booking_when_slot_free() {
        let (d, t) = future_slot();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![service_row()]])
            .append_query_results([Vec::<BookingModel>::new(), Vec::<BookingModel>::new()])
            .append_query_results([vec![booking_row(42, 1, d, t)]]) // INSERT .. RETURNING
            .append_query_results([vec![user_row(1)]]) // lookup pour la notification
            .into_connection();

        let booking = BookingService::propose(
            &db,
            &policy(),
            &NotificationService::noop(),
            1,
            1,
            d,
            t,
            None,
        )
        .await
        .unwrap();

        assert_eq!(booking.id, 42);
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_propose_rejects_unknown_service() {
        let (d, t) = future_slot();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<services::Model>::new()])
            .into_connection();

        let result = BookingService::propose(
            &db,
            &policy(),
            &NotificationService::noop(),
            1,
            99,
            d,
            t,
            None,
        )
        .await;

        assert!(matches!(result, Err(BookingError::ServiceNotFound)));
    }
}
