// Gestion des tokens à usage unique (vérification email, reset password).
//
// Garanties:
//   - TTL : 24h pour EMAIL_VERIFY, 2h pour PASSWORD_RESET
//   - Borne d'expiration : now > expires_at => expiré,
//     now == expires_at => encore valide
//   - Consommation exactement-une-fois via UPDATE conditionnel
//     (WHERE used = false) : deux requêtes concurrentes ne peuvent pas
//     toutes les deux consommer le même token
//   - Un token expiré n'est jamais marqué used (une ré-émission future
//     pour le même user/purpose n'est pas affectée)
//   - Ré-émission : s'il existe déjà un token vivant pour (user, purpose),
//     il est retourné tel quel au lieu d'en créer un doublon

use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use thiserror::Error;
use uuid::Uuid;

use crate::models::verification_tokens::{
    ActiveModel as TokenActiveModel, Column as TokenColumn, Entity as VerificationTokens,
    Model as TokenModel, TokenPurpose,
};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("This link is invalid. Please request a new one.")]
    NotFound,

    #[error("This link has already been used.")]
    AlreadyConsumed,

    #[error("This link has expired. Please request a new one.")]
    Expired,

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl TokenError {
    /// Identifiant machine-readable du type d'erreur (renvoyé au front)
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::NotFound => "NotFound",
            TokenError::AlreadyConsumed => "AlreadyConsumed",
            TokenError::Expired => "Expired",
            TokenError::Db(_) => "Internal",
        }
    }
}

/// Résultat d'une consommation réussie : de quoi appliquer l'effet aval
/// (marquer l'email vérifié / autoriser un changement de mot de passe)
#[derive(Debug)]
pub struct ConsumedToken {
    pub user_id: i32,
    pub email: Option<String>,
}

pub struct TokenService;

impl TokenService {
    /// Durée de vie d'un token selon son usage
    pub fn ttl(purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::EmailVerify => Duration::hours(24),
            TokenPurpose::PasswordReset => Duration::hours(2),
        }
    }

    /// Borne d'expiration : strictement après expires_at seulement
    pub fn is_expired(expires_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        now > expires_at
    }

    /// Émet un token pour (user, purpose). Si un token vivant (non utilisé,
    /// non expiré) existe déjà, il est réutilisé : un seul lien valide à la
    /// fois par usage. Aucun effet de bord sur le user à l'émission.
    pub async fn issue(
        db: &DatabaseConnection,
        user_id: i32,
        purpose: TokenPurpose,
        email: Option<String>,
    ) -> Result<TokenModel, TokenError> {
        let now = Utc::now().naive_utc();

        let existing = VerificationTokens::find()
            .filter(TokenColumn::UserId.eq(user_id))
            .filter(TokenColumn::Purpose.eq(purpose))
            .filter(TokenColumn::Used.eq(false))
            .filter(TokenColumn::ExpiresAt.gte(now))
            .one(db)
            .await?;

        if let Some(token) = existing {
            return Ok(token);
        }

        let new_token = TokenActiveModel {
            user_id: Set(user_id),
            token: Set(Uuid::new_v4().to_string()),
            purpose: Set(purpose),
            email: Set(email),
            used: Set(false),
            used_at: Set(None),
            expires_at: Set(now + Self::ttl(purpose)),
            created_at: Set(Some(now)),
            ..Default::default()
        };

        Ok(new_token.insert(db).await?)
    }

    /// Valide puis consomme un token, exactement une fois.
    ///
    /// Ordre des vérifications : existence, déjà utilisé, expiration
    /// (AVANT consommation), puis UPDATE conditionnel WHERE used = false.
    /// rows_affected == 0 signifie qu'une requête concurrente a gagné la
    /// course : on répond AlreadyConsumed.
    pub async fn validate_and_consume(
        db: &DatabaseConnection,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<ConsumedToken, TokenError> {
        let now = Utc::now().naive_utc();

        let row = VerificationTokens::find()
            .filter(TokenColumn::Token.eq(token))
            .filter(TokenColumn::Purpose.eq(purpose))
            .one(db)
            .await?
            .ok_or(TokenError::NotFound)?;

        if row.used {
            return Err(TokenError::AlreadyConsumed);
        }

        if Self::is_expired(row.expires_at, now) {
            return Err(TokenError::Expired);
        }

        let result = VerificationTokens::update_many()
            .col_expr(TokenColumn::Used, Expr::value(true))
            .col_expr(TokenColumn::UsedAt, Expr::value(now))
            .filter(TokenColumn::Id.eq(row.id))
            .filter(TokenColumn::Used.eq(false))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(TokenError::AlreadyConsumed);
        }

        Ok(ConsumedToken {
            user_id: row.user_id,
            email: row.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn instant() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn token_row(used: bool, expires_at: NaiveDateTime) -> TokenModel {
        TokenModel {
            id: 1,
            user_id: 7,
            token: "4fe4e227-93bb-4a2d-9e0c-8b24f2a9d951".to_string(),
            purpose: TokenPurpose::PasswordReset,
            email: None,
            used,
            used_at: None,
            expires_at,
            created_at: None,
        }
    }

    fn alive_until() -> NaiveDateTime {
        Utc::now().naive_utc() + Duration::hours(1)
    }

    #[test]
    fn test_ttl_per_purpose() {
        assert_eq!(TokenService::ttl(TokenPurpose::EmailVerify), Duration::hours(24));
        assert_eq!(TokenService::ttl(TokenPurpose::PasswordReset), Duration::hours(2));
    }

    #[test]
    fn test_expiry_boundary_exact_instant_is_valid() {
        let expires_at = instant();
        // now == expires_at => encore valide
        assert!(!TokenService::is_expired(expires_at, expires_at));
    }

    #[test]
    fn test_expiry_one_second_past_is_expired() {
        let expires_at = instant();
        let now = expires_at + Duration::seconds(1);
        assert!(TokenService::is_expired(expires_at, now));
    }

    #[test]
    fn test_not_expired_before_deadline() {
        let expires_at = instant();
        let now = expires_at - Duration::hours(1);
        assert!(!TokenService::is_expired(expires_at, now));
    }

    // ---- Chemins BD, sur connexion mockée ----

    #[tokio::test]
    async fn test_consume_succeeds_once() {
        let row = token_row(false, alive_until());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let consumed =
            TokenService::validate_and_consume(&db, &row.token, TokenPurpose::PasswordReset)
                .await
                .unwrap();

        assert_eq!(consumed.user_id, 7);
    }

    #[tokio::test]
    async fn test_consume_used_token_is_already_consumed() {
        // Deuxième consommation : la ligne porte déjà used = true
        let row = token_row(true, alive_until());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let result =
            TokenService::validate_and_consume(&db, &row.token, TokenPurpose::PasswordReset).await;

        assert!(matches!(result, Err(TokenError::AlreadyConsumed)));
    }

    #[tokio::test]
    async fn test_consume_race_loser_is_already_consumed() {
        // La ligne lue semble vivante, mais l'UPDATE conditionnel ne touche
        // aucune ligne : une requête concurrente a consommé le token entre
        // le SELECT et l'UPDATE
        let row = token_row(false, alive_until());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result =
            TokenService::validate_and_consume(&db, &row.token, TokenPurpose::PasswordReset).await;

        assert!(matches!(result, Err(TokenError::AlreadyConsumed)));
    }

    #[tokio::test]
    async fn test_consume_expired_token_stays_unconsumed() {
        let row = token_row(false, Utc::now().naive_utc() - Duration::seconds(1));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let result =
            TokenService::validate_and_consume(&db, &row.token, TokenPurpose::PasswordReset).await;

        assert!(matches!(result, Err(TokenError::Expired)));
        // Un seul statement exécuté (le SELECT) : aucun UPDATE n'a marqué
        // le token used, une ré-émission future n'est pas affectée
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_consume_unknown_token_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<TokenModel>::new()])
            .into_connection();

        let result =
            TokenService::validate_and_consume(&db, "no-such-token", TokenPurpose::EmailVerify)
                .await;

        assert!(matches!(result, Err(TokenError::NotFound)));
    }

    #[tokio::test]
    async fn test_issue_reuses_live_token() {
        let live = token_row(false, alive_until());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![live.clone()]])
            .into_connection();

        let token = TokenService::issue(&db, 7, TokenPurpose::PasswordReset, None)
            .await
            .unwrap();

        // Le token vivant est retourné tel quel, aucun doublon inséré
        assert_eq!(token.token, live.token);
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
