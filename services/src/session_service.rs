//! Server-side sessions bound to an opaque cookie token.
//!
//! Only an HMAC-SHA256 of the token (keyed with `SESSION_SECRET`) is stored.
//! Every lookup re-reads the user row, so deactivation and deletion take
//! effect on the very next request.

use crate::error::{ServiceError, ServiceResult};
use crate::policy::Actor;
use chrono::{DateTime, Duration, Utc};
use db::models::{session, user};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use sha2::Sha256;
use util::config;

type HmacSha256 = Hmac<Sha256>;

/// Sessions are only re-stamped when older than this, to keep reads cheap.
const TOUCH_INTERVAL_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Raw token for the cookie. Never persisted.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn hash_token(secret: &str, token: &str) -> ServiceResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ServiceError::Internal(format!("invalid session key: {e}")))?;
    mac.update(token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct SessionService;

impl SessionService {
    pub async fn start(db: &DatabaseConnection, user: &user::Model) -> ServiceResult<IssuedSession> {
        Self::start_with_ttl(db, user, config::session_ttl_minutes()).await
    }

    pub async fn start_with_ttl(
        db: &DatabaseConnection,
        user: &user::Model,
        ttl_minutes: i64,
    ) -> ServiceResult<IssuedSession> {
        let token = new_token();
        let hash = hash_token(&config::session_secret(), &token)?;
        let record =
            session::Model::create(db, &hash, user.id, user.role, &user.email, ttl_minutes).await?;
        tracing::debug!(user_id = user.id, "session started");
        Ok(IssuedSession {
            token,
            expires_at: record.expires_at,
        })
    }

    /// Resolves a cookie token to the current user.
    ///
    /// Expired sessions and sessions whose user is gone or deactivated are
    /// deleted before the error is returned.
    pub async fn resolve(db: &DatabaseConnection, token: &str) -> ServiceResult<(Actor, user::Model)> {
        if token.is_empty() {
            return Err(ServiceError::Unauthenticated);
        }
        let hash = hash_token(&config::session_secret(), token)?;
        let record = session::Entity::find_by_id(hash.clone())
            .one(db)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        if record.is_expired() {
            session::Entity::delete_by_id(hash).exec(db).await?;
            return Err(ServiceError::Unauthenticated);
        }

        let Some(user) = user::Entity::find_by_id(record.user_id).one(db).await? else {
            session::Entity::delete_by_id(hash).exec(db).await?;
            return Err(ServiceError::Unauthenticated);
        };
        if !user.is_active {
            session::Entity::delete_by_id(hash).exec(db).await?;
            tracing::info!(user_id = user.id, "session rejected: account deactivated");
            return Err(ServiceError::AccountDeactivated);
        }

        let now = Utc::now();
        if now - record.last_seen_at > Duration::seconds(TOUCH_INTERVAL_SECS) {
            let mut active = record.into_active_model();
            active.last_seen_at = Set(now);
            if let Err(err) = active.update(db).await {
                tracing::warn!(error = %err, "failed to touch session");
            }
        }

        Ok((Actor::from(&user), user))
    }

    /// Ends the session for `token`. Unknown tokens are ignored.
    pub async fn end(db: &DatabaseConnection, token: &str) -> ServiceResult<()> {
        let hash = hash_token(&config::session_secret(), token)?;
        session::Entity::delete_by_id(hash).exec(db).await?;
        Ok(())
    }

    pub async fn purge_expired(db: &DatabaseConnection) -> ServiceResult<u64> {
        Ok(session::Model::delete_expired(db).await?)
    }
}
