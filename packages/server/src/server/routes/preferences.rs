use axum::extract::Extension;
use axum::Json;
use serde::Deserialize;

use crate::cache::CacheNamespace;
use crate::common::ApiError;
use crate::domains::profiles::{Game, PartnerGender, Preference, SessionType};
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

#[derive(Debug, Deserialize)]
pub struct PutPreferenceRequest {
    pub game: String,
    pub partner_gender: String,
    pub session_type: String,
    pub max_distance_km: i32,
}

/// Replace the authenticated user's matching preference.
///
/// A preference change invalidates the user's cached decks via a deck
/// version bump.
pub async fn put_preference_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(req): Json<PutPreferenceRequest>,
) -> Result<Json<Preference>, ApiError> {
    let user = require_auth(auth)?;

    req.game
        .parse::<Game>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    req.partner_gender
        .parse::<PartnerGender>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    req.session_type
        .parse::<SessionType>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if req.max_distance_km < 1 {
        return Err(ApiError::BadRequest(
            "max_distance_km must be at least 1".to_string(),
        ));
    }

    let preference = Preference {
        user_id: user.user_id,
        game: req.game,
        partner_gender: req.partner_gender,
        session_type: req.session_type,
        max_distance_km: req.max_distance_km,
    }
    .upsert(&state.db_pool)
    .await?;

    state
        .cache_versions
        .bump(user.user_id, CacheNamespace::Deck)
        .await;

    Ok(Json(preference))
}
