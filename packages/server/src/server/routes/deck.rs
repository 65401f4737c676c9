use axum::extract::Extension;
use axum::Json;

use crate::common::ApiError;
use crate::domains::deck::service::DEFAULT_DECK_SIZE;
use crate::domains::deck::Deck;
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

/// Issue a deck for the authenticated user.
///
/// Returns a full deck (possibly empty) or fails outright; there is no
/// partial deck.
pub async fn get_deck_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Deck>, ApiError> {
    let user = require_auth(auth)?;

    let deck = state
        .deck_service
        .build_deck(user.user_id, DEFAULT_DECK_SIZE)
        .await?;

    Ok(Json(deck))
}
