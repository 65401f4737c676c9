use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ApiError, ConversationId, MatchId, UserId};
use crate::domains::decisions::DecisionError;
use crate::domains::profiles::UserProfile;
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

#[derive(Debug, Deserialize)]
pub struct PostDecisionRequest {
    pub deck_token: String,
    pub items: Vec<DecisionItem>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionItem {
    pub card_id: String,
    pub decision: String,
    /// Client timestamp; server time is used when absent.
    pub at: Option<DateTime<Utc>>,
    /// Card position in the deck (optional, analytics only).
    pub position: Option<i32>,
    /// Idempotency key; the Idempotency-Key header is a fallback.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostDecisionResponse {
    pub results: Vec<DecisionResult>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResult {
    pub card_id: String,
    pub matched: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_summary: Option<MatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub conversation_id: ConversationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Apply a batch of decisions against a deck token.
///
/// The token must exist, be unexpired and belong to the caller. Items are
/// processed independently: an unknown card id or invalid decision value
/// yields an error entry for that item without blocking the rest.
pub async fn post_decision_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    Json(req): Json<PostDecisionRequest>,
) -> Result<Json<PostDecisionResponse>, ApiError> {
    let user = require_auth(auth)?;

    if req.items.is_empty() {
        return Err(ApiError::BadRequest("items must not be empty".to_string()));
    }

    let session = state
        .deck_service
        .sessions()
        .get(&req.deck_token)
        .await
        .ok_or_else(|| ApiError::Gone("Deck token expired or not found".to_string()))?;

    if session.actor_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Deck token belongs to another user".to_string(),
        ));
    }
    if session.expires_at < Utc::now() {
        return Err(ApiError::Gone("Deck token expired".to_string()));
    }

    let header_key = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty());

    let mut results = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let Some(&target_id) = session.card_to_user.get(&item.card_id) else {
            results.push(DecisionResult {
                card_id: item.card_id.clone(),
                matched: false,
                match_summary: None,
                error: Some("card is not part of this deck".to_string()),
            });
            continue;
        };

        let idempotency_key = item
            .idempotency_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .or(header_key);

        let outcome = state
            .decision_processor
            .apply_decision(
                user.user_id,
                target_id,
                &item.decision,
                item.at,
                idempotency_key,
                item.position,
            )
            .await;

        match outcome {
            Ok(outcome) => {
                let match_summary = match (outcome.match_id, outcome.conversation_id) {
                    (Some(match_id), Some(conversation_id)) if outcome.matched => {
                        Some(build_match_summary(&state, target_id, match_id, conversation_id).await?)
                    }
                    _ => None,
                };

                results.push(DecisionResult {
                    card_id: item.card_id.clone(),
                    matched: outcome.matched,
                    match_summary,
                    error: None,
                });
            }
            Err(DecisionError::InvalidDecision(value)) => {
                results.push(DecisionResult {
                    card_id: item.card_id.clone(),
                    matched: false,
                    match_summary: None,
                    error: Some(format!("invalid decision value: {}", value)),
                });
            }
            Err(DecisionError::Internal(err)) => return Err(err.into()),
        }
    }

    Ok(Json(PostDecisionResponse { results }))
}

async fn build_match_summary(
    state: &AppState,
    target_id: UserId,
    match_id: MatchId,
    conversation_id: ConversationId,
) -> Result<MatchSummary, ApiError> {
    let target = UserProfile::find_by_id(target_id, &state.db_pool).await?;

    Ok(MatchSummary {
        match_id,
        conversation_id,
        name: target.as_ref().map(|t| t.display_name()),
        age: target.as_ref().and_then(|t| t.age),
        photo_url: target.and_then(|t| t.avatar_url),
    })
}
