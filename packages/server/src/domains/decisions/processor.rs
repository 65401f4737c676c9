use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::cache::{CacheNamespace, CacheVersionService};
use crate::common::{ConversationId, MatchId, UserId};
use crate::domains::chat::ChatService;
use crate::domains::decisions::models::{Decision, Match, UserAction};

/// Errors from a single decision application.
///
/// `InvalidDecision` is a rejected input for that one item; everything
/// else is transient and safe for the caller to retry (the operation is
/// idempotent once an idempotency key is supplied).
#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("invalid decision value: {0}")]
    InvalidDecision(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result of applying one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub matched: bool,
    pub match_id: Option<MatchId>,
    pub conversation_id: Option<ConversationId>,
}

impl DecisionOutcome {
    pub fn no_match() -> Self {
        Self {
            matched: false,
            match_id: None,
            conversation_id: None,
        }
    }
}

/// Applies swipe decisions atomically and forms matches on mutual YES.
///
/// No in-process locking: storage uniqueness constraints serialize both
/// decision finality and match creation, so any number of instances can
/// run concurrently.
#[derive(Clone)]
pub struct DecisionProcessor {
    pool: PgPool,
    chat: ChatService,
    versions: CacheVersionService,
}

impl DecisionProcessor {
    pub fn new(pool: PgPool, chat: ChatService, versions: CacheVersionService) -> Self {
        Self {
            pool,
            chat,
            versions,
        }
    }

    /// Apply a decision for (actor → target).
    ///
    /// Replays — a known idempotency key, or a pair that was already
    /// decided — return a non-matching outcome instead of an error, so
    /// client retry logic stays trivial. The action row is durably
    /// committed before any conversation work; a chat outage delays
    /// conversation visibility but never loses a recorded decision.
    pub async fn apply_decision(
        &self,
        actor_id: UserId,
        target_id: UserId,
        decision: &str,
        at: Option<DateTime<Utc>>,
        idempotency_key: Option<&str>,
        position: Option<i32>,
    ) -> Result<DecisionOutcome, DecisionError> {
        let decision: Decision = decision
            .parse()
            .map_err(|_| DecisionError::InvalidDecision(decision.to_string()))?;

        let idempotency_key = idempotency_key.filter(|key| !key.trim().is_empty());
        if let Some(key) = idempotency_key {
            if UserAction::find_by_idempotency_key(key, &self.pool)
                .await?
                .is_some()
            {
                tracing::debug!(actor_id, key, "replayed idempotency key, skipping");
                return Ok(DecisionOutcome::no_match());
            }
        }

        if UserAction::exists_for_pair(actor_id, target_id, &self.pool).await? {
            tracing::debug!(actor_id, target_id, "pair already decided, skipping");
            return Ok(DecisionOutcome::no_match());
        }

        UserAction::insert(
            actor_id,
            target_id,
            decision,
            at.unwrap_or_else(Utc::now),
            idempotency_key,
            position,
            &self.pool,
        )
        .await?;

        // The actor's candidate pool shrank; their cached decks are stale.
        self.versions.bump(actor_id, CacheNamespace::Deck).await;

        if decision == Decision::Yes
            && UserAction::exists_yes(target_id, actor_id, &self.pool).await?
        {
            let matched = Match::get_or_create(actor_id, target_id, &self.pool).await?;
            let conversation = self
                .chat
                .create_for_match(matched.id, matched.user1_id, matched.user2_id)
                .await?;

            tracing::info!(
                match_id = matched.id,
                conversation_id = conversation.id,
                "mutual match formed"
            );

            return Ok(DecisionOutcome {
                matched: true,
                match_id: Some(matched.id),
                conversation_id: Some(conversation.id),
            });
        }

        Ok(DecisionOutcome::no_match())
    }
}
