use axum::extract::Extension;
use axum::Json;
use serde::Serialize;

use crate::common::ApiError;
use crate::domains::chat::InboxItem;
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

#[derive(Debug, Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<InboxItem>,
}

/// Inbox listing for the authenticated user, newest first.
pub async fn get_conversations_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<ConversationsResponse>, ApiError> {
    let user = require_auth(auth)?;

    let conversations = state.chat_service.list_conversations(user.user_id).await?;

    Ok(Json(ConversationsResponse { conversations }))
}
