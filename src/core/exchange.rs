//! One request/response round-trip with the model.

use tracing::{debug, warn};

use crate::core::error::ExchangeError;
use crate::core::message::Source;
use crate::core::session::ChatSession;
use crate::core::sources::sources_from_response;

/// The model's answer to one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub sources: Vec<Source>,
}

pub type ExchangeOutcome = Result<BotReply, ExchangeError>;

/// Send `user_text` on `session` and normalize the reply.
///
/// Errors are returned rather than swallowed; the conversation decides what
/// the user sees. No retry is attempted.
pub async fn exchange(session: &dyn ChatSession, user_text: &str) -> ExchangeOutcome {
    let text = user_text.trim();
    if text.is_empty() {
        return Err(ExchangeError::EmptyMessage);
    }

    let outcome = send_and_extract(session, text).await;
    if let Err(err) = &outcome {
        warn!(error = %err, "message exchange failed");
    }
    outcome
}

async fn send_and_extract(session: &dyn ChatSession, text: &str) -> ExchangeOutcome {
    let response = session.send_message(text).await?;

    if let Some(reason) = response.block_reason() {
        return Err(ExchangeError::api(None, format!("prompt blocked: {reason}")));
    }

    let candidate = response
        .first_candidate()
        .ok_or_else(|| ExchangeError::malformed("response has no candidates"))?;

    let reply_text = candidate
        .content
        .as_ref()
        .and_then(|content| content.joined_text())
        .ok_or_else(|| {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            ExchangeError::malformed(format!("candidate has no text (finish reason: {reason})"))
        })?;

    let sources = sources_from_response(&response);
    debug!(
        chars = reply_text.len(),
        sources = sources.len(),
        "model reply received"
    );

    Ok(BotReply {
        text: reply_text,
        sources,
    })
}
