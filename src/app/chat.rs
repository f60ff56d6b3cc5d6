use crate::ports::ChatModel as _;
use crate::state;

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

// The reply is held back so answers do not land instantly; the model call
// itself is bounded by the adapter's request timeout.
const MIN_RESPONSE_DELAY: Duration = Duration::from_secs(2);

const FALLBACK_REPLIES: &[&str] = &[
    "Waduh, koneksi gue agak gangguan nih. Coba tanya lagi ya.",
    "Bentar, sinyal otak gue putus nyambung. Coba ulangi pertanyaannya.",
    "Sori banget, tadi kepotong. Mau nanya apa tadi?",
];

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    pub(crate) message: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct ChatResponse {
    pub(crate) success: bool,
    pub(crate) reply: String,
}

fn fallback_reply() -> String {
    FALLBACK_REPLIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_REPLIES[0])
        .to_string()
}

pub(crate) async fn chat(
    State(state): State<state::AppState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let started = tokio::time::Instant::now();
    let message = request.message.as_deref().map(str::trim).unwrap_or("");
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatResponse {
                success: false,
                reply: "Pesan kosong, ngomong apa nih?".to_string(),
            }),
        );
    }

    let reply = match state.chat.as_ref() {
        Some(model) => model.reply(message).await,
        None => None,
    };
    let reply = reply.unwrap_or_else(fallback_reply);

    let elapsed = started.elapsed();
    if elapsed < MIN_RESPONSE_DELAY {
        tokio::time::sleep(MIN_RESPONSE_DELAY - elapsed).await;
    }

    (
        StatusCode::OK,
        Json(ChatResponse {
            success: true,
            reply,
        }),
    )
}
