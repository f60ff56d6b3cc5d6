use crate::adapters::{GeminiModel, SupabaseDirectory};
use crate::config;
use crate::state;

use axum::Router;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;

mod chat;
mod register;

pub fn app(config: config::AppConfig) -> Router {
    let directory = config.supabase.as_ref().and_then(|supabase| {
        match SupabaseDirectory::new(supabase) {
            Ok(directory) => Some(directory),
            Err(err) => {
                eprintln!("recipient store disabled: failed to build client ({err})");
                None
            }
        }
    });
    if directory.is_none() {
        eprintln!("recipient store disabled: registration will be unavailable");
    }
    let chat_model = config.gemini.as_ref().and_then(|gemini| {
        match GeminiModel::new(gemini) {
            Ok(model) => Some(model),
            Err(err) => {
                eprintln!("chat model disabled: failed to build client ({err})");
                None
            }
        }
    });
    if chat_model.is_none() {
        eprintln!("chat model disabled: /chat will serve fallback replies");
    }
    let state = state::AppState {
        config,
        directory,
        chat: chat_model,
    };
    Router::new()
        .route("/", get(home))
        .route("/register", post(register::register))
        .route("/chat", post(chat::chat))
        .route("/health", get(health))
        .with_state(state)
}

pub(crate) async fn home() -> Html<&'static str> {
    Html(
        "<div style=\"text-align: center; padding-top: 50px; font-family: sans-serif;\">\
         <h1>CiHuy server is running</h1>\
         <p>Backend API ready.</p>\
         </div>",
    )
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
