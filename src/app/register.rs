use crate::state;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

const DEFAULT_ZONE_TAG: &str = "WIB";

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) token: Option<String>,
    pub(crate) zona: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct RegisterResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
}

pub(crate) async fn register(
    State(state): State<state::AppState>,
    Json(request): Json<RegisterRequest>,
) -> (StatusCode, Json<RegisterResponse>) {
    let token = request.token.as_deref().map(str::trim).unwrap_or("");
    if token.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterResponse {
                success: false,
                message: "token is required".to_string(),
            }),
        );
    }

    let Some(directory) = state.directory.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(RegisterResponse {
                success: false,
                message: "recipient store is not configured".to_string(),
            }),
        );
    };

    let zone_tag = request
        .zona
        .as_deref()
        .map(str::trim)
        .filter(|zona| !zona.is_empty())
        .unwrap_or(DEFAULT_ZONE_TAG);

    match directory.register(token, zone_tag).await {
        Ok(()) => (
            StatusCode::OK,
            Json(RegisterResponse {
                success: true,
                message: "registered".to_string(),
            }),
        ),
        Err(err) => {
            eprintln!("register error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RegisterResponse {
                    success: false,
                    message: err.to_string(),
                }),
            )
        }
    }
}
