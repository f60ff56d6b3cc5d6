use crate::adapters::{GeminiModel, SupabaseDirectory};
use crate::config::AppConfig;

/// Shared handler state. Collaborators missing from the configuration
/// stay `None` and the corresponding endpoints degrade instead of the
/// process refusing to start.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub directory: Option<SupabaseDirectory>,
    pub chat: Option<GeminiModel>,
}
