#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub supabase: Option<SupabaseConfig>,
    pub gemini: Option<GeminiConfig>,
    pub fcm: Option<FcmConfig>,
}

#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
}

#[derive(Clone)]
pub struct FcmConfig {
    pub server_key: String,
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            supabase: None,
            gemini: None,
            fcm: None,
        }
    }
}
