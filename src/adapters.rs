use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::config;
use crate::ports;
use crate::types::{BroadcastSummary, DispatchError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(duration)
    }
}

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";
const FCM_TIMEOUT: Duration = Duration::from_secs(30);

// Fixed Android delivery metadata attached to every outbound message;
// callers never supply these.
const ANDROID_PRIORITY: &str = "high";
const ANDROID_CHANNEL_ID: &str = "cihuy_reminder_channel";
const ANDROID_SOUND: &str = "default";

/// FCM client. `send_many` issues one multicast request for the whole
/// batch; per-token rejections come back in the summary and are not
/// treated as a call failure.
#[derive(Clone)]
pub struct FcmGateway {
    server_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl FcmGateway {
    pub fn new(config: &config::FcmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(FCM_TIMEOUT).build()?;
        Ok(Self {
            server_key: config.server_key.clone(),
            endpoint: FCM_ENDPOINT.to_string(),
            client,
        })
    }

    async fn post(&self, payload: serde_json::Value) -> Result<String, DispatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|err| DispatchError::Provider(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| DispatchError::Provider(err.to_string()))?;
        if !status.is_success() {
            return Err(DispatchError::Provider(format!(
                "fcm returned {status}: {body}"
            )));
        }
        Ok(body)
    }

    fn notification_payload(title: &str, body: &str) -> serde_json::Value {
        json!({
            "title": title,
            "body": body,
            "sound": ANDROID_SOUND,
            "android_channel_id": ANDROID_CHANNEL_ID,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    success: u32,
    #[serde(default)]
    failure: u32,
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    message_id: Option<String>,
    error: Option<String>,
}

fn parse_multicast_response(body: &str) -> Result<BroadcastSummary, DispatchError> {
    let response: FcmResponse = serde_json::from_str(body)
        .map_err(|err| DispatchError::Provider(format!("unreadable fcm response: {err}")))?;
    Ok(BroadcastSummary {
        success_count: response.success,
        failure_count: response.failure,
    })
}

fn parse_single_response(body: &str) -> Result<String, DispatchError> {
    let response: FcmResponse = serde_json::from_str(body)
        .map_err(|err| DispatchError::Provider(format!("unreadable fcm response: {err}")))?;
    match response.results.into_iter().next() {
        Some(FcmResult {
            message_id: Some(id),
            ..
        }) => Ok(id),
        Some(FcmResult {
            error: Some(error), ..
        }) => Err(DispatchError::Provider(error)),
        _ => Err(DispatchError::Provider(
            "fcm response carried no result".to_string(),
        )),
    }
}

impl ports::PushGateway for FcmGateway {
    type SendOne<'a>
        = Pin<Box<dyn Future<Output = Result<String, DispatchError>> + Send + 'a>>
    where
        Self: 'a;
    type SendMany<'a>
        = Pin<Box<dyn Future<Output = Result<BroadcastSummary, DispatchError>> + Send + 'a>>
    where
        Self: 'a;

    fn send_one<'a>(
        &'a self,
        token: &'a str,
        title: &'a str,
        body: &'a str,
        data: &'a HashMap<String, String>,
    ) -> Self::SendOne<'a> {
        Box::pin(async move {
            let payload = json!({
                "to": token,
                "priority": ANDROID_PRIORITY,
                "notification": Self::notification_payload(title, body),
                "data": data,
            });
            let body = self.post(payload).await?;
            parse_single_response(&body)
        })
    }

    fn send_many<'a>(
        &'a self,
        tokens: &'a HashSet<String>,
        title: &'a str,
        body: &'a str,
        data: &'a HashMap<String, String>,
    ) -> Self::SendMany<'a> {
        Box::pin(async move {
            if tokens.is_empty() {
                return Err(DispatchError::EmptyRecipients);
            }
            let registration_ids: Vec<&str> = tokens.iter().map(String::as_str).collect();
            let payload = json!({
                "registration_ids": registration_ids,
                "priority": ANDROID_PRIORITY,
                "notification": Self::notification_payload(title, body),
                "data": data,
            });
            let body = self.post(payload).await?;
            parse_multicast_response(&body)
        })
    }
}

#[derive(Debug)]
pub struct DirectoryError(String);

impl DirectoryError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DirectoryError {}

const SUPABASE_TIMEOUT: Duration = Duration::from_secs(10);

/// Recipient store backed by Supabase's PostgREST endpoint. The broadcast
/// core only reads; `register` serves the registration endpoint.
#[derive(Clone)]
pub struct SupabaseDirectory {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenRow {
    token: String,
}

fn collect_tokens(rows: Vec<TokenRow>) -> HashSet<String> {
    rows.into_iter().map(|row| row.token).collect()
}

impl SupabaseDirectory {
    pub fn new(config: &config::SupabaseConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(SUPABASE_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
            client,
        })
    }

    fn users_url(&self) -> String {
        format!("{}/rest/v1/users", self.base_url)
    }

    async fn fetch_tokens(&self, zone_tag: &str) -> Result<HashSet<String>, DirectoryError> {
        let filter = format!("eq.{zone_tag}");
        let response = self
            .client
            .get(self.users_url())
            .query(&[("select", "token"), ("zona", filter.as_str())])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|err| DirectoryError::new(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::new(format!("store returned {status}")));
        }
        let rows: Vec<TokenRow> = response
            .json()
            .await
            .map_err(|err| DirectoryError::new(err.to_string()))?;
        Ok(collect_tokens(rows))
    }

    /// Upserts (token, zona); an existing token keeps its row and takes
    /// the new zona (last write wins).
    pub async fn register(&self, token: &str, zone_tag: &str) -> Result<(), DirectoryError> {
        let response = self
            .client
            .post(self.users_url())
            .query(&[("on_conflict", "token")])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!([{ "token": token, "zona": zone_tag }]))
            .send()
            .await
            .map_err(|err| DirectoryError::new(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::new(format!("store returned {status}")));
        }
        Ok(())
    }
}

impl ports::RecipientDirectory for SupabaseDirectory {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = HashSet<String>> + Send + 'a>>
    where
        Self: 'a;

    fn list_recipients<'a>(&'a self, zone_tag: &'a str) -> Self::Fut<'a> {
        Box::pin(async move {
            match self.fetch_tokens(zone_tag).await {
                Ok(tokens) => tokens,
                Err(err) => {
                    // A transient store hiccup degrades to "nobody to
                    // notify"; the next firing is the retry.
                    eprintln!("directory error: {err} (zone {zone_tag})");
                    HashSet::new()
                }
            }
        })
    }
}

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
const GEMINI_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_INSTRUCTION: &str = "Kamu adalah Cia, teman curhat dan pendamping untuk orang yang \
ingin berhenti merokok dan vape. Jawab sebagai manusia yang hangat, santai, dan empatik seperti \
teman dekat. Fokus utama: proses berhenti, craving, motivasi, dan manajemen stres. Jika pengguna \
bertanya tentang bahaya rokok atau vape, jawab pertanyaan itu dulu dengan fakta yang mudah \
dimengerti, lalu arahkan ke strategi berhenti. Berikan langkah konkret. Jangan menghakimi dan \
jangan memberikan diagnosis medis.";

#[derive(Debug)]
struct ModelError(String);

impl ModelError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gemini text-completion collaborator. Any failure (network, timeout,
/// blocked or empty candidates) surfaces as `None` so the HTTP layer can
/// fall back.
#[derive(Clone)]
pub struct GeminiModel {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiModel {
    pub fn new(config: &config::GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(GEMINI_TIMEOUT).build()?;
        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint: GEMINI_ENDPOINT.to_string(),
            client,
        })
    }

    async fn generate(&self, message: &str) -> Result<serde_json::Value, ModelError> {
        let payload = json!({
            "system_instruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": message }] }],
            "generationConfig": {
                "temperature": 0.85,
                "maxOutputTokens": 4000,
            },
            "safetySettings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_NONE" },
            ],
        });
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", &self.api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|err| ModelError::new(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::new(format!("model returned {status}")));
        }
        response
            .json()
            .await
            .map_err(|err| ModelError::new(err.to_string()))
    }
}

fn extract_reply_text(response: &serde_json::Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    for part in parts {
        if let Some(text) = part.get("text").and_then(|text| text.as_str()) {
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

impl ports::ChatModel for GeminiModel {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>
    where
        Self: 'a;

    fn reply<'a>(&'a self, message: &'a str) -> Self::Fut<'a> {
        Box::pin(async move {
            match self.generate(message).await {
                Ok(response) => {
                    let reply = extract_reply_text(&response);
                    if reply.is_none() {
                        eprintln!("chat model returned no usable candidates");
                    }
                    reply
                }
                Err(err) => {
                    eprintln!("chat model error: {err}");
                    None
                }
            }
        })
    }
}
