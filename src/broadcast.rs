use crate::ports;
use crate::types::DispatchError;

use std::collections::HashMap;
use std::pin::Pin;

use rand::seq::SliceRandom;

pub const NOTIFICATION_TITLE: &str = "CiHuy Sapa Kamu 👋";

const MORNING_BODIES: &[&str] = &[
    "Pagi! Tarik napas dulu. Hari baru, kesempatan baru 🌱",
    "Selamat pagi! Ingat targetmu hari ini ya, kamu pasti bisa!",
    "Awali hari tanpa asap, rasakan segarnya paru-parumu!",
];

const MIDDAY_BODIES: &[&str] = &[
    "Masih bertahan? Itu keren banget 💪",
    "Siang! Kalau craving datang, coba minum air putih dingin.",
    "Tetap semangat! Setengah hari sudah terlewati dengan hebat.",
];

const EVENING_BODIES: &[&str] = &[
    "Hari ini berat? Terima kasih udah bertahan 🤍",
    "Selamat istirahat. Bangga banget kamu bisa lewati hari ini.",
    "Tutup hari ini dengan senyuman. Besok kita berjuang lagi!",
];

const FALLBACK_BODY: &str = "Tetap semangat!";

/// Picks a message body for a session label. Unknown labels get the
/// generic fallback; the slot table is the only producer of labels, but a
/// bad label must not abort a firing.
pub fn body_for(session_label: &str) -> String {
    let catalog = match session_label {
        "morning" => MORNING_BODIES,
        "midday" => MIDDAY_BODIES,
        "evening" => EVENING_BODIES,
        _ => return FALLBACK_BODY.to_string(),
    };
    catalog
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_BODY)
        .to_string()
}

/// One scheduled firing: resolve recipients, compose the session message,
/// multicast, log the outcome. Never returns an error and never panics;
/// all failures end here.
pub async fn run_broadcast<D, G>(directory: &D, gateway: &G, session_label: &str, zone_tag: &str)
where
    D: ports::RecipientDirectory,
    G: ports::PushGateway,
{
    println!("broadcast job start: {session_label} for {zone_tag}");
    let recipients = directory.list_recipients(zone_tag).await;
    if recipients.is_empty() {
        println!("broadcast job done: no recipients in {zone_tag}");
        return;
    }

    let body = body_for(session_label);
    let data = HashMap::new();
    match gateway
        .send_many(&recipients, NOTIFICATION_TITLE, &body, &data)
        .await
    {
        Ok(summary) => {
            println!(
                "broadcast job done: {zone_tag} {} delivered, {} failed",
                summary.success_count, summary.failure_count
            );
        }
        Err(DispatchError::EmptyRecipients) => {
            // Unreachable given the check above, but still not an error
            // worth more than a line.
            println!("broadcast job done: no recipients in {zone_tag}");
        }
        Err(err) => {
            eprintln!("broadcast job error: {err} ({session_label}, {zone_tag})");
        }
    }
}

/// Owned pairing of directory and gateway, so the scheduler can fire
/// broadcasts through the `BroadcastRunner` seam.
#[derive(Clone)]
pub struct Broadcaster<D, G> {
    directory: D,
    gateway: G,
}

impl<D, G> Broadcaster<D, G>
where
    D: ports::RecipientDirectory,
    G: ports::PushGateway,
{
    pub fn new(directory: D, gateway: G) -> Self {
        Self { directory, gateway }
    }
}

impl<D, G> ports::BroadcastRunner for Broadcaster<D, G>
where
    D: ports::RecipientDirectory,
    G: ports::PushGateway,
{
    type Fut<'a>
        = Pin<Box<dyn Future<Output = ()> + Send + 'a>>
    where
        Self: 'a;

    fn run<'a>(&'a self, session_label: &'a str, zone_tag: &'a str) -> Self::Fut<'a> {
        Box::pin(run_broadcast(
            &self.directory,
            &self.gateway,
            session_label,
            zone_tag,
        ))
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
pub(crate) mod tests {
    use super::*;
    use crate::types::BroadcastSummary;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct TestDirectory {
        tokens: Arc<Mutex<HashMap<String, HashSet<String>>>>,
    }

    impl TestDirectory {
        pub(crate) fn with_tokens(zone_tag: &str, tokens: &[&str]) -> Self {
            let directory = Self::default();
            directory.tokens.lock().expect("tokens lock").insert(
                zone_tag.to_string(),
                tokens.iter().map(|token| token.to_string()).collect(),
            );
            directory
        }
    }

    impl ports::RecipientDirectory for TestDirectory {
        type Fut<'a>
            = std::future::Ready<HashSet<String>>
        where
            Self: 'a;

        fn list_recipients<'a>(&'a self, zone_tag: &'a str) -> Self::Fut<'a> {
            let tokens = self
                .tokens
                .lock()
                .expect("tokens lock")
                .get(zone_tag)
                .cloned()
                .unwrap_or_default();
            std::future::ready(tokens)
        }
    }

    #[derive(Clone)]
    pub(crate) struct RecordedSend {
        pub(crate) tokens: HashSet<String>,
        pub(crate) title: String,
        pub(crate) body: String,
    }

    #[derive(Clone, Default)]
    pub(crate) struct TestGateway {
        pub(crate) sent: Arc<Mutex<Vec<RecordedSend>>>,
        pub(crate) fail_next: Arc<Mutex<bool>>,
    }

    impl TestGateway {
        pub(crate) fn fail_next_call(&self) {
            *self.fail_next.lock().expect("fail lock") = true;
        }

        pub(crate) fn sent(&self) -> Vec<RecordedSend> {
            self.sent.lock().expect("sent lock").clone()
        }
    }

    impl ports::PushGateway for TestGateway {
        type SendOne<'a>
            = std::future::Ready<Result<String, DispatchError>>
        where
            Self: 'a;
        type SendMany<'a>
            = std::future::Ready<Result<BroadcastSummary, DispatchError>>
        where
            Self: 'a;

        fn send_one<'a>(
            &'a self,
            token: &'a str,
            title: &'a str,
            body: &'a str,
            _data: &'a HashMap<String, String>,
        ) -> Self::SendOne<'a> {
            self.sent.lock().expect("sent lock").push(RecordedSend {
                tokens: HashSet::from([token.to_string()]),
                title: title.to_string(),
                body: body.to_string(),
            });
            std::future::ready(Ok("projects/test/messages/1".to_string()))
        }

        fn send_many<'a>(
            &'a self,
            tokens: &'a HashSet<String>,
            title: &'a str,
            body: &'a str,
            _data: &'a HashMap<String, String>,
        ) -> Self::SendMany<'a> {
            if tokens.is_empty() {
                return std::future::ready(Err(DispatchError::EmptyRecipients));
            }
            self.sent.lock().expect("sent lock").push(RecordedSend {
                tokens: tokens.clone(),
                title: title.to_string(),
                body: body.to_string(),
            });
            let mut fail = self.fail_next.lock().expect("fail lock");
            if *fail {
                *fail = false;
                return std::future::ready(Err(DispatchError::Provider(
                    "simulated outage".to_string(),
                )));
            }
            std::future::ready(Ok(BroadcastSummary {
                success_count: tokens.len() as u32,
                failure_count: 0,
            }))
        }
    }

    #[test]
    fn body_for__should_pick_from_session_catalog() {
        // Given / When
        let body = body_for("morning");

        // Then
        assert!(MORNING_BODIES.contains(&body.as_str()));
    }

    #[test]
    fn body_for__should_fall_back_for_unknown_label() {
        assert_eq!(body_for("nonexistent-session"), FALLBACK_BODY);
    }

    #[tokio::test]
    async fn run_broadcast__should_skip_dispatch_for_empty_recipient_set() {
        // Given
        let directory = TestDirectory::default();
        let gateway = TestGateway::default();

        // When
        run_broadcast(&directory, &gateway, "morning", "WIB").await;

        // Then
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn run_broadcast__should_multicast_once_to_deduplicated_tokens() {
        // Given
        let directory = TestDirectory::with_tokens("WIB", &["tokA", "tokB"]);
        let gateway = TestGateway::default();

        // When
        run_broadcast(&directory, &gateway, "midday", "WIB").await;

        // Then
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, NOTIFICATION_TITLE);
        assert_eq!(
            sent[0].tokens,
            HashSet::from(["tokA".to_string(), "tokB".to_string()])
        );
        assert!(MIDDAY_BODIES.contains(&sent[0].body.as_str()));
    }

    #[tokio::test]
    async fn run_broadcast__should_use_fallback_body_for_unknown_session() {
        // Given
        let directory = TestDirectory::with_tokens("WIB", &["tokA"]);
        let gateway = TestGateway::default();

        // When
        run_broadcast(&directory, &gateway, "nonexistent-session", "WIB").await;

        // Then
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, FALLBACK_BODY);
    }

    #[tokio::test]
    async fn run_broadcast__should_survive_dispatch_error_and_run_again() {
        // Given
        let directory = TestDirectory::with_tokens("WITA", &["tokA"]);
        let gateway = TestGateway::default();
        gateway.fail_next_call();

        // When: first firing hits a provider outage, second one (the next
        // scheduled tick) must still go out.
        run_broadcast(&directory, &gateway, "evening", "WITA").await;
        run_broadcast(&directory, &gateway, "evening", "WITA").await;

        // Then
        assert_eq!(gateway.sent().len(), 2);
    }
}
