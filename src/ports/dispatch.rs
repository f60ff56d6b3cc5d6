use std::collections::{HashMap, HashSet};

use crate::types::{BroadcastSummary, DispatchError};

/// Outbound push provider. One `send_many` call is a single multicast
/// request; per-recipient failures are reported in the summary, not as an
/// error. Neither method retries.
pub trait PushGateway: Clone + Send + Sync + 'static {
    type SendOne<'a>: Future<Output = Result<String, DispatchError>> + Send + 'a
    where
        Self: 'a;
    type SendMany<'a>: Future<Output = Result<BroadcastSummary, DispatchError>> + Send + 'a
    where
        Self: 'a;

    fn send_one<'a>(
        &'a self,
        token: &'a str,
        title: &'a str,
        body: &'a str,
        data: &'a HashMap<String, String>,
    ) -> Self::SendOne<'a>;

    /// Must short-circuit with `DispatchError::EmptyRecipients` when
    /// `tokens` is empty, without contacting the provider.
    fn send_many<'a>(
        &'a self,
        tokens: &'a HashSet<String>,
        title: &'a str,
        body: &'a str,
        data: &'a HashMap<String, String>,
    ) -> Self::SendMany<'a>;
}
