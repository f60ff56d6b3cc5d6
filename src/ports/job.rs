/// The unit of work the scheduler fires. Implementations must contain
/// their own failures; a firing never reports an error upward, so nothing
/// can propagate into the scheduler loop and disable future firings.
pub trait BroadcastRunner: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = ()> + Send + 'a
    where
        Self: 'a;

    fn run<'a>(&'a self, session_label: &'a str, zone_tag: &'a str) -> Self::Fut<'a>;
}
