use std::collections::HashSet;

/// Read side of the recipient store: the unique delivery tokens currently
/// registered under a timezone tag. Lookup failures degrade to an empty
/// set inside the implementation; they never surface to the caller.
pub trait RecipientDirectory: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = HashSet<String>> + Send + 'a
    where
        Self: 'a;

    fn list_recipients<'a>(&'a self, zone_tag: &'a str) -> Self::Fut<'a>;
}
