/// Opaque text-completion collaborator. `None` means the model produced
/// nothing usable (error, timeout, empty candidates) and the caller should
/// fall back.
pub trait ChatModel: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Option<String>> + Send + 'a
    where
        Self: 'a;

    fn reply<'a>(&'a self, message: &'a str) -> Self::Fut<'a>;
}
