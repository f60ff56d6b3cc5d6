pub mod chat;
pub mod directory;
pub mod dispatch;
pub mod job;
pub mod time;

pub use chat::ChatModel;
pub use directory::RecipientDirectory;
pub use dispatch::PushGateway;
pub use job::BroadcastRunner;
pub use time::TimeProvider;
