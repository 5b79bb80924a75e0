pub mod chat;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use chat::{ChatClient, UpstreamReply};
pub use prompt::PromptPair;
pub use providers::{InboundContext, ProviderAdapter, ProviderKind, ProviderRegistry};
