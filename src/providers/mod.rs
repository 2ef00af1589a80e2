/// Chat provider backends and the background request worker
pub mod backends;
pub mod worker;

#[cfg(test)]
pub(crate) mod mock;

pub use backends::{
    default_resolver, resolve_provider, ChatProvider, GeminiProvider, ProviderResolver,
    UnimplementedProvider, GEMINI_ENDPOINT, NOT_IMPLEMENTED_REPLY,
};
pub use worker::PendingRequest;
