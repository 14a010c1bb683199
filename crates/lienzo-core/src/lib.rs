pub mod api;
pub mod chat;
pub mod config;
pub mod media;
pub mod preview;
pub mod state;

// Re-export main types for convenience
pub use api::{ApiError, CompletionClient, UploadClient};
pub use chat::{ChatController, ChatPhase, CompletionCall, SubmitStart, COMPLETION_FAILURE_NOTICE};
pub use config::{ChatSettings, Config, UploadSettings};
pub use media::{MediaController, MediaFile, UploadCall, UploadPhase, UploadStart};
pub use preview::PreviewHandle;
pub use state::{ChatMessage, ChatRole};
