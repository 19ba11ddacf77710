//! AI chatbot module - prompt decoration, provider fallback and delivery.

mod handler;
mod memory;
mod prompt;
mod responder;
mod response;

pub use handler::{FAILURE_REPLY, THINKING_REPLY, handle_ai_route};
pub use memory::ConversationMemory;
pub use prompt::{GenderCode, Prompt, build_prompt, gender_from_roles};
pub use responder::{AiResponder, PLACEHOLDER_PROVIDER, PLACEHOLDER_REPLY};
pub use response::{MAX_MESSAGE_CHARS, send_response, truncate_for_discord};
