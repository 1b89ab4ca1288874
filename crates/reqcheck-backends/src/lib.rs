//! reqcheck backends
//!
//! One contract ([`Backend`]) with an adapter per model provider, and the
//! [`BackendRegistry`] that maps model identifiers onto shared instances.
//!
//! ## Layer 1 - Providers
//!
//! Focus: uniform prompt-in, record-out behaviour over heterogeneous services.
//!
//! | Prefix  | Provider |
//! |---------|----------|
//! | `mock`  | [`MockBackend`] |
//! | `llama` | [`OllamaBackend`] |
//! | `meta`  | [`ChatBackend::vertex`] |
//! | `gpt`   | [`ChatBackend::openai`] |

pub mod backend;
pub mod chat;
pub mod config;
mod http;
pub mod mock;
pub mod ollama;
pub mod prompts;
pub mod registry;
pub mod response;

pub use backend::{Backend, Provider};
pub use chat::ChatBackend;
pub use config::{BackendConfig, DEFAULT_SEED};
pub use mock::{CallCounts, MockBackend};
pub use ollama::OllamaBackend;
pub use registry::BackendRegistry;
