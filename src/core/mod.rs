//! Core infrastructure shared by the registry and the CLI: configuration and
//! change notifications.

mod config;
mod event;

pub use config::{Config, LoggingConfig, RegistryConfig, DEFAULT_REGISTRY_URL, REGISTRY_URL_ENV};
pub use event::{Emitter, Listener, Subscription};
