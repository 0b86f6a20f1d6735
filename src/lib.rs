//! # vsx-registry
//!
//! Extension registry client and installed-state synchronizer.
//!
//! vsx-registry fetches extension metadata from an Open VSX style registry,
//! reconciles it against the plugins a host reports as installed, and exposes
//! one event-driven view of "what is installed" and "what matches the current
//! search".
//!
//! ## Features
//!
//! - **Search**: default listing or free-text query, replaced wholesale per call
//! - **Reconciliation**: concurrent per-plugin lookups that tolerate individual failures
//! - **Install/Uninstall**: delegated to the plugin host, which stays the source of truth
//! - **Readmes**: markdown rendered to allow-list sanitized HTML
//!
//! ## Quick Start
//!
//! ```bash
//! # Search the registry
//! vsxreg search python
//!
//! # Render an extension's readme
//! vsxreg readme redhat.java
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod core;
pub mod registry;

// Re-export commonly used types
pub use crate::core::{Config, Emitter, Subscription};
pub use registry::{
    ExtensionDetails, ExtensionId, ExtensionSummary, ExtensionUri, MemoryPluginHost, Opener,
    PluginDescriptor, PluginHost, RegistryClient, RegistryError, RegistryEvent, RegistryResult,
    RegistryService, SearchParam,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "vsxreg";
