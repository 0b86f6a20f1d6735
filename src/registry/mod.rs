//! Extension registry client and installed-state synchronizer.
//!
//! This module talks to an Open VSX style registry and reconciles what it
//! knows against the plugins a [`PluginHost`] reports as installed.
//!
//! # Architecture
//!
//! - [`RegistryClient`] issues one GET per call against `<base>/api` and turns
//!   non-2xx responses into a [`ResponseError`]. It caches nothing.
//! - [`RegistryService`] owns the search result, the installed set and the
//!   last search parameters, and notifies listeners whenever one of them is
//!   replaced.
//! - [`ExtensionId`] is the case-folded `publisher.name` join key used on both
//!   sides of every comparison.
//!
//! # Example Configuration
//!
//! ```toml
//! [registry]
//! url = "https://open-vsx.org"
//! ```

mod client;
mod docs;
mod error;
mod host;
mod install;
mod service;
mod types;
mod uri;

pub use client::{HttpResponse, HttpTransport, RegistryClient, RegistryUrlChanged, ReqwestTransport};
pub use docs::{markdown_to_html, render_readme, sanitize_html};
pub use error::{RegistryError, RegistryResult, ResponseError};
pub use host::{MemoryPluginHost, Opener, PluginDescriptor, PluginHost, VSCODE_ENGINE};
pub use install::{InstallAction, InstallKind};
pub use service::{RegistryEvent, RegistryService};
pub use types::{ExtensionDetails, ExtensionFiles, ExtensionId, ExtensionSummary, SearchParam};
pub use uri::{ExtensionUri, EXTENSION_URI_SCHEME, OPEN_HANDLER_PRIORITY};
