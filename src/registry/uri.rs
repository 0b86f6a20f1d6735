//! `vscode:extension/<publisher>.<name>` URIs.
//!
//! These are what the plugin host deploys from and what an opener navigates
//! to. Parsing is strict: anything outside that shape is an
//! [`RegistryError::InvalidUri`].

use std::fmt;
use std::str::FromStr;

use super::{ExtensionId, RegistryError, RegistryResult};

/// URI scheme of extension URIs.
pub const EXTENSION_URI_SCHEME: &str = "vscode";

/// Path directory of extension URIs.
const EXTENSION_URI_DIR: &str = "extension";

/// Priority an open handler reports for URIs it understands.
pub const OPEN_HANDLER_PRIORITY: u32 = 500;

/// Canonical URI of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionUri {
    id: ExtensionId,
}

impl ExtensionUri {
    /// URI for `id`.
    pub fn from_id(id: ExtensionId) -> Self {
        Self { id }
    }

    /// Parse a URI string back into its identifier.
    pub fn parse(uri: &str) -> RegistryResult<Self> {
        let invalid = || RegistryError::InvalidUri(uri.to_string());

        let (scheme, path) = uri.split_once(':').ok_or_else(invalid)?;
        if !scheme.eq_ignore_ascii_case(EXTENSION_URI_SCHEME) {
            return Err(invalid());
        }

        let path = path.trim_start_matches('/');
        let (dir, base) = path.rsplit_once('/').ok_or_else(invalid)?;
        if dir != EXTENSION_URI_DIR || base.is_empty() {
            return Err(invalid());
        }

        let id = base.parse::<ExtensionId>().map_err(|_| invalid())?;
        Ok(Self { id })
    }

    /// Identifier this URI points at.
    pub fn id(&self) -> &ExtensionId {
        &self.id
    }

    /// Consume the URI, returning its identifier.
    pub fn into_id(self) -> ExtensionId {
        self.id
    }

    /// Open-handler priority for `uri`: [`OPEN_HANDLER_PRIORITY`] for
    /// extension URIs, 0 for everything else.
    pub fn can_handle(uri: &str) -> u32 {
        if Self::parse(uri).is_ok() {
            OPEN_HANDLER_PRIORITY
        } else {
            0
        }
    }
}

impl fmt::Display for ExtensionUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{EXTENSION_URI_SCHEME}:{EXTENSION_URI_DIR}/{}", self.id)
    }
}

impl FromStr for ExtensionUri {
    type Err = RegistryError;

    fn from_str(s: &str) -> RegistryResult<Self> {
        Self::parse(s)
    }
}

impl From<ExtensionId> for ExtensionUri {
    fn from(id: ExtensionId) -> Self {
        Self::from_id(id)
    }
}
