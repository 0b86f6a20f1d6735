//! Collaborators the registry service drives but does not own.
//!
//! The [`PluginHost`] is authoritative for what is installed; the service
//! only ever asks it. The [`Opener`] handles navigation to an extension URI.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::{ExtensionId, ExtensionUri, RegistryError, RegistryResult};
use crate::core::{Emitter, Subscription};

/// Engine type of plugins that come from the extension registry.
pub const VSCODE_ENGINE: &str = "vscode";

/// An installed plugin as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin identifier, `publisher.name` for registry plugins
    pub id: String,
    /// Declared engine type
    pub engine: String,
}

impl PluginDescriptor {
    /// Describe a plugin.
    pub fn new(id: impl Into<String>, engine: impl Into<String>) -> Self {
        Self { id: id.into(), engine: engine.into() }
    }

    /// Describe a registry plugin.
    pub fn vscode(id: impl Into<String>) -> Self {
        Self::new(id, VSCODE_ENGINE)
    }

    /// Whether the plugin is of the registry's kind.
    pub fn is_registry_plugin(&self) -> bool {
        self.engine == VSCODE_ENGINE
    }
}

/// The subsystem that loads and unloads plugin code.
///
/// `deploy`/`undeploy` may return before the change notification fires;
/// callers must not assume the installed set has been updated on return.
#[async_trait]
pub trait PluginHost: Send + Sync {
    /// Every installed plugin.
    fn plugins(&self) -> Vec<PluginDescriptor>;

    /// Whether a plugin with the (normalized) identifier is installed.
    fn has_plugin(&self, id: &str) -> bool;

    /// Listen for changes to the installed set.
    fn on_did_change_plugins(&self, listener: Box<dyn Fn() + Send + Sync>) -> Subscription;

    /// Install from a `vscode:extension/<id>` URI.
    async fn deploy(&self, uri: &str) -> RegistryResult<()>;

    /// Remove the plugin with the given identifier.
    async fn undeploy(&self, id: &str) -> RegistryResult<()>;
}

/// Navigates to an extension URI.
#[async_trait]
pub trait Opener: Send + Sync {
    /// Reveal `uri`.
    async fn open(&self, uri: &ExtensionUri) -> RegistryResult<()>;
}

/// In-process [`PluginHost`].
///
/// Keeps the installed set in memory and fires its change notification
/// after every mutation. Identifiers of registry plugins are stored in
/// normalized form.
#[derive(Debug, Default)]
pub struct MemoryPluginHost {
    plugins: RwLock<BTreeMap<String, PluginDescriptor>>,
    on_did_change: Emitter<()>,
}

impl MemoryPluginHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host with registry plugins already installed.
    pub fn with_plugins<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let host = Self::new();
        {
            let mut plugins = host.plugins.write();
            for id in ids {
                let descriptor = Self::normalize(PluginDescriptor::vscode(id));
                plugins.insert(descriptor.id.clone(), descriptor);
            }
        }
        host
    }

    /// Register a plugin and notify listeners.
    pub fn insert(&self, plugin: PluginDescriptor) {
        let plugin = Self::normalize(plugin);
        self.plugins.write().insert(plugin.id.clone(), plugin);
        self.on_did_change.fire(&());
    }

    /// Remove a plugin and notify listeners. Returns whether it was present.
    pub fn remove(&self, id: &str) -> bool {
        let key = Self::key(id);
        let removed = self.plugins.write().remove(&key).is_some();
        if removed {
            self.on_did_change.fire(&());
        }
        removed
    }

    fn key(id: &str) -> String {
        id.parse::<ExtensionId>().map_or_else(|_| id.to_string(), |id| id.to_string())
    }

    fn normalize(mut plugin: PluginDescriptor) -> PluginDescriptor {
        if plugin.is_registry_plugin() {
            plugin.id = Self::key(&plugin.id);
        }
        plugin
    }
}

#[async_trait]
impl PluginHost for MemoryPluginHost {
    fn plugins(&self) -> Vec<PluginDescriptor> {
        self.plugins.read().values().cloned().collect()
    }

    fn has_plugin(&self, id: &str) -> bool {
        self.plugins.read().contains_key(&Self::key(id))
    }

    fn on_did_change_plugins(&self, listener: Box<dyn Fn() + Send + Sync>) -> Subscription {
        self.on_did_change.subscribe(move |_| listener())
    }

    async fn deploy(&self, uri: &str) -> RegistryResult<()> {
        let id = ExtensionUri::parse(uri)?.into_id();
        tracing::debug!(extension = %id, "Deploying plugin");
        self.insert(PluginDescriptor::vscode(id.to_string()));
        Ok(())
    }

    async fn undeploy(&self, id: &str) -> RegistryResult<()> {
        tracing::debug!(extension = id, "Undeploying plugin");
        if self.remove(id) {
            Ok(())
        } else {
            Err(RegistryError::Host(format!("Plugin '{id}' is not installed")))
        }
    }
}
