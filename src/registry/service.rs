//! Registry service: search results and installed-state reconciliation.
//!
//! The service owns three pieces of state (the last search result, the
//! installed set and the last search parameters) and replaces each of them
//! wholesale; consumers read them through accessors and learn about changes
//! through [`RegistryService::on_did_change`].
//!
//! The plugin host is the only source of truth for "is it installed".
//! `install`/`uninstall` just delegate to it; the installed set catches up
//! when the host reports a change and [`RegistryService::refresh_installed`]
//! runs.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};

use super::docs::render_readme;
use super::host::{Opener, PluginDescriptor, PluginHost};
use super::{
    ExtensionDetails, ExtensionId, ExtensionSummary, ExtensionUri, RegistryClient, RegistryResult,
    RegistryError, SearchParam,
};
use crate::core::{Emitter, Subscription};

/// State change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    /// The search result was replaced.
    SearchChanged,
    /// The installed set was replaced.
    InstalledChanged,
}

#[derive(Debug, Default)]
struct State {
    search_result: Vec<ExtensionSummary>,
    installed: BTreeMap<ExtensionId, ExtensionDetails>,
    search_param: Option<SearchParam>,
}

struct Inner {
    client: Arc<RegistryClient>,
    host: Arc<dyn PluginHost>,
    opener: RwLock<Option<Arc<dyn Opener>>>,
    state: RwLock<State>,
    events: Emitter<RegistryEvent>,
    subscriptions: Mutex<Vec<Subscription>>,
    activated: AtomicBool,
    /// Bumped at the start of every reconciliation pass; only the newest pass commits.
    reconcile_generation: AtomicU64,
}

/// Search and installed-state service over a [`RegistryClient`] and a
/// [`PluginHost`].
///
/// Cloning is cheap; clones share state.
#[derive(Clone)]
pub struct RegistryService {
    inner: Arc<Inner>,
}

impl RegistryService {
    /// Create a service. Nothing is fetched until [`Self::activate`].
    pub fn new(client: Arc<RegistryClient>, host: Arc<dyn PluginHost>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                host,
                opener: RwLock::new(None),
                state: RwLock::new(State::default()),
                events: Emitter::new(),
                subscriptions: Mutex::new(Vec::new()),
                activated: AtomicBool::new(false),
                reconcile_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Install the collaborator used by [`Self::open`].
    pub fn set_opener(&self, opener: Arc<dyn Opener>) {
        *self.inner.opener.write() = Some(opener);
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<RegistryClient> {
        &self.inner.client
    }

    fn upgrade(inner: &Weak<Inner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    /// Run the initial search and reconciliation, then keep both current.
    ///
    /// A base URL change re-runs the last search and reconciliation; a
    /// plugin-host change re-runs reconciliation. Follow-up work is spawned
    /// on the Tokio runtime `activate` is polled from; outside one it fails
    /// with [`RegistryError::Config`] and leaves the service inactive. Calls
    /// after the first successful one are no-ops.
    pub async fn activate(&self) -> RegistryResult<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| RegistryError::Config(format!("activation needs a Tokio runtime: {e}")))?;

        if self.inner.activated.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let weak = Arc::downgrade(&self.inner);

        let on_url_change = {
            let (weak, handle) = (weak.clone(), handle.clone());
            self.inner.client.on_did_change(move |change| {
                tracing::debug!(url = %change.url, "Registry changed, refreshing");
                if let Some(service) = Self::upgrade(&weak) {
                    handle.spawn(async move { service.update().await });
                }
            })
        };

        let on_plugins_change = self.inner.host.on_did_change_plugins(Box::new(move || {
            if let Some(service) = Self::upgrade(&weak) {
                handle.spawn(async move { service.refresh_installed().await });
            }
        }));

        self.inner.subscriptions.lock().extend([on_url_change, on_plugins_change]);

        self.update().await;
        Ok(())
    }

    /// Re-run the last search and reconcile the installed set.
    ///
    /// A failed search is logged; the previous result stays in place.
    pub async fn update(&self) {
        let param = self.search_param();
        let search = async {
            if let Err(e) = self.search(param).await {
                tracing::warn!(error = %e, "Failed to search the registry");
            }
        };
        futures::join!(search, self.refresh_installed());
    }

    /// Listen for state changes.
    pub fn on_did_change(
        &self,
        listener: impl Fn(&RegistryEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.events.subscribe(listener)
    }

    /// Result of the last completed search, in registry order.
    pub fn search_result(&self) -> Vec<ExtensionSummary> {
        self.inner.state.read().search_result.clone()
    }

    /// Registry records of every installed registry plugin, by identifier.
    pub fn installed(&self) -> Vec<ExtensionDetails> {
        self.inner.state.read().installed.values().cloned().collect()
    }

    /// Parameters of the last search, `None` for the default listing.
    pub fn search_param(&self) -> Option<SearchParam> {
        self.inner.state.read().search_param.clone()
    }

    /// Search the registry and replace the search result.
    ///
    /// Errors propagate and leave the previous result untouched. Overlapping
    /// searches are not cancelled; whichever completes last wins.
    pub async fn search(&self, param: Option<SearchParam>) -> RegistryResult<()> {
        let query = param.as_ref().and_then(|p| p.text()).map(str::to_string);
        self.inner.state.write().search_param = param;

        let result = self.inner.client.search(query.as_deref()).await?;
        tracing::debug!(query = ?query, count = result.len(), "Search completed");

        self.inner.state.write().search_result = result;
        self.inner.events.fire(&RegistryEvent::SearchChanged);
        Ok(())
    }

    /// Rebuild the installed set from the plugin host.
    ///
    /// Every registry plugin is looked up concurrently. Lookups that fail,
    /// whether with 404 or anything else, leave that plugin out; they never
    /// abort the pass. A pass overtaken by a newer one is discarded without
    /// notifying.
    pub async fn refresh_installed(&self) {
        let generation = self.inner.reconcile_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let plugins: Vec<PluginDescriptor> =
            self.inner.host.plugins().into_iter().filter(|p| p.is_registry_plugin()).collect();

        let lookups = plugins.iter().map(|plugin| self.lookup_installed(plugin));
        let installed: BTreeMap<ExtensionId, ExtensionDetails> =
            join_all(lookups).await.into_iter().flatten().map(|ext| (ext.id(), ext)).collect();

        tracing::debug!(
            plugins = plugins.len(),
            resolved = installed.len(),
            "Installed extensions reconciled"
        );

        {
            let mut state = self.inner.state.write();
            if self.inner.reconcile_generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "Discarding stale reconciliation pass");
                return;
            }
            state.installed = installed;
        }
        self.inner.events.fire(&RegistryEvent::InstalledChanged);
    }

    async fn lookup_installed(&self, plugin: &PluginDescriptor) -> Option<ExtensionDetails> {
        let id = match plugin.id.parse::<ExtensionId>() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(plugin = %plugin.id, error = %e, "Skipping plugin with malformed id");
                return None;
            }
        };

        match self.inner.client.get_extension(&id).await {
            Ok(extension) => Some(extension),
            Err(e) if e.is_not_found() => {
                tracing::debug!(extension = %id, "Installed plugin is not in the registry");
                None
            }
            Err(e) => {
                tracing::error!(extension = %id, error = %e, "Failed to look up an extension");
                None
            }
        }
    }

    /// Ask the plugin host to deploy `extension`.
    ///
    /// Returns once the host accepted the request; the installed set is
    /// updated later, when the host reports the change.
    pub async fn install(&self, extension: &ExtensionSummary) -> RegistryResult<()> {
        let uri = ExtensionUri::from_id(extension.id());
        tracing::info!(uri = %uri, "Installing extension");
        self.inner.host.deploy(&uri.to_string()).await
    }

    /// Ask the plugin host to undeploy `extension`.
    pub async fn uninstall(&self, extension: &ExtensionSummary) -> RegistryResult<()> {
        let id = extension.id();
        tracing::info!(extension = %id, "Uninstalling extension");
        self.inner.host.undeploy(&id.to_string()).await
    }

    /// Whether the plugin host currently has `extension` installed.
    ///
    /// Reads the host's live state, not the reconciled installed set.
    pub fn is_installed(&self, extension: &ExtensionSummary) -> bool {
        self.inner.host.has_plugin(&extension.id().to_string())
    }

    /// Navigate to `extension` through the configured opener.
    ///
    /// Returns the URI that was opened. Without an opener the URI is only
    /// constructed.
    pub async fn open(&self, extension: &ExtensionSummary) -> RegistryResult<ExtensionUri> {
        let uri = ExtensionUri::from_id(extension.id());
        let opener = self.inner.opener.read().clone();
        match opener {
            Some(opener) => opener.open(&uri).await?,
            None => tracing::debug!(uri = %uri, "No opener configured"),
        }
        Ok(uri)
    }

    /// Fetch the full registry record of `id`.
    pub async fn get_extension(&self, id: &ExtensionId) -> RegistryResult<ExtensionDetails> {
        self.inner.client.get_extension(id).await
    }

    /// Render the readme of `extension` to sanitized HTML.
    ///
    /// Returns an empty string, without any request, when there is no readme.
    pub async fn compile_documentation(&self, extension: &ExtensionDetails) -> RegistryResult<String> {
        match extension.readme_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => {
                let readme = self.inner.client.fetch_text(url).await?;
                Ok(render_readme(&readme))
            }
            None => Ok(String::new()),
        }
    }
}

impl std::fmt::Debug for RegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("RegistryService")
            .field("client", &self.inner.client)
            .field("search_param", &state.search_param)
            .field("search_result", &state.search_result.len())
            .field("installed", &state.installed.len())
            .field("activated", &self.inner.activated.load(Ordering::Relaxed))
            .finish()
    }
}
