//! A provider handle that survives provider restarts.
//!
//! [`ProviderConnection`] connects lazily and drops its client as soon as a
//! call reports a disconnect, so the next call dials the socket again. There
//! is no reconnect timer: callers such as the poll loop already retry on
//! their own cadence.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fin_types::{PluginCatalog, SearchResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::{ClientError, RpcClient};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Reconnecting handle to the provider socket
#[derive(Debug)]
pub struct ProviderConnection {
    path: PathBuf,
    timeout: Duration,
    client: Mutex<Option<Arc<RpcClient>>>,
    down_reported: AtomicBool,
}

impl ProviderConnection {
    /// Create a handle for `path`. Nothing is dialed until the first call.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_CALL_TIMEOUT,
            client: Mutex::new(None),
            down_reported: AtomicBool::new(false),
        }
    }

    /// Override the per-request timeout of every client this handle opens.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a live client is currently held.
    pub async fn is_connected(&self) -> bool {
        self.client
            .lock()
            .await
            .as_ref()
            .is_some_and(|client| !client.is_closed())
    }

    /// See [`RpcClient::update_search_query`].
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or the send fails.
    pub async fn update_search_query(&self, query: &str) -> Result<(), ClientError> {
        self.call(|client| async move { client.update_search_query(query).await })
            .await
    }

    /// See [`RpcClient::get_search_results`].
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or the request fails.
    pub async fn get_search_results(&self) -> Result<Vec<SearchResult>, ClientError> {
        self.call(|client| async move { client.get_search_results().await })
            .await
    }

    /// See [`RpcClient::get_plugins`].
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or the request fails.
    pub async fn get_plugins(&self) -> Result<PluginCatalog, ClientError> {
        self.call(|client| async move { client.get_plugins().await })
            .await
    }

    /// See [`RpcClient::update_plugin_config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or the send fails.
    pub async fn update_plugin_config(
        &self,
        plugin: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ClientError> {
        self.call(|client| async move { client.update_plugin_config(plugin, key, value).await })
            .await
    }

    async fn call<T, F, Fut>(&self, f: F) -> Result<T, ClientError>
    where
        F: FnOnce(Arc<RpcClient>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let client = self.client().await?;
        let result = f(Arc::clone(&client)).await;
        if let Err(e) = &result
            && e.is_disconnect()
        {
            self.discard(&client, e).await;
        }
        result
    }

    async fn client(&self) -> Result<Arc<RpcClient>, ClientError> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref().filter(|client| !client.is_closed()) {
            return Ok(Arc::clone(client));
        }
        *slot = None;

        match RpcClient::connect_to(&self.path).await {
            Ok(client) => {
                let client = Arc::new(client.with_timeout(self.timeout));
                if self.down_reported.swap(false, Ordering::Relaxed) {
                    info!("Reconnected to provider at {}", self.path.display());
                } else {
                    debug!("Connected to provider at {}", self.path.display());
                }
                *slot = Some(Arc::clone(&client));
                Ok(client)
            }
            Err(e) => {
                self.report_down(&e);
                Err(e)
            }
        }
    }

    async fn discard(&self, client: &Arc<RpcClient>, error: &ClientError) {
        let mut slot = self.client.lock().await;
        if slot.as_ref().is_some_and(|held| Arc::ptr_eq(held, client)) {
            *slot = None;
            self.report_down(error);
        }
    }

    /// Warn once per outage; repeats go to debug.
    fn report_down(&self, error: &ClientError) {
        if self.down_reported.swap(true, Ordering::Relaxed) {
            debug!("Provider still unreachable: {error}");
        } else {
            warn!("Lost provider at {}: {error}", self.path.display());
        }
    }
}
