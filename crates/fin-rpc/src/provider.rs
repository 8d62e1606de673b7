//! Typed calls against the result provider.
//!
//! Method names and parameter shapes are the provider's public surface.

use fin_types::{PluginCatalog, SearchResult};
use serde_json::json;

use crate::client::{ClientError, RpcClient};

pub const UPDATE_SEARCH_QUERY: &str = "update_search_query";
pub const GET_SEARCH_RESULTS: &str = "get_search_results";
pub const GET_PLUGINS: &str = "get_plugins";
pub const UPDATE_PLUGIN_CONFIG: &str = "update_plugin_config";

impl RpcClient {
    /// Tell the provider which query is current.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification cannot be sent.
    pub async fn update_search_query(&self, query: &str) -> Result<(), ClientError> {
        tracing::debug!("Submitting query {query:?}");
        self.notify(UPDATE_SEARCH_QUERY, Some(json!({ "query": query })))
            .await
    }

    /// Fetch whatever results the provider currently holds, unsorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a result list.
    pub async fn get_search_results(&self) -> Result<Vec<SearchResult>, ClientError> {
        self.request(GET_SEARCH_RESULTS, None).await
    }

    /// Fetch the provider's plugin catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    pub async fn get_plugins(&self) -> Result<PluginCatalog, ClientError> {
        self.request(GET_PLUGINS, None).await
    }

    /// Set one configuration key on a provider plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification cannot be sent.
    pub async fn update_plugin_config(
        &self,
        plugin: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ClientError> {
        self.notify(
            UPDATE_PLUGIN_CONFIG,
            Some(json!({ "plugin": plugin, "key": key, "value": value })),
        )
        .await
    }
}
