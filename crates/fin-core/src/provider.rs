//! The boundary to the external result provider.

use std::future::Future;

use fin_rpc::ProviderConnection;
use fin_types::SearchResult;

use crate::Result;

/// Something that answers "what matches this query".
///
/// `submit_query` is fire-and-forget from the caller's view; a later call
/// supersedes an earlier one. `fetch_results` returns whatever the provider
/// currently holds, unsorted and possibly empty.
pub trait ResultProvider: Send + Sync + 'static {
    fn submit_query(&self, query: &str) -> impl Future<Output = Result<()>> + Send;

    fn fetch_results(&self) -> impl Future<Output = Result<Vec<SearchResult>>> + Send;
}

impl ResultProvider for ProviderConnection {
    async fn submit_query(&self, query: &str) -> Result<()> {
        Ok(self.update_search_query(query).await?)
    }

    async fn fetch_results(&self) -> Result<Vec<SearchResult>> {
        Ok(self.get_search_results().await?)
    }
}
