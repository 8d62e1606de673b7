//! JSON-RPC 2.0 client for the fin result provider.
//!
//! The provider is an external process that answers "what matches this
//! query". This crate frames JSON-RPC messages over a Unix socket and exposes
//! the provider's methods as typed calls on [`RpcClient`].
//! [`ProviderConnection`] wraps the same calls and redials after a disconnect.
//!
//! # Example
//!
//! ```no_run
//! use fin_rpc::RpcClient;
//!
//! # async fn example() -> Result<(), fin_rpc::ClientError> {
//! let client = RpcClient::connect().await?;
//! client.update_search_query("fi").await?;
//! let results = client.get_search_results().await?;
//! println!("{} results", results.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod protocol;
pub mod provider;
pub mod transport;

pub use client::{ClientError, RpcClient, socket_path};
pub use connection::ProviderConnection;
pub use protocol::{Message, Notification, Request, RequestId, Response, RpcError};
pub use transport::{CodecError, JsonRpcCodec};

pub use fin_types::{PluginCatalog, PluginInfo, PluginMetadata, SearchResult};
