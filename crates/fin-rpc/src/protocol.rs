//! JSON-RPC 2.0 message types.
//!
//! The provider speaks plain JSON-RPC 2.0: requests carry an id and expect a
//! response, notifications carry none and are fire-and-forget.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 Request ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Number(n)
    }
}

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub id: RequestId,
}

impl Request {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: RequestId,
}

impl Response {
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    #[must_use]
    pub fn error(id: RequestId, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 Notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 Error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn method_not_found() -> Self {
        Self::new(METHOD_NOT_FOUND, "Method not found")
    }

    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// Any message on the wire.
///
/// Variant order matters for untagged decoding: every request also satisfies
/// the notification shape, so requests are tried first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Request(Request),
    Response(Response),
    Notification(Notification),
}

impl Message {
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Message::Request(r) => Some(&r.method),
            Message::Notification(n) => Some(&n.method),
            Message::Response(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(json: &str) -> Message {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_fetch_request_omits_params() {
        let req = Request::new("get_search_results", None, 7.into());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            json!({"jsonrpc": "2.0", "method": "get_search_results", "id": 7})
        );
    }

    #[test]
    fn test_query_notification_has_no_id() {
        let notif = Notification::new("update_search_query", Some(json!({"query": "fi"})));
        let json = serde_json::to_value(&notif).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["params"]["query"], "fi");
    }

    #[test]
    fn test_untagged_decoding_picks_the_right_kind() {
        let msg = parse(r#"{"jsonrpc":"2.0","method":"m","id":1}"#);
        assert!(matches!(msg, Message::Request(_)));
        assert_eq!(msg.method(), Some("m"));

        let msg = parse(r#"{"jsonrpc":"2.0","method":"results_ready","params":{}}"#);
        assert!(matches!(msg, Message::Notification(_)));

        let msg = parse(r#"{"jsonrpc":"2.0","result":[],"id":"a"}"#);
        assert!(
            matches!(msg, Message::Response(ref resp) if resp.id == RequestId::String("a".into()))
        );
        assert_eq!(msg.method(), None);
    }

    #[test]
    fn test_provider_error_response() {
        let Message::Response(resp) = parse(
            r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"index busy"},"id":3}"#,
        ) else {
            panic!("Expected response");
        };
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.to_string(), "RPC error -32603: index busy");
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId::Number(5).to_string(), "5");
        assert_eq!(RequestId::String("q-5".into()).to_string(), "q-5");
        assert_eq!(RpcError::method_not_found().code, METHOD_NOT_FOUND);
    }
}
