//! External network client contracts.
//!
//! The TLS HTTPS client and TLS WebSocket client are credentialed
//! collaborators owned outside this crate: exchange REST endpoints,
//! credential/JWT signing, and the TLS stack itself are not implemented
//! here. What lives here is just the contract: two plain traits plugins
//! are handed an `Arc<dyn _>` of through [`crate::plugin::PluginConfig`],
//! plus a null implementation of each used by tests and the bundled
//! example plugins so the rest of the system has something concrete to
//! wire against without pulling in a production TLS stack.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::NumeriError;

/// Deadline every network client operation is held to.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(30);

/// A single HTTP header.
#[derive(Debug, Clone)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Contract for the credentialed HTTPS client handed to ingestors and
/// execution engines. TLS 1.2+, SNI, and system trust-store verification
/// are properties of a production implementation, not of this trait.
#[async_trait]
pub trait HttpsClient: Send + Sync {
    async fn get(
        &self,
        host: &str,
        port: u16,
        target: &str,
        headers: &[Header],
    ) -> Result<Vec<u8>, NumeriError>;

    async fn post(
        &self,
        host: &str,
        port: u16,
        target: &str,
        body: &[u8],
        headers: &[Header],
    ) -> Result<Vec<u8>, NumeriError>;

    fn hmac_sha256_hex(&self, message: &[u8], key: &[u8]) -> String;
}

/// Contract for the credentialed WebSocket client. Callbacks fire on the
/// shared async runtime, never on the plugin's `execute` thread.
#[async_trait]
pub trait WebSocketClient: Send + Sync {
    async fn connect(&self, host: &str, port: u16) -> Result<(), NumeriError>;
    async fn send(&self, text: &str) -> Result<(), NumeriError>;
    fn on_message(&self, callback: Box<dyn Fn(String) + Send + Sync>);
    async fn close(&self) -> Result<(), NumeriError>;
}

/// A no-op HTTPS client: every call fails with [`NumeriError::TransientIo`].
/// Used where a plugin is wired up but no real network stack is present —
/// this crate never ships a production TLS implementation.
#[derive(Debug, Default)]
pub struct NullHttpsClient;

#[async_trait]
impl HttpsClient for NullHttpsClient {
    async fn get(
        &self,
        _host: &str,
        _port: u16,
        _target: &str,
        _headers: &[Header],
    ) -> Result<Vec<u8>, NumeriError> {
        Err(NumeriError::TransientIo {
            component: "net::NullHttpsClient".to_string(),
            reason: "no HTTPS client configured".to_string(),
        })
    }

    async fn post(
        &self,
        _host: &str,
        _port: u16,
        _target: &str,
        _body: &[u8],
        _headers: &[Header],
    ) -> Result<Vec<u8>, NumeriError> {
        Err(NumeriError::TransientIo {
            component: "net::NullHttpsClient".to_string(),
            reason: "no HTTPS client configured".to_string(),
        })
    }

    fn hmac_sha256_hex(&self, _message: &[u8], _key: &[u8]) -> String {
        String::new()
    }
}

/// A no-op WebSocket client, the counterpart to [`NullHttpsClient`].
#[derive(Debug, Default)]
pub struct NullWebSocketClient;

#[async_trait]
impl WebSocketClient for NullWebSocketClient {
    async fn connect(&self, _host: &str, _port: u16) -> Result<(), NumeriError> {
        Err(NumeriError::TransientIo {
            component: "net::NullWebSocketClient".to_string(),
            reason: "no WebSocket client configured".to_string(),
        })
    }

    async fn send(&self, _text: &str) -> Result<(), NumeriError> {
        Err(NumeriError::TransientIo {
            component: "net::NullWebSocketClient".to_string(),
            reason: "no WebSocket client configured".to_string(),
        })
    }

    fn on_message(&self, _callback: Box<dyn Fn(String) + Send + Sync>) {}

    async fn close(&self) -> Result<(), NumeriError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_https_client_fails_every_call() {
        let client = NullHttpsClient;
        assert!(client.get("x", 443, "/", &[]).await.is_err());
        assert!(client.post("x", 443, "/", b"", &[]).await.is_err());
    }

    #[tokio::test]
    async fn null_websocket_client_close_is_ok() {
        let client = NullWebSocketClient;
        assert!(client.close().await.is_ok());
    }
}
