use crate::handlers::Response;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Invalid response from server")]
    InvalidResponse,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
    id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Blocking JSON-RPC client for a running table server.
pub struct TableClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl TableClient {
    pub fn new(host: &str, port: u16) -> Self {
        TableClient {
            client: reqwest::blocking::Client::new(),
            endpoint: format!("http://{}:{}", host, port),
        }
    }

    fn send_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response: JsonRpcResponse = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()?
            .json()?;

        match (response.result, response.error) {
            (_, Some(error)) => Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ClientError::InvalidResponse),
        }
    }

    pub fn ping(&self) -> Result<String, ClientError> {
        let result = self.send_request("ping", serde_json::json!([]))?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or(ClientError::InvalidResponse)
    }

    pub fn sign_up(&self, username: &str, password: &str) -> Result<u64, ClientError> {
        let result = self.send_request("sign_up", serde_json::json!([username, password]))?;
        Ok(serde_json::from_value(result)?)
    }

    pub fn sign_in(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let result = self.send_request("sign_in", serde_json::json!([username, password]))?;
        Ok(serde_json::from_value(result)?)
    }

    pub fn sign_out(&self, session_id: Uuid) -> Result<bool, ClientError> {
        let result = self.send_request("sign_out", serde_json::json!([session_id]))?;
        Ok(serde_json::from_value(result)?)
    }

    /// Sends one command, e.g. `execute(sid, "add_record", "users Alice 30")`.
    pub fn execute(&self, session_id: Uuid, verb: &str, body: &str) -> Result<Response, ClientError> {
        let result = self.send_request("execute", serde_json::json!([session_id, verb, body]))?;
        Ok(serde_json::from_value(result)?)
    }

    pub fn list_verbs(&self) -> Result<Vec<String>, ClientError> {
        let result = self.send_request("list_verbs", serde_json::json!([]))?;
        Ok(serde_json::from_value(result)?)
    }
}
