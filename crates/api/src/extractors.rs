// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Custom extractors for improved error handling
//!
//! Request bodies are decoded here instead of through `axum::Json` so that a
//! malformed body produces a `BalanceResponse`-shaped 400 with a hint.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

mod hints {
    pub const MISSING_COMMA: &str =
        "check for missing or extra commas between object properties or array elements";
    pub const MISSING_BRACE: &str = "check for missing closing brace '}' for JSON object";
    pub const MISSING_QUOTES: &str =
        "check for missing or improperly escaped quotes around string values";
    pub const EXPECTED_VALUE: &str =
        "expected a valid JSON value (string, number, boolean, null, object, or array)";
    pub const DEFAULT_SYNTAX: &str = "check JSON formatting and structure";
    pub const EMPTY_BODY: &str = "request body is empty, expected valid JSON";
    pub const TRUNCATED_JSON: &str =
        "unexpected end of JSON input, request appears to be truncated";
}

const MAX_JSON_PAYLOAD_SIZE: usize = 64 * 1024;

/// JSON body extractor with descriptive rejections
#[derive(Debug)]
pub struct JsonExtractor<T>(pub T);

impl<T, S> FromRequest<S> for JsonExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(CONTENT_TYPE)
            && let Ok(content_type) = content_type.to_str()
            && !content_type.starts_with("application/json")
        {
            return Err(ServerError::JsonError {
                message: format!(
                    "invalid content-type: expected 'application/json', got '{content_type}'"
                ),
            });
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::JsonError {
                message: format!("failed to read request body: {rejection}"),
            })?;

        decode(&bytes).map(JsonExtractor)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ServerError> {
    if bytes.len() > MAX_JSON_PAYLOAD_SIZE {
        return Err(ServerError::JsonError {
            message: format!(
                "request body too large: {} bytes (max: {MAX_JSON_PAYLOAD_SIZE} bytes)",
                bytes.len()
            ),
        });
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ServerError::JsonError {
            message: hints::EMPTY_BODY.to_string(),
        });
    }

    serde_json::from_slice(bytes).map_err(|err| {
        let message = if err.is_eof() {
            hints::TRUNCATED_JSON.to_string()
        } else if err.is_syntax() {
            format!(
                "invalid JSON syntax at line {}, column {}: {}",
                err.line(),
                err.column(),
                syntax_hint(&err)
            )
        } else if err.is_data() {
            format!("JSON data validation failed: {err}")
        } else {
            format!("JSON parsing error: {err}")
        };
        ServerError::JsonError { message }
    })
}

fn syntax_hint(err: &serde_json::Error) -> &'static str {
    let message = err.to_string();

    if message.contains("expected `,`") || message.contains("trailing comma") {
        hints::MISSING_COMMA
    } else if message.contains("expected `}`") {
        hints::MISSING_BRACE
    } else if message.contains("key must be a string") {
        hints::MISSING_QUOTES
    } else if message.contains("expected value") {
        hints::EXPECTED_VALUE
    } else {
        hints::DEFAULT_SYNTAX
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{HeaderValue, Method},
    };
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Lookup {
        chain_id: u64,
        address: String,
    }

    fn request(body: &str, content_type: &'static str) -> Request {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/v1/fetch-balances")
            .body(Body::from(body.to_string()))
            .unwrap();
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        req
    }

    async fn extract(body: &str) -> Result<Lookup, String> {
        JsonExtractor::<Lookup>::from_request(request(body, "application/json"), &())
            .await
            .map(|JsonExtractor(lookup)| lookup)
            .map_err(|e| e.to_string())
    }

    #[tokio::test]
    async fn valid_body() {
        let lookup = extract(r#"{"chainId": 1, "address": "0xabc"}"#).await.unwrap();
        assert_eq!(
            lookup,
            Lookup {
                chain_id: 1,
                address: "0xabc".to_string()
            }
        );
    }

    #[tokio::test]
    async fn empty_body() {
        let message = extract("  \n").await.unwrap_err();
        assert!(message.contains("request body is empty"));
    }

    #[tokio::test]
    async fn truncated_body() {
        let message = extract(r#"{"chainId": 1, "address": "0xabc""#).await.unwrap_err();
        assert!(message.contains("unexpected end of JSON input"));
    }

    #[tokio::test]
    async fn syntax_error_reports_position() {
        let message = extract(r#"{"chainId": 1,, "address": "0xabc"}"#).await.unwrap_err();
        assert!(message.contains("invalid JSON syntax at line 1"), "{message}");
    }

    #[tokio::test]
    async fn wrong_type() {
        let message = extract(r#"{"chainId": "one", "address": "0xabc"}"#)
            .await
            .unwrap_err();
        assert!(message.contains("JSON data validation failed"));
    }

    #[tokio::test]
    async fn oversized_body() {
        let body = format!(r#"{{"address": "{}"}}"#, "x".repeat(MAX_JSON_PAYLOAD_SIZE));
        let message = extract(&body).await.unwrap_err();
        assert!(message.contains("request body too large"));
    }

    #[tokio::test]
    async fn wrong_content_type() {
        let result = JsonExtractor::<Lookup>::from_request(
            request(r#"{"chainId": 1, "address": "0xabc"}"#, "text/plain"),
            &(),
        )
        .await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("expected 'application/json', got 'text/plain'"));
    }
}
