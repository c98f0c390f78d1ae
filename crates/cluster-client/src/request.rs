//! Bounded-retry HTTP request executor.
//!
//! Every backend call goes through [`RequestExecutor::execute`]. Transport
//! failures (connection errors, timeouts, non-success statuses, undecodable
//! bodies) are retried up to the policy's attempt budget with a fixed sleep in
//! between. A success status with an empty body is reported as "no content"
//! (`Ok(None)`) and is never retried.

use crate::config::RetryPolicy;
use crate::error::{ClusterError, Result};
use crate::records::is_success_envelope;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{info, warn, Instrument, Span};

/// Content type sent with document pushes.
pub const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Stateless request executor. Clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
    policy: RetryPolicy,
    span: Span,
}

impl RequestExecutor {
    pub fn new(policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder().timeout(policy.timeout).build()?;
        Ok(Self {
            client,
            policy,
            span: Span::none(),
        })
    }

    /// Attach the logging context every request is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Execute a request with the retry policy.
    ///
    /// Returns `Ok(Some(body))` for a non-empty JSON body, `Ok(None)` when the
    /// backend answered successfully without content, and
    /// [`ClusterError::RequestExhausted`] when every attempt failed.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        headers: Option<&HeaderMap>,
    ) -> Result<Option<Value>> {
        self.execute_inner(method, url, payload, headers)
            .instrument(self.span.clone())
            .await
    }

    async fn execute_inner(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        headers: Option<&HeaderMap>,
    ) -> Result<Option<Value>> {
        let attempts = self.policy.effective_attempts();

        for attempt in 1..=attempts {
            info!("Calling Http [{method}] with Url [{url}] (attempt {attempt}/{attempts})");

            match self.attempt(&method, url, payload, headers).await {
                Ok(Some(body)) => {
                    info!("Finished Http [{method}] with url [{url}]");
                    tracing::debug!("Response from [{url}]: {body}");
                    return Ok(Some(body));
                }
                Ok(None) => {
                    info!("Invalid empty response from [{url}]");
                    return Ok(None);
                }
                Err(e) if e.is_transport() => {
                    warn!("Finished Http [{method}] with url [{url}] & error : [{e}]");
                    if attempt < attempts {
                        warn!("Http call failed. Retrying after {:?}", self.policy.backoff);
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
                Err(other) => return Err(other),
            }
        }

        Err(ClusterError::RequestExhausted {
            url: url.to_string(),
            attempts,
        })
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        payload: Option<&Value>,
        headers: Option<&HeaderMap>,
    ) -> Result<Option<Value>> {
        let transport = |status: Option<u16>, message: String| ClusterError::Transport {
            url: url.to_string(),
            status,
            message,
        };

        let mut request = self.client.request(method.clone(), url);
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(transport(
                Some(status.as_u16()),
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        decode_body(&bytes).map_err(|e| transport(Some(status.as_u16()), e))
    }

    pub async fn get(&self, url: &str) -> Result<Option<Value>> {
        self.execute(Method::GET, url, None, None).await
    }

    /// GET that requires a body; "no content" becomes [`ClusterError::EmptyResponse`].
    pub async fn get_required(&self, url: &str) -> Result<Value> {
        self.get(url)
            .await?
            .ok_or_else(|| ClusterError::EmptyResponse {
                url: url.to_string(),
            })
    }

    /// GET an administrative endpoint that must answer with the success envelope.
    pub async fn expect_success_envelope(&self, url: &str) -> Result<()> {
        let body = self.get(url).await?;
        if is_success_envelope(body.as_ref()) {
            return Ok(());
        }
        Err(ClusterError::BackendRejected {
            url: url.to_string(),
            body: body.map(|b| b.to_string()).unwrap_or_default(),
        })
    }

    /// POST a JSON payload with the UTF-8 JSON content type.
    pub async fn post_json(&self, url: &str, payload: &Value) -> Result<Option<Value>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
        self.execute(Method::POST, url, Some(payload), Some(&headers))
            .await
    }
}

/// Decode a success body. Empty bodies, `null`, `{}` and `[]` are "no content".
pub fn decode_body(bytes: &[u8]) -> std::result::Result<Option<Value>, String> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| format!("Invalid JSON body: {e}"))?;
    let empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    Ok(if empty { None } else { Some(value) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_variants() {
        assert_eq!(decode_body(b"").unwrap(), None);
        assert_eq!(decode_body(b"  \n").unwrap(), None);
        assert_eq!(decode_body(b"null").unwrap(), None);
        assert_eq!(decode_body(b"{}").unwrap(), None);
        assert_eq!(decode_body(b"[]").unwrap(), None);
    }

    #[test]
    fn test_decode_content() {
        let value = decode_body(br#"{"responseHeader":{"status":0}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(value["responseHeader"]["status"], 0);
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode_body(b"<html>").unwrap_err();
        assert!(err.contains("Invalid JSON body"));
    }
}
