//! Shared request plumbing for every resource binding.
//!
//! # Design
//! `Client` holds only its configuration and a `Transport`; it carries no
//! mutable state between calls. A call is split into `build_request`
//! (produces an `HttpRequest`), transport execution raced against the
//! caller's `RequestContext`, and `parse_response` (status mapping and
//! envelope decoding). Resource modules go through `request_json` /
//! `request_empty` instead of repeating that sequence.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::encode_query;
use crate::transport::Transport;

/// Stateless client for the Cipherguard API.
#[derive(Debug, Clone)]
pub struct Client<T> {
    config: ClientConfig,
    transport: T,
}

#[cfg(feature = "reqwest")]
impl Client<crate::transport::ReqwestTransport> {
    /// Client over a `reqwest` transport configured from `config`.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = crate::transport::ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `method` on `path` (relative to the base URL).
    ///
    /// `api-version` is always the first query parameter, followed by
    /// `query` in order.
    pub fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        query: &[(String, String)],
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut pairs = Vec::with_capacity(query.len() + 1);
        pairs.push(("api-version".to_string(), self.config.api_version.clone()));
        pairs.extend(query.iter().cloned());
        let url = format!("{}{}?{}", self.config.base_url, path, encode_query(&pairs));

        let mut headers = Vec::new();
        let body = match body {
            Some(body) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(body).map_err(ApiError::Serialization)?)
            }
            None => None,
        };
        headers.extend(self.config.headers.iter().cloned());

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Map the status and decode the envelope of a raw response.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ApiResponse, ApiError> {
        if !response.is_success() {
            let message = serde_json::from_str::<ApiResponse>(&response.body)
                .ok()
                .map(|envelope| envelope.header.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| response.body.trim().to_string());
            tracing::warn!(status = response.status, message = %message, "request failed");
            if response.status == 404 {
                return Err(ApiError::NotFound(message));
            }
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(ApiResponse::empty(response.status));
        }

        let envelope: ApiResponse =
            serde_json::from_str(&response.body).map_err(ApiError::Deserialization)?;
        if envelope.is_error() {
            tracing::warn!(
                code = envelope.header.code,
                message = %envelope.header.message,
                "server reported an error"
            );
            return Err(ApiError::Api(envelope.header.message));
        }
        Ok(envelope)
    }

    /// Run `request` through the transport, honouring the context's
    /// cancellation and deadline.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        request: HttpRequest,
    ) -> Result<HttpResponse, ApiError> {
        if ctx.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        if ctx.is_expired() {
            return Err(ApiError::DeadlineExceeded);
        }

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                tracing::debug!("request cancelled");
                Err(ApiError::Cancelled)
            }
            _ = ctx.expired() => {
                tracing::debug!("request deadline exceeded");
                Err(ApiError::DeadlineExceeded)
            }
            response = self.transport.execute(request) => {
                let response = response?;
                tracing::debug!(status = response.status, "received response");
                Ok(response)
            }
        }
    }

    /// Build, execute and parse a single request.
    pub async fn do_custom_request<B>(
        &self,
        ctx: &RequestContext,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        query: &[(String, String)],
    ) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, body, query)?;
        let response = self.execute(ctx, request).await?;
        self.parse_response(response)
    }

    /// Typed request: the envelope body is decoded into `R`.
    pub async fn request_json<B, R>(
        &self,
        ctx: &RequestContext,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        query: &[(String, String)],
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let envelope = self.do_custom_request(ctx, method, path, body, query).await?;
        serde_json::from_value(envelope.body).map_err(ApiError::Deserialization)
    }

    /// Status-only request: success means no error, the body is ignored.
    pub async fn request_empty(
        &self,
        ctx: &RequestContext,
        method: HttpMethod,
        path: &str,
    ) -> Result<(), ApiError> {
        self.do_custom_request::<()>(ctx, method, path, None, &[])
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            panic!("transport must not be called");
        }
    }

    fn client() -> Client<Unreachable> {
        let config = ClientConfig::new("http://localhost:3000/").unwrap();
        Client::with_transport(config, Unreachable)
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_get_request_carries_api_version() {
        let req = client()
            .build_request::<()>(HttpMethod::Get, "/users.json", None, &[])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/users.json?api-version=v2");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_request_appends_query_after_version() {
        let query = vec![("filter[search]".to_string(), "ada".to_string())];
        let req = client()
            .build_request::<()>(HttpMethod::Get, "/users.json", None, &query)
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/users.json?api-version=v2&filter%5Bsearch%5D=ada"
        );
    }

    #[test]
    fn build_request_with_body_sets_content_type() {
        let body = serde_json::json!({"username": "ada@example.com"});
        let req = client()
            .build_request(HttpMethod::Post, "/users.json", Some(&body), &[])
            .unwrap();
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn configured_headers_are_sent() {
        let config = ClientConfig::new("http://localhost:3000")
            .unwrap()
            .with_header("x-csrf-token", "abc");
        let client = Client::with_transport(config, Unreachable);
        let req = client
            .build_request::<()>(HttpMethod::Delete, "/users/x.json", None, &[])
            .unwrap();
        assert_eq!(req.headers, vec![("x-csrf-token".to_string(), "abc".to_string())]);
    }

    #[test]
    fn parse_success_envelope() {
        let envelope = client()
            .parse_response(response(
                200,
                r#"{"header":{"status":"success","code":200},"body":{"id":"x"}}"#,
            ))
            .unwrap();
        assert_eq!(envelope.body["id"], "x");
    }

    #[test]
    fn parse_not_found_uses_envelope_message() {
        let err = client()
            .parse_response(response(
                404,
                r#"{"header":{"status":"error","message":"The user does not exist.","code":404},"body":null}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "The user does not exist."));
    }

    #[test]
    fn parse_plain_error_body() {
        let err = client()
            .parse_response(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, message } if message == "internal error"));
    }

    #[test]
    fn parse_error_envelope_with_success_status() {
        let err = client()
            .parse_response(response(
                200,
                r#"{"header":{"status":"error","message":"Access denied."},"body":null}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::Api(msg) if msg == "Access denied."));
    }

    #[test]
    fn parse_empty_body_is_ok() {
        let envelope = client().parse_response(response(204, "")).unwrap();
        assert!(envelope.body.is_null());
    }

    #[test]
    fn parse_bad_json() {
        let err = client()
            .parse_response(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[tokio::test]
    async fn cancelled_context_skips_transport() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let err = client()
            .request_empty(&ctx, HttpMethod::Get, "/users.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[tokio::test]
    async fn expired_context_skips_transport() {
        let ctx = RequestContext::new().with_timeout(std::time::Duration::ZERO);
        let err = client()
            .request_empty(&ctx, HttpMethod::Get, "/users.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DeadlineExceeded));
    }
}
