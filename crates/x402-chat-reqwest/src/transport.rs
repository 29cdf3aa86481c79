//! The HTTP seam of the payment-aware client.
//!
//! Requests and responses are plain owned values, so the paid retry can be built
//! from the original request without asking the transport to clone anything.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use reqwest_middleware as rqm;
use serde::Serialize;
use std::sync::Arc;
use url::Url;
use x402_chat_types::PAYMENT_HEADER;

/// An HTTP request as the payment-aware client sends it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and the matching `Content-Type`.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body))
    }

    /// A copy of this request carrying `payment` in the `X-PAYMENT` header.
    ///
    /// Method, URL, body and every other header are kept as they are.
    pub fn with_payment_header(&self, payment: HeaderValue) -> Self {
        let mut retry = self.clone();
        retry.headers.insert(PAYMENT_HEADER, payment);
        retry
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Middleware(#[from] rqm::Error),
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    pub fn other(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(error.into())
    }
}

/// Sends one request and reads the whole response.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait::async_trait]
impl HttpTransport for reqwest::Client {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;
        Ok(HttpResponse::read(response).await?)
    }
}

#[async_trait::async_trait]
impl HttpTransport for rqm::ClientWithMiddleware {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;
        Ok(HttpResponse::read(response).await?)
    }
}

#[async_trait::async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url() -> Url {
        Url::parse("http://localhost:3000/api/payment/chat").unwrap()
    }

    #[test]
    fn test_json_sets_body_and_content_type() {
        let request = HttpRequest::post(url())
            .json(&json!({ "messages": [] }))
            .unwrap();
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(&request.body[..], br#"{"messages":[]}"#);
    }

    #[test]
    fn test_with_payment_header_only_adds_one_header() {
        let original = HttpRequest::post(url())
            .header(
                HeaderName::from_static("x-trace"),
                HeaderValue::from_static("abc"),
            )
            .body("payload");
        let retry = original.with_payment_header(HeaderValue::from_static("c2lnbmVk"));

        assert_eq!(retry.method, original.method);
        assert_eq!(retry.url, original.url);
        assert_eq!(retry.body, original.body);
        assert_eq!(retry.headers.len(), original.headers.len() + 1);
        assert_eq!(retry.headers["x-trace"], "abc");
        assert_eq!(retry.headers[PAYMENT_HEADER], "c2lnbmVk");
        assert!(!original.headers.contains_key(PAYMENT_HEADER));
    }
}
