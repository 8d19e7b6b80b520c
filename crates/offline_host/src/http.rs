//! Request and response descriptors exchanged with the host.

use std::{any::Any, fmt, rc::Rc};

use serde::{Deserialize, Serialize};

/// Ordered `(name, value)` header pairs, kept opaque to the policy.
pub type HeaderList = Vec<(String, String)>;

#[derive(Clone)]
/// Host-native object carried alongside a descriptor.
///
/// Browser adapters keep the original `Request` or `Response` here so the network path can hand
/// it back to the host untouched. The policy never looks inside. Two handles are equal only when
/// they share the same object.
pub struct HostObject(Rc<dyn Any>);

impl HostObject {
    /// Wraps `value`.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Borrows the wrapped value when it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostObject(..)")
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for HostObject {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Inbound request descriptor. Stores key entries by [`CacheRequest::url`].
pub struct CacheRequest {
    /// HTTP method, upper-case.
    pub method: String,
    /// Request URL or path.
    pub url: String,
    /// Request headers as the host delivered them.
    #[serde(default)]
    pub headers: HeaderList,
    /// Request body. Always empty for `GET` and `HEAD`.
    #[serde(default)]
    pub body: Vec<u8>,
    #[serde(skip)]
    host: Option<HostObject>,
}

impl CacheRequest {
    /// Builds a request with no headers and no body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
            host: None,
        }
    }

    /// Builds a plain `GET` for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Returns the store key for this request.
    pub fn cache_key(&self) -> &str {
        &self.url
    }

    /// Named stores only answer lookups for `GET` requests.
    pub fn is_cacheable_method(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Attaches the host request this descriptor was read from.
    pub fn with_host(mut self, host: HostObject) -> Self {
        self.host = Some(host);
        self
    }

    /// Host request to send in place of the descriptor, when there is one.
    pub fn host(&self) -> Option<&HostObject> {
        self.host.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response descriptor returned by the network or a named store.
///
/// When a host response is attached the descriptor only mirrors its status line and headers;
/// `body` stays empty and the host object keeps the stream.
pub struct CacheResponse {
    /// HTTP status code.
    pub status: u16,
    /// HTTP reason phrase.
    #[serde(default)]
    pub status_text: String,
    /// Response headers.
    #[serde(default)]
    pub headers: HeaderList,
    /// Raw response body.
    #[serde(default)]
    pub body: Vec<u8>,
    #[serde(skip)]
    host: Option<HostObject>,
}

impl CacheResponse {
    /// Builds a `200 OK` response carrying `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::with_status(200, "OK", body)
    }

    /// Builds a response with an explicit status line.
    pub fn with_status(
        status: u16,
        status_text: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: Vec::new(),
            body: body.into(),
            host: None,
        }
    }

    /// Appends a header and returns the response.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns `true` for 2xx statuses, the range bulk-populate accepts.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Attaches the host response this descriptor mirrors.
    pub fn with_host(mut self, host: HostObject) -> Self {
        self.host = Some(host);
        self
    }

    /// Host response to hand back verbatim, when there is one.
    pub fn host(&self) -> Option<&HostObject> {
        self.host.as_ref()
    }
}
