//! Host-independent decisions behind request and response conversion.
//!
//! The inline JS only builds what these values describe, so every choice about bodies and error
//! responses is made (and tested) here.

#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use offline_host::{CacheRequest, CacheResponse, HeaderList, HostObject};
use serde::Serialize;

/// Statuses a `Response` must be constructed with a `null` body.
pub const NULL_BODY_STATUSES: [u16; 5] = [101, 103, 204, 205, 304];

/// Returns `true` when requests with `method` may carry a body.
pub fn carries_body(method: &str) -> bool {
    !method.eq_ignore_ascii_case("GET") && !method.eq_ignore_ascii_case("HEAD")
}

/// Returns `true` when `status` can be given to the `Response` constructor.
pub fn is_constructible_status(status: u16) -> bool {
    (200..=599).contains(&status)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Arguments for `new Request(url, init)` when no host request is attached.
pub struct RequestWire<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub headers: &'a HeaderList,
    pub body: Option<&'a [u8]>,
}

impl<'a> RequestWire<'a> {
    pub fn from_request(request: &'a CacheRequest) -> Self {
        Self {
            method: &request.method,
            url: &request.url,
            headers: &request.headers,
            body: carries_body(&request.method).then_some(request.body.as_slice()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Arguments for `new Response(body, init)`.
pub struct ResponseWire<'a> {
    pub status: u16,
    pub status_text: &'a str,
    pub headers: &'a HeaderList,
    pub body: Option<&'a [u8]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// How the worker answers `respondWith`.
pub enum ResponsePlan<'a> {
    /// Hand back the host response untouched.
    Passthrough(&'a HostObject),
    /// Answer with `Response.error()`.
    NetworkError,
    /// Construct a fresh response.
    Build(ResponseWire<'a>),
}

impl<'a> ResponsePlan<'a> {
    pub fn for_response(response: Option<&'a CacheResponse>) -> Self {
        let Some(response) = response else {
            return Self::NetworkError;
        };
        if let Some(host) = response.host() {
            return Self::Passthrough(host);
        }
        if !is_constructible_status(response.status) {
            return Self::NetworkError;
        }
        let null_body = NULL_BODY_STATUSES.contains(&response.status);
        Self::Build(ResponseWire {
            status: response.status,
            status_text: &response.status_text,
            headers: &response.headers,
            body: (!null_body).then_some(response.body.as_slice()),
        })
    }
}
