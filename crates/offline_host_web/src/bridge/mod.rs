//! Browser capability bridge for `offline_host_web` adapters.
//!
//! This module contains the WASM/JS interop layer over Cache Storage and `fetch`, plus a
//! non-WASM fallback shim that behaves like an empty, offline host. Requests read from a fetch
//! event keep the original host `Request`, and responses from the network or a store keep the
//! host `Response`, so the fetch path never rebuilds either.

mod wire;

use offline_host::{CacheRequest, CacheResponse};

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::wire::{carries_body, RequestWire, ResponsePlan};
    use super::*;
    use js_sys::{Promise, Uint8Array};
    use offline_host::HostObject;
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use serde_wasm_bindgen::{from_value, Serializer};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    #[wasm_bindgen(inline_js = r#"
function fail(message) {
  throw new Error(message);
}

function requireCaches() {
  if (typeof caches === 'undefined') {
    fail('Cache API unavailable');
  }
  return caches;
}

export function jsRequestFromWire(wire) {
  const init = { method: wire.method, headers: wire.headers };
  if (wire.body != null) {
    init.body = new Uint8Array(wire.body);
  }
  return new Request(wire.url, init);
}

export function jsDescribeRequest(req) {
  return {
    method: req.method,
    url: req.url,
    headers: Array.from(req.headers.entries()),
  };
}

export async function jsReadBody(req) {
  return new Uint8Array(await req.clone().arrayBuffer());
}

export function jsDescribeResponse(res) {
  return {
    status: res.status,
    status_text: res.statusText,
    headers: Array.from(res.headers.entries()),
  };
}

export async function jsStoreOpen(name) {
  await requireCaches().open(name);
  return null;
}

export async function jsStorePopulate(name, keys) {
  const cache = await requireCaches().open(name);
  await cache.addAll(keys);
  return null;
}

export async function jsStoreNames() {
  return await requireCaches().keys();
}

export async function jsStoreDelete(name) {
  return await requireCaches().delete(name);
}

export async function jsStoreLookup(name, req) {
  const storage = requireCaches();
  if (name == null) {
    return (await storage.match(req)) || null;
  }
  if (!(await storage.has(name))) return null;
  return (await (await storage.open(name)).match(req)) || null;
}

export async function jsNetworkFetch(req) {
  return await fetch(req);
}

export function jsBuildResponse(wire) {
  return new Response(wire.body == null ? null : new Uint8Array(wire.body), {
    status: wire.status,
    statusText: wire.status_text,
    headers: wire.headers,
  });
}

export function jsErrorResponse() {
  return Response.error();
}
"#)]
    extern "C" {
        #[wasm_bindgen(catch, js_name = jsRequestFromWire)]
        fn js_request_from_wire(wire: JsValue) -> Result<JsValue, JsValue>;
        #[wasm_bindgen(js_name = jsDescribeRequest)]
        fn js_describe_request(request: &JsValue) -> JsValue;
        #[wasm_bindgen(js_name = jsReadBody)]
        fn js_read_body(request: &JsValue) -> Promise;
        #[wasm_bindgen(js_name = jsDescribeResponse)]
        fn js_describe_response(response: &JsValue) -> JsValue;

        #[wasm_bindgen(js_name = jsStoreOpen)]
        fn js_store_open(name: &str) -> Promise;
        #[wasm_bindgen(js_name = jsStorePopulate)]
        fn js_store_populate(name: &str, keys: JsValue) -> Promise;
        #[wasm_bindgen(js_name = jsStoreNames)]
        fn js_store_names() -> Promise;
        #[wasm_bindgen(js_name = jsStoreDelete)]
        fn js_store_delete(name: &str) -> Promise;
        #[wasm_bindgen(js_name = jsStoreLookup)]
        fn js_store_lookup(name: Option<String>, request: &JsValue) -> Promise;

        #[wasm_bindgen(js_name = jsNetworkFetch)]
        fn js_network_fetch(request: &JsValue) -> Promise;

        #[wasm_bindgen(catch, js_name = jsBuildResponse)]
        fn js_build_response(wire: JsValue) -> Result<JsValue, JsValue>;
        #[wasm_bindgen(js_name = jsErrorResponse)]
        fn js_error_response() -> JsValue;
    }

    async fn await_promise(promise: Promise) -> Result<JsValue, String> {
        JsFuture::from(promise).await.map_err(js_error_to_string)
    }

    fn js_error_to_string(err: JsValue) -> String {
        if let Some(text) = err.as_string() {
            return text;
        }
        if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                return text;
            }
        }
        format!("{err:?}")
    }

    fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, String> {
        value
            .serialize(&Serializer::json_compatible())
            .map_err(|e| e.to_string())
    }

    fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, String> {
        from_value(value).map_err(|e| e.to_string())
    }

    async fn promise_to_json<T: DeserializeOwned>(promise: Promise) -> Result<T, String> {
        from_js(await_promise(promise).await?)
    }

    fn host_value(host: &HostObject) -> Result<&JsValue, String> {
        host.downcast_ref::<JsValue>()
            .ok_or_else(|| "host object is not a JS value".to_string())
    }

    /// The original host request when attached, otherwise one built from the descriptor.
    fn host_request(request: &CacheRequest) -> Result<JsValue, String> {
        match request.host() {
            Some(host) => host_value(host).cloned(),
            None => js_request_from_wire(to_js(&RequestWire::from_request(request))?)
                .map_err(js_error_to_string),
        }
    }

    fn describe_response(response: JsValue) -> Result<CacheResponse, String> {
        let head: CacheResponse = from_js(js_describe_response(&response))?;
        Ok(head.with_host(HostObject::new(response)))
    }

    pub async fn store_open(name: &str) -> Result<(), String> {
        let _ = await_promise(js_store_open(name)).await?;
        Ok(())
    }

    pub async fn store_populate(name: &str, keys: &[String]) -> Result<(), String> {
        let _ = await_promise(js_store_populate(name, to_js(keys)?)).await?;
        Ok(())
    }

    pub async fn store_names() -> Result<Vec<String>, String> {
        promise_to_json(js_store_names()).await
    }

    pub async fn store_delete(name: &str) -> Result<bool, String> {
        await_promise(js_store_delete(name))
            .await?
            .as_bool()
            .ok_or_else(|| "Cache API returned non-boolean delete result".to_string())
    }

    pub async fn store_lookup(
        name: Option<&str>,
        request: &CacheRequest,
    ) -> Result<Option<CacheResponse>, String> {
        let request = host_request(request)?;
        let matched = await_promise(js_store_lookup(name.map(str::to_string), &request)).await?;
        if matched.is_null() || matched.is_undefined() {
            return Ok(None);
        }
        describe_response(matched).map(Some)
    }

    pub async fn network_fetch(request: &CacheRequest) -> Result<CacheResponse, String> {
        let request = host_request(request)?;
        describe_response(await_promise(js_network_fetch(&request)).await?)
    }

    pub async fn describe_request(request: &JsValue) -> Result<CacheRequest, String> {
        let mut described: CacheRequest = from_js(js_describe_request(request))?;
        if carries_body(&described.method) {
            let body = await_promise(js_read_body(request)).await?;
            described.body = Uint8Array::new(&body).to_vec();
        }
        Ok(described.with_host(HostObject::new(request.clone())))
    }

    pub fn build_response(response: Option<&CacheResponse>) -> Result<JsValue, String> {
        match ResponsePlan::for_response(response) {
            ResponsePlan::Passthrough(host) => host_value(host).cloned(),
            ResponsePlan::NetworkError => Ok(js_error_response()),
            ResponsePlan::Build(wire) => {
                js_build_response(to_js(&wire)?).map_err(js_error_to_string)
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::*;

    // Opening succeeds so `install` reaches populate; populate fails so nothing counts as cached.
    pub async fn store_open(_name: &str) -> Result<(), String> {
        Ok(())
    }

    pub async fn store_populate(_name: &str, _keys: &[String]) -> Result<(), String> {
        Err("Cache Storage is only available when compiled for wasm32".to_string())
    }

    pub async fn store_names() -> Result<Vec<String>, String> {
        Ok(Vec::new())
    }

    pub async fn store_delete(_name: &str) -> Result<bool, String> {
        Ok(false)
    }

    pub async fn store_lookup(
        _name: Option<&str>,
        _request: &CacheRequest,
    ) -> Result<Option<CacheResponse>, String> {
        Ok(None)
    }

    pub async fn network_fetch(_request: &CacheRequest) -> Result<CacheResponse, String> {
        Err("Network access is only available when compiled for wasm32".to_string())
    }
}

pub async fn store_open(name: &str) -> Result<(), String> {
    imp::store_open(name).await
}

pub async fn store_populate(name: &str, keys: &[String]) -> Result<(), String> {
    imp::store_populate(name, keys).await
}

pub async fn store_names() -> Result<Vec<String>, String> {
    imp::store_names().await
}

pub async fn store_delete(name: &str) -> Result<bool, String> {
    imp::store_delete(name).await
}

pub async fn store_lookup(
    name: Option<&str>,
    request: &CacheRequest,
) -> Result<Option<CacheResponse>, String> {
    imp::store_lookup(name, request).await
}

pub async fn network_fetch(request: &CacheRequest) -> Result<CacheResponse, String> {
    imp::network_fetch(request).await
}

/// Reads a host `Request` into a [`CacheRequest`] that keeps the original attached, buffering
/// its body for methods that carry one.
///
/// # Errors
///
/// Returns an error when the body cannot be read or the descriptor does not deserialize.
#[cfg(target_arch = "wasm32")]
pub async fn describe_request(request: &wasm_bindgen::JsValue) -> Result<CacheRequest, String> {
    imp::describe_request(request).await
}

/// Produces the value handed to `respondWith`.
///
/// An attached host `Response` is returned as is, opaque and redirected responses included.
/// `None`, and descriptors whose status a `Response` cannot carry, become `Response.error()`.
///
/// # Errors
///
/// Returns an error when the descriptor cannot be serialized or the constructor throws.
#[cfg(target_arch = "wasm32")]
pub fn build_response(response: Option<&CacheResponse>) -> Result<wasm_bindgen::JsValue, String> {
    imp::build_response(response)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use offline_host::HostObject;

    use super::wire::{carries_body, RequestWire, ResponsePlan, ResponseWire};
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_bridge_is_an_empty_offline_host() {
        block_on(store_open("v1")).expect("open");
        assert_eq!(
            block_on(store_populate("v1", &["/".to_string()])).expect_err("populate"),
            "Cache Storage is only available when compiled for wasm32"
        );
        assert_eq!(block_on(store_names()).expect("names"), Vec::<String>::new());
        assert!(!block_on(store_delete("v1")).expect("delete"));
        assert_eq!(
            block_on(store_lookup(None, &CacheRequest::get("/"))).expect("lookup"),
            None
        );
        assert!(block_on(network_fetch(&CacheRequest::get("/"))).is_err());
    }

    #[test]
    fn only_methods_with_bodies_forward_them() {
        assert!(!carries_body("GET"));
        assert!(!carries_body("head"));
        assert!(carries_body("POST"));

        let mut route = CacheRequest::new("POST", "/api/v1/optimize_route");
        route.body = br#"{"magasin":"M001"}"#.to_vec();
        assert_eq!(
            RequestWire::from_request(&route).body,
            Some(&br#"{"magasin":"M001"}"#[..])
        );

        let mut get = CacheRequest::get("/");
        get.body = b"ignored".to_vec();
        assert_eq!(RequestWire::from_request(&get).body, None);
    }

    #[test]
    fn attached_host_response_passes_through_whatever_its_status() {
        let host = HostObject::new("opaque cdn response");
        let opaque = CacheResponse::with_status(0, "", Vec::new()).with_host(host.clone());

        assert_eq!(
            ResponsePlan::for_response(Some(&opaque)),
            ResponsePlan::Passthrough(&host)
        );
    }

    #[test]
    fn missing_or_unconstructible_responses_become_network_errors() {
        assert_eq!(ResponsePlan::for_response(None), ResponsePlan::NetworkError);
        for status in [0, 101, 199, 600] {
            let response = CacheResponse::with_status(status, "", Vec::new());
            assert_eq!(
                ResponsePlan::for_response(Some(&response)),
                ResponsePlan::NetworkError,
                "status {status}"
            );
        }
    }

    #[test]
    fn null_body_statuses_drop_the_body() {
        let no_content = CacheResponse::with_status(204, "No Content", b"stray".to_vec());
        let ResponsePlan::Build(wire) = ResponsePlan::for_response(Some(&no_content)) else {
            panic!("204 should be built");
        };
        assert_eq!(wire.body, None);

        let icon = CacheResponse::ok(b"png".to_vec()).header("content-type", "image/png");
        assert_eq!(
            ResponsePlan::for_response(Some(&icon)),
            ResponsePlan::Build(ResponseWire {
                status: 200,
                status_text: "OK",
                headers: &vec![("content-type".to_string(), "image/png".to_string())],
                body: Some(&b"png"[..]),
            })
        );
    }
}
