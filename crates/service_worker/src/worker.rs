use std::rc::Rc;

use js_sys::Promise;
use offline_cache_agent::{
    ConfigError, EventKind, HandlerOutcome, LifecycleEvent, OfflineCacheAgent,
};
use offline_host_web::worker::{build_response, describe_request};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

thread_local! {
    static AGENT: Result<Rc<OfflineCacheAgent>, ConfigError> =
        crate::build_agent().map(Rc::new);
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Handles one host event. Resolves to `undefined` for `install`/`activate` and to a `Response`
/// for `fetch`; rejects when install or activate fails. Network and cached responses reach
/// `respondWith` as the host produced them.
#[wasm_bindgen]
pub fn dispatch(event_type: &str, request: Option<web_sys::Request>) -> Promise {
    let kind = event_type.parse::<EventKind>();
    let agent = AGENT.with(Clone::clone);
    future_to_promise(async move {
        let agent = agent.map_err(|err| to_js_error(&err.to_string()))?;
        match kind.map_err(|err| to_js_error(&err.to_string()))? {
            EventKind::Install => settle(&agent, LifecycleEvent::Install).await,
            EventKind::Activate => settle(&agent, LifecycleEvent::Activate).await,
            EventKind::Fetch => {
                let request = request.ok_or_else(|| to_js_error("fetch event without request"))?;
                respond(&agent, request).await
            }
        }
    })
}

// A rejection is how the host learns that install or activate failed.
async fn settle(agent: &OfflineCacheAgent, event: LifecycleEvent) -> Result<JsValue, JsValue> {
    agent
        .dispatch(event)
        .await
        .map(|_| JsValue::UNDEFINED)
        .map_err(|err| to_js_error(&err.to_string()))
}

async fn respond(
    agent: &OfflineCacheAgent,
    request: web_sys::Request,
) -> Result<JsValue, JsValue> {
    let request = describe_request(request.as_ref())
        .await
        .map_err(|err| to_js_error(&err))?;
    let outcome = agent
        .dispatch(LifecycleEvent::Fetch(request))
        .await
        .map_err(|err| to_js_error(&err.to_string()))?;
    let response = match outcome {
        HandlerOutcome::Responded(outcome) => outcome.into_response(),
        HandlerOutcome::Installed(_) | HandlerOutcome::Activated(_) => None,
    };
    build_response(response.as_ref()).map_err(|err| to_js_error(&err))
}

fn to_js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}
