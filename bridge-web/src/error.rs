//! Error types for browser bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::DomException;

/// Result type for browser bridge operations
pub type WebResult<T> = Result<T, WebError>;

/// Errors raised by browser APIs
#[derive(Error, Debug)]
pub enum WebError {
    /// A browser global (`window`, `AudioContext`) is missing
    #[error("Browser API not available: {0}")]
    NotAvailable(String),

    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),
}

impl From<WebError> for BridgeError {
    fn from(err: WebError) -> Self {
        match err {
            WebError::NotAvailable(api) => BridgeError::NotAvailable(api),
            WebError::JavaScript(message) => BridgeError::OperationFailed(message),
        }
    }
}

impl From<JsValue> for WebError {
    fn from(js_value: JsValue) -> Self {
        WebError::JavaScript(js_message(&js_value))
    }
}

/// Best-effort human readable message of a thrown JavaScript value.
pub(crate) fn js_message(js_value: &JsValue) -> String {
    if let Some(message) = js_value.as_string() {
        message
    } else if let Some(exception) = js_value.dyn_ref::<DomException>() {
        format!("{}: {}", exception.name(), exception.message())
    } else if let Some(error) = js_value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{:?}", js_value)
    }
}

/// Classify the rejection of `HTMLMediaElement.play()`.
///
/// `NotAllowedError` (autoplay policy) and `AbortError` (the load was
/// interrupted by a new source or a pause) are policy rejections; everything
/// else means the media itself could not be played.
pub(crate) fn play_rejection(js_value: JsValue) -> BridgeError {
    let message = js_message(&js_value);
    match js_value.dyn_ref::<DomException>().map(|e| e.name()) {
        Some(name) if name == "NotAllowedError" || name == "AbortError" => {
            BridgeError::PlaybackRejected(message)
        }
        Some(_) => BridgeError::MediaSource(message),
        None => BridgeError::OperationFailed(message),
    }
}
