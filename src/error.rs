use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures while wiring the page. Per-frame work never produces these: a
/// missing or detached element during a tick is skipped, not reported.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("no global `window` exists")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("element `{0}` not found")]
    MissingElement(String),

    #[error("{0} is not supported by this browser")]
    Unsupported(&'static str),

    #[error("invalid site config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        SiteError::Js(describe_js(&value))
    }
}

impl From<SiteError> for JsValue {
    fn from(err: SiteError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best available text for a thrown JS value: `Error.message`, a plain
/// string, or the debug form as a last resort.
pub fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        if let Some(err) = value.dyn_ref::<js_sys::Error>() {
            return String::from(err.message());
        }
    }
    format!("{:?}", value)
}

pub type SiteResult<T> = Result<T, SiteError>;
