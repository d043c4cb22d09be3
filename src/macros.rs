//! Console logging macros.
//!
//! In the browser these forward to `console.log` / `console.warn` /
//! `console.error`. On host targets (unit tests, the preview helper) the
//! arguments are still type-checked but nothing is printed, since the
//! wasm-bindgen imports cannot be called outside a JS runtime.

#[doc(hidden)]
#[cfg(target_arch = "wasm32")]
pub fn emit(level: Level, message: &str) {
    let value = wasm_bindgen::JsValue::from_str(message);
    match level {
        Level::Log => web_sys::console::log_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Error => web_sys::console::error_1(&value),
    }
}

#[doc(hidden)]
#[cfg(not(target_arch = "wasm32"))]
pub fn emit(_level: Level, _message: &str) {}

#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub enum Level {
    Log,
    Warn,
    Error,
}

/// `console.log` with `format!` arguments.
///
/// ```rust,ignore
/// console_log!("loader finished after {} ms", elapsed);
/// ```
#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        $crate::macros::emit($crate::macros::Level::Log, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        $crate::macros::emit($crate::macros::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_error {
    ($($arg:tt)*) => {
        $crate::macros::emit($crate::macros::Level::Error, &format!($($arg)*))
    };
}
