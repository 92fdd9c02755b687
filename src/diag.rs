//! Operator-visible diagnostics.
//!
//! In the browser these land in the developer console; elsewhere they are
//! emitted as `tracing` events so a native host (or a test) can subscribe.

#[cfg(target_arch = "wasm32")]
pub fn info(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn info(message: &str) {
    tracing::info!(target: "scale_collapse", "{message}");
}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(message: &str) {
    tracing::warn!(target: "scale_collapse", "{message}");
}
