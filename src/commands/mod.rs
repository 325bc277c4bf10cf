//! Tauri Command Wrappers
//!
//! Frontend bindings to host commands, organized by domain.

mod board;
mod column;
mod task;
mod user;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "core"])]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

// Re-export all public items
pub use board::*;
pub use column::*;
pub use task::*;
pub use user::*;

/// Whether the page runs inside a host that answers `invoke`
pub fn host_available() -> bool {
    web_sys::window()
        .and_then(|win| js_sys::Reflect::get(&win, &JsValue::from_str("__TAURI__")).ok())
        .is_some_and(|tauri| !tauri.is_undefined())
}

/// Invoke `cmd` with serialized `args` and decode the reply
async fn call<A, T>(cmd: &str, args: &A) -> Result<T, String>
where
    A: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let js_args = serde_wasm_bindgen::to_value(args).map_err(|e| e.to_string())?;
    let result = invoke(cmd, js_args).await.map_err(|err| {
        err.as_string().unwrap_or_else(|| format!("{} failed: {:?}", cmd, err))
    })?;
    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}
