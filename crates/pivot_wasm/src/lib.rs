use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

mod linear;
mod roots;

pub use linear::{determinant, invert_matrix, solve_linear_system};
pub use roots::WasmFunction;

pub(crate) fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {what}: {e}")))
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Compiles `source` and evaluates it at `x`, for previewing a function while it is typed.
#[wasm_bindgen]
pub fn evaluate_function(source: &str, x: f64) -> Result<f64, JsValue> {
    let function = WasmFunction::compile(source)
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
    Ok(function.eval(x))
}
