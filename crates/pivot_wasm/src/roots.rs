//! Root-finding entry points over a compiled user function.

use crate::{from_js, to_js};
use anyhow::{bail, Context, Result};
use pivot_core::config::{RootFindSettings, RootMethod, ScanSettings};
use pivot_core::equation_engine::{compile_function, CompiledFunction};
use pivot_core::root_finding::{auto_find_root, find_root, AutoRoot, Convergence, Seeds};
use pivot_core::scan::{rank_pairs, scan, RankedPair};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub fn parse_root_method(name: &str) -> Result<RootMethod> {
    match name {
        "bisection" => Ok(RootMethod::Bisection),
        "false_position" | "regula_falsi" => Ok(RootMethod::FalsePosition),
        "newton" | "newton_raphson" => Ok(RootMethod::NewtonRaphson),
        "secant" => Ok(RootMethod::Secant),
        other => bail!("Unknown root method '{other}'"),
    }
}

/// A function of `x` typed by the user, compiled once and evaluated many times.
#[wasm_bindgen]
pub struct WasmFunction {
    function: CompiledFunction,
}

impl WasmFunction {
    pub fn compile(source: &str) -> Result<Self> {
        let function = compile_function(source)
            .with_context(|| format!("Invalid function \"{source}\""))?;
        Ok(Self { function })
    }

    pub fn solve(
        &self,
        method: RootMethod,
        seeds: Seeds,
        settings: &RootFindSettings,
    ) -> Result<Convergence> {
        find_root(&self.function, method, seeds, settings)
            .with_context(|| format!("{method:?} failed on f(x) = {}", self.function.source))
    }

    pub fn auto_solve(
        &self,
        method: RootMethod,
        scan_settings: &ScanSettings,
        settings: &RootFindSettings,
    ) -> Result<AutoRoot> {
        auto_find_root(&self.function, method, scan_settings, settings)
            .with_context(|| format!("{method:?} failed on f(x) = {}", self.function.source))
    }

    pub fn brackets(&self, scan_settings: &ScanSettings) -> Result<Vec<(f64, f64)>> {
        scan(&self.function, scan_settings).context("Interval scan failed")
    }

    pub fn ranked_pairs(&self, scan_settings: &ScanSettings) -> Result<Vec<RankedPair>> {
        rank_pairs(&self.function, scan_settings).context("Interval scan failed")
    }
}

fn settings_or_default<T: DeserializeOwned + Default>(
    value: JsValue,
    what: &str,
) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        Ok(T::default())
    } else {
        from_js(value, what)
    }
}

fn js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

#[wasm_bindgen]
impl WasmFunction {
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str) -> Result<WasmFunction, JsValue> {
        crate::init_panic_hook();
        Self::compile(source).map_err(js_error)
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.function.eval(x)
    }

    pub fn find_root(
        &self,
        method: &str,
        seeds: JsValue,
        settings: JsValue,
    ) -> Result<JsValue, JsValue> {
        let method = parse_root_method(method).map_err(js_error)?;
        let seeds: Seeds = from_js(seeds, "seeds")?;
        let settings: RootFindSettings = settings_or_default(settings, "settings")?;
        let result = self.solve(method, seeds, &settings).map_err(js_error)?;
        to_js(&result)
    }

    pub fn auto_find_root(
        &self,
        method: &str,
        scan_settings: JsValue,
        settings: JsValue,
    ) -> Result<JsValue, JsValue> {
        let method = parse_root_method(method).map_err(js_error)?;
        let scan_settings: ScanSettings = settings_or_default(scan_settings, "scan settings")?;
        let settings: RootFindSettings = settings_or_default(settings, "settings")?;
        let result = self
            .auto_solve(method, &scan_settings, &settings)
            .map_err(js_error)?;
        to_js(&result)
    }

    pub fn scan_intervals(&self, scan_settings: JsValue) -> Result<JsValue, JsValue> {
        let scan_settings: ScanSettings = settings_or_default(scan_settings, "scan settings")?;
        let brackets = self.brackets(&scan_settings).map_err(js_error)?;
        to_js(&brackets)
    }

    pub fn rank_pairs(&self, scan_settings: JsValue) -> Result<JsValue, JsValue> {
        let scan_settings: ScanSettings = settings_or_default(scan_settings, "scan settings")?;
        let pairs = self.ranked_pairs(&scan_settings).map_err(js_error)?;
        to_js(&pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_core::error::RootFindError;

    #[test]
    fn compiles_and_solves_user_text() {
        let function = WasmFunction::compile("x^2 = 2").expect("compile");
        let result = function
            .solve(
                RootMethod::Bisection,
                Seeds::Bracket { a: 1.0, b: 2.0 },
                &RootFindSettings::default(),
            )
            .expect("root");
        assert!((result.root - 1.41421).abs() < 1e-5);
    }

    #[test]
    fn invalid_text_is_reported_with_the_source() {
        let err = WasmFunction::compile("sen x").err().expect("should fail");
        let message = format!("{err:#}");
        assert!(message.starts_with("Invalid function \"sen x\""), "{message}");
    }

    #[test]
    fn failures_keep_the_core_error() {
        let function = WasmFunction::compile("x^2 + 1").expect("compile");
        let err = function
            .solve(
                RootMethod::Bisection,
                Seeds::Bracket { a: -1.0, b: 1.0 },
                &RootFindSettings::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RootFindError>(),
            Some(RootFindError::NoSignChange { .. })
        ));
    }

    #[test]
    fn auto_solve_and_scan_share_the_grid() {
        let function = WasmFunction::compile("sen(x) - 0,5").expect("compile");
        let scan_settings = ScanSettings {
            start: 0.0,
            end: 3.0,
            step: 0.25,
        };
        assert_eq!(
            function.brackets(&scan_settings).expect("scan"),
            vec![(0.5, 0.75), (2.5, 2.75)]
        );
        let auto = function
            .auto_solve(RootMethod::Secant, &scan_settings, &RootFindSettings::default())
            .expect("root");
        assert_eq!(auto.seeds, Seeds::Pair { x0: 0.5, x1: 0.75 });
        assert!((auto.convergence.root - std::f64::consts::FRAC_PI_6).abs() < 1e-5);
    }

    #[test]
    fn method_names() {
        assert_eq!(parse_root_method("regula_falsi").unwrap(), RootMethod::FalsePosition);
        assert_eq!(parse_root_method("newton").unwrap(), RootMethod::NewtonRaphson);
        assert!(parse_root_method("brent").is_err());
    }
}
