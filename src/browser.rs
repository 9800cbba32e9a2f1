//! Browser host and JavaScript entry points (wasm32 only).
//!
//! `BrowserHost` answers binding queries from the live global object, so the
//! same table that tests evaluate against profiles runs unchanged in a page
//! or worker. `getGameSupport()` is the exported entry point; on load the
//! module also installs the flat report as `navigator.gameSupport`.

use crate::game_support;
use crate::host::{HostEnvironment, split_path};
use crate::probe::ProbeError;
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn warn(s: &str);
}

/// Host backed by `globalThis`.
pub struct BrowserHost {
    global: Object,
}

impl BrowserHost {
    pub fn new() -> Self {
        Self {
            global: js_sys::global(),
        }
    }

    fn create_element(&self, tag: &str) -> Result<JsValue, ProbeError> {
        let document = self
            .property(self.global.as_ref(), "document")
            .ok_or_else(|| ProbeError::Host("no document in this global scope".to_string()))?;
        let create: Function = Reflect::get(&document, &JsValue::from_str("createElement"))
            .map_err(describe)?
            .dyn_into()
            .map_err(|_| ProbeError::Host("document.createElement is not callable".to_string()))?;
        create
            .call1(&document, &JsValue::from_str(tag))
            .map_err(describe)
    }

    fn property(&self, target: &JsValue, name: &str) -> Option<JsValue> {
        if !(target.is_object() || target.is_function()) {
            return None;
        }
        present(Reflect::get(target, &JsValue::from_str(name)).ok()?)
    }

    fn root(&self, name: &str) -> Option<JsValue> {
        match name {
            "window" => Some(self.global.clone().into()),
            // Element methods are probed on a scratch, never-attached div.
            "element" => self.create_element("div").ok(),
            other => self.property(self.global.as_ref(), other),
        }
    }

    /// Resolve everything but the last segment, returning the parent and the
    /// final property name.
    fn parent_of<'p>(&self, path: &'p str) -> Option<(JsValue, &'p str)> {
        let (root, members) = split_path(path);
        let Some((last, middle)) = members.split_last() else {
            return Some((self.global.clone().into(), root));
        };
        let mut current = self.root(root)?;
        for segment in middle {
            current = self.property(&current, segment)?;
        }
        Some((current, *last))
    }
}

impl Default for BrowserHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEnvironment for BrowserHost {
    fn has_binding(&self, path: &str) -> bool {
        let Some((parent, last)) = self.parent_of(path) else {
            return false;
        };
        if !(parent.is_object() || parent.is_function()) {
            return false;
        }
        Reflect::has(&parent, &JsValue::from_str(last)).unwrap_or(false)
    }

    fn integer(&self, path: &str) -> Option<i64> {
        let (parent, last) = self.parent_of(path)?;
        let value = self.property(&parent, last)?.as_f64()?;
        value.is_finite().then_some(value as i64)
    }

    fn construct(&self, constructor: &str) -> Result<(), ProbeError> {
        let target = self
            .parent_of(constructor)
            .and_then(|(parent, last)| self.property(&parent, last))
            .ok_or_else(|| ProbeError::construction(constructor, "not defined"))?;
        let target: Function = target
            .dyn_into()
            .map_err(|_| ProbeError::construction(constructor, "not a constructor"))?;
        Reflect::construct(&target, &Array::new())
            .map(|_| ())
            .map_err(|err| ProbeError::construction(constructor, message_of(&err)))
    }

    fn canvas_context(&self, context_id: &str) -> Result<bool, ProbeError> {
        let canvas = self.create_element("canvas")?;
        let Some(get_context) = self.property(&canvas, "getContext") else {
            return Ok(false);
        };
        let get_context: Function = get_context
            .dyn_into()
            .map_err(|_| ProbeError::Host("canvas.getContext is not callable".to_string()))?;
        let context = get_context
            .call1(&canvas, &JsValue::from_str(context_id))
            .map_err(describe)?;
        Ok(present(context).is_some())
    }
}

fn present(value: JsValue) -> Option<JsValue> {
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

fn message_of(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string()
        .unwrap_or_else(|| "non-error exception".to_string())
}

fn describe(err: JsValue) -> ProbeError {
    ProbeError::Host(message_of(&err))
}

fn to_js(report: &impl serde::Serialize) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(report).map_err(|err| JsValue::from_str(&err.to_string()))?;
    js_sys::JSON::parse(&json)
}

fn evaluate() -> Result<crate::CapabilityReport, JsValue> {
    game_support(BrowserHost::new()).map_err(|err| {
        let message = format!("{err:#}");
        warn(&message);
        JsValue::from_str(&message)
    })
}

/// Nested report `{category: {name: value}}` for the current global scope.
#[wasm_bindgen(js_name = getGameSupport)]
pub fn get_game_support() -> Result<JsValue, JsValue> {
    to_js(&evaluate()?)
}

/// Legacy flat report `{name: value}` with a `has(name)` method attached.
#[wasm_bindgen(js_name = getGameSupportFlat)]
pub fn get_game_support_flat() -> Result<JsValue, JsValue> {
    let report = evaluate()?;
    let flat = to_js(&report.flatten())?;
    let has = Closure::wrap(
        Box::new(move |name: String| report.has_flat(&name)) as Box<dyn Fn(String) -> bool>
    );
    Reflect::set(&flat, &JsValue::from_str("has"), has.as_ref())?;
    // The function lives as long as the object it is attached to.
    has.forget();
    Ok(flat)
}

/// Evaluate and publish the flat report as `navigator.gameSupport`.
#[wasm_bindgen(js_name = installGameSupport)]
pub fn install_game_support() -> Result<(), JsValue> {
    let navigator = Reflect::get(&js_sys::global(), &JsValue::from_str("navigator"))?;
    if !navigator.is_object() {
        return Err(JsValue::from_str("no navigator in this global scope"));
    }
    let support = get_game_support_flat()?;
    Reflect::set(&navigator, &JsValue::from_str("gameSupport"), &support)?;
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() {
    if let Err(err) = install_game_support() {
        warn(&format!(
            "gameSupport not installed: {}",
            message_of(&err)
        ));
    }
}
