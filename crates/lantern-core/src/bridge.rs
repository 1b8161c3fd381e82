//! Named native functions callable from the UI script.
//!
//! Script code calls `hostGetParameter(index)` and `hostSetParameter(index,
//! value)`; both return Promises. Calls travel as JSON over the engine's
//! message channel:
//!
//! ```text
//! script -> native  {"type":"invoke","callId":7,"name":"hostGetParameter","args":[0]}
//! native -> script  window.__lantern__._resolve(7,42.0)
//! ```
//!
//! Native code pushes value changes by evaluating
//! [`parameter_changed_script`], which calls the page's global
//! `parameterChanged(index, value)` when it exists.
//!
//! A malformed call (wrong arity, bad index, non-numeric value, unknown name)
//! resolves to `null`. It is logged and never crosses back into the host.
//! Reading a well-formed index with no parameter yields the store's zero.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::parameter_store::ParameterStore;
use crate::types::{ParameterIndex, ParameterValue};

/// Name of the binding returning a parameter's current value.
pub const GET_PARAMETER: &str = "hostGetParameter";

/// Name of the binding writing a parameter.
pub const SET_PARAMETER: &str = "hostSetParameter";

/// Name of the script-side entry point receiving pushed changes.
pub const PARAMETER_CHANGED: &str = "parameterChanged";

/// Script injected before any page script runs.
///
/// Defines the Promise-based host functions and the `window.__lantern__`
/// object native replies are delivered to. Arguments are forwarded as given so
/// arity is checked on the native side.
pub const BOOTSTRAP_SCRIPT: &str = r#"(function () {
  if (window.__lantern__) return;
  var pending = new Map();
  var nextId = 1;
  function post(message) {
    window.chrome.webview.postMessage(JSON.stringify(message));
  }
  function invoke(name, args) {
    return new Promise(function (resolve, reject) {
      var callId = nextId++;
      pending.set(callId, resolve);
      try {
        post({ type: "invoke", callId: callId, name: name, args: args });
      } catch (err) {
        pending.delete(callId);
        reject(err);
      }
    });
  }
  window.__lantern__ = {
    invoke: invoke,
    _resolve: function (callId, result) {
      var resolve = pending.get(callId);
      if (resolve) {
        pending.delete(callId);
        resolve(result);
      }
    }
  };
  window.hostGetParameter = function () {
    return invoke("hostGetParameter", Array.prototype.slice.call(arguments));
  };
  window.hostSetParameter = function () {
    return invoke("hostSetParameter", Array.prototype.slice.call(arguments));
  };
})();"#;

/// Native to script evaluation channel.
///
/// Implemented by every render surface. Evaluation is fire-and-forget.
pub trait ScriptContext {
    fn evaluate_script(&self, script: &str);
}

/// Receives UI-initiated edits of input parameters so the host can record
/// automation.
///
/// Values are normalized to 0.0..=1.0.
pub trait EditSink: Send + Sync {
    fn begin_edit(&self, index: ParameterIndex);
    fn perform_edit(&self, index: ParameterIndex, normalized: ParameterValue);
    fn end_edit(&self, index: ParameterIndex);
}

/// Binding registration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A binding with this name already exists.
    AlreadyBound(String),
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyBound(name) => write!(f, "binding '{name}' is already registered"),
        }
    }
}

impl std::error::Error for BindingError {}

type BindingFn = Box<dyn Fn(&[Value]) -> Value + Send + Sync>;

struct Binding {
    arity: usize,
    call: BindingFn,
}

/// Registry of script-callable native functions.
pub struct Bridge {
    params: Arc<ParameterStore>,
    bindings: HashMap<String, Binding>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ScriptMessage {
    #[serde(rename = "invoke")]
    Invoke {
        #[serde(rename = "callId")]
        call_id: u64,
        name: String,
        #[serde(default)]
        args: Vec<Value>,
    },
}

impl Bridge {
    /// Create a bridge with the two parameter bindings registered.
    pub fn new(params: Arc<ParameterStore>) -> Self {
        let mut bridge = Self {
            params,
            bindings: HashMap::new(),
        };
        bridge.install_parameter_bindings(None);
        bridge
    }

    /// Forward UI edits of input parameters to `sink`.
    pub fn with_edit_sink(mut self, sink: Arc<dyn EditSink>) -> Self {
        self.install_parameter_bindings(Some(sink));
        self
    }

    /// The store the parameter bindings operate on.
    pub fn parameters(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    /// Register an additional binding taking exactly `arity` arguments.
    pub fn bind<F>(&mut self, name: impl Into<String>, arity: usize, call: F) -> Result<(), BindingError>
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        if self.bindings.contains_key(&name) {
            return Err(BindingError::AlreadyBound(name));
        }
        self.bindings.insert(
            name,
            Binding {
                arity,
                call: Box::new(call),
            },
        );
        Ok(())
    }

    /// Whether a binding with this name exists.
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Call a binding. Malformed calls yield `Value::Null`.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Value {
        let Some(binding) = self.bindings.get(name) else {
            log::debug!("Script called unknown binding '{name}'");
            return Value::Null;
        };
        if args.len() != binding.arity {
            log::debug!(
                "Binding '{name}' expects {} arguments, got {}",
                binding.arity,
                args.len()
            );
            return Value::Null;
        }
        (binding.call)(args)
    }

    /// Dispatch one raw message from the script.
    ///
    /// Returns the script resolving the caller's Promise, or `None` when the
    /// message is not a well-formed call.
    pub fn handle_message(&self, json: &str) -> Option<String> {
        let message = match serde_json::from_str::<ScriptMessage>(json) {
            Ok(message) => message,
            Err(err) => {
                log::warn!("Invalid script message ({err}): {json}");
                return None;
            }
        };

        match message {
            ScriptMessage::Invoke { call_id, name, args } => {
                let result = self.invoke(&name, &args);
                let json = serde_json::to_string(&result).unwrap_or_else(|_| "null".into());
                Some(format!("window.__lantern__._resolve({call_id},{json})"))
            }
        }
    }

    fn install_parameter_bindings(&mut self, sink: Option<Arc<dyn EditSink>>) {
        let params = Arc::clone(&self.params);
        self.bindings.insert(
            GET_PARAMETER.to_string(),
            Binding {
                arity: 1,
                call: Box::new(move |args| {
                    let Some(index) = parse_index(&args[0]) else {
                        log::debug!("{GET_PARAMETER}: invalid index {}", args[0]);
                        return Value::Null;
                    };
                    // The store reads unknown indices as zero.
                    Value::from(params.get(index))
                }),
            },
        );

        let params = Arc::clone(&self.params);
        self.bindings.insert(
            SET_PARAMETER.to_string(),
            Binding {
                arity: 2,
                call: Box::new(move |args| {
                    let Some(index) = parse_index(&args[0]) else {
                        log::debug!("{SET_PARAMETER}: invalid index {}", args[0]);
                        return Value::Null;
                    };
                    let Some(value) = args[1].as_f64() else {
                        log::debug!("{SET_PARAMETER}: invalid value {}", args[1]);
                        return Value::Null;
                    };
                    let Some(info) = params.info(index) else {
                        log::debug!("{SET_PARAMETER}: no parameter {index}");
                        return Value::Null;
                    };

                    params.set(index, value);

                    if let Some(sink) = sink.as_ref().filter(|_| !info.is_output()) {
                        sink.begin_edit(index);
                        sink.perform_edit(index, params.get_normalized(index));
                        sink.end_edit(index);
                    }
                    Value::Null
                }),
            },
        );
    }
}

/// Parse a script-supplied parameter index.
///
/// Accepts non-negative integers and integral floats (`3` and `3.0`).
fn parse_index(value: &Value) -> Option<ParameterIndex> {
    if let Some(n) = value.as_u64() {
        return ParameterIndex::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= ParameterIndex::MAX as f64 {
        Some(f as ParameterIndex)
    } else {
        None
    }
}

/// Script notifying the page that a parameter changed.
///
/// Pages that do not define `parameterChanged` are unaffected.
pub fn parameter_changed_script(index: ParameterIndex, value: ParameterValue) -> String {
    let value = serde_json::to_string(&value).unwrap_or_else(|_| "null".into());
    format!(
        "if(typeof window.{PARAMETER_CHANGED}==='function'){{window.{PARAMETER_CHANGED}({index},{value});}}"
    )
}
