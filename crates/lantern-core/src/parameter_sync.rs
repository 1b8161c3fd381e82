//! Pushing parameter changes from native code to the UI script.
//!
//! The processing thread only writes store slots. The UI thread polls the
//! store at display rate and forwards what changed since the previous poll,
//! so evaluation always happens on the thread that owns the render surface.
//! Changes between two polls collapse to the latest value.

use crate::bridge::parameter_changed_script;
use crate::parameter_store::ParameterStore;
use crate::types::{ParameterIndex, ParameterValue};

/// Last value delivered to the script, per parameter.
#[derive(Debug)]
pub struct ParameterSync {
    last_values: Vec<ParameterValue>,
}

impl ParameterSync {
    /// Create a cache for `count` parameters. Nothing has been delivered yet.
    pub fn new(count: usize) -> Self {
        Self {
            last_values: vec![f64::NAN; count],
        }
    }

    /// Forget what was delivered so the next poll pushes every parameter.
    ///
    /// Called when a page (re)loads.
    pub fn reset(&mut self) {
        self.last_values.fill(f64::NAN);
    }

    /// Compare the store with what was last delivered.
    ///
    /// Returns one script covering every changed parameter, or `None` if
    /// nothing changed.
    pub fn poll(&mut self, store: &ParameterStore) -> Option<String> {
        let mut script = String::new();
        for (i, last) in self.last_values.iter_mut().enumerate() {
            let index = i as ParameterIndex;
            let value = store.get(index);
            // NaN sentinel never compares equal
            if value != *last {
                *last = value;
                script.push_str(&parameter_changed_script(index, value));
            }
        }
        (!script.is_empty()).then_some(script)
    }

    /// Deliver a change reported on the UI thread right away.
    ///
    /// Updates the cache so the next poll does not repeat it. Unknown indices
    /// produce no script.
    pub fn notify(&mut self, index: ParameterIndex, value: ParameterValue) -> Option<String> {
        let last = self.last_values.get_mut(index as usize)?;
        *last = value;
        Some(parameter_changed_script(index, value))
    }
}
