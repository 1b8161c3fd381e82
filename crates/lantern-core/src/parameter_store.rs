//! Lock-free parameter storage shared by the audio, host and UI threads.
//!
//! Each declared parameter owns one `AtomicU64` slot holding the bit pattern of
//! its current `f64` value. Reads and writes are single relaxed atomic
//! operations: no locks, no allocation, bounded latency. Values are
//! independent of each other, so last-write-wins is all the ordering needed.
//!
//! Writes are clamped to the parameter's declared range and non-finite values
//! are ignored, so a read always returns a value inside the range.
//!
//! An index outside `0..count()` is a caller defect. It is tolerated rather
//! than reported: `get` returns `0.0` and `set` does nothing.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::parameter_info::ParameterInfo;
use crate::types::{ParameterIndex, ParameterValue};

struct Slot {
    info: ParameterInfo,
    value: AtomicU64,
}

/// Fixed-size collection of parameter slots.
///
/// Shared as `Arc<ParameterStore>` between the processing side, the format
/// wrapper and the UI session. The set of parameters is fixed at construction.
pub struct ParameterStore {
    slots: Box<[Slot]>,
}

impl ParameterStore {
    /// Create a store from declared parameters.
    ///
    /// # Panics
    ///
    /// Panics if a parameter's index does not match its position, if its
    /// range is inverted or non-finite, or if its default lies outside the
    /// range. These are declaration errors caught once at startup.
    pub fn new(infos: Vec<ParameterInfo>) -> Self {
        for (position, info) in infos.iter().enumerate() {
            assert_eq!(
                info.index as usize, position,
                "parameter '{}' declared with index {} at position {}",
                info.name, info.index, position
            );
            assert!(
                info.min.is_finite() && info.max.is_finite() && info.min <= info.max,
                "parameter '{}' has an invalid range",
                info.name
            );
            assert!(
                (info.min..=info.max).contains(&info.default),
                "parameter '{}' default lies outside its range",
                info.name
            );
        }

        let slots = infos
            .into_iter()
            .map(|info| Slot {
                value: AtomicU64::new(info.default.to_bits()),
                info,
            })
            .collect();

        Self { slots }
    }

    /// Number of declared parameters.
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Metadata for a parameter, or `None` for an unknown index.
    pub fn info(&self, index: ParameterIndex) -> Option<&ParameterInfo> {
        self.slots.get(index as usize).map(|slot| &slot.info)
    }

    /// Iterate over parameter metadata in index order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterInfo> {
        self.slots.iter().map(|slot| &slot.info)
    }

    /// Read the current plain value. Returns `0.0` for an unknown index.
    ///
    /// Real-time safe.
    #[inline]
    pub fn get(&self, index: ParameterIndex) -> ParameterValue {
        match self.slots.get(index as usize) {
            Some(slot) => f64::from_bits(slot.value.load(Ordering::Relaxed)),
            None => 0.0,
        }
    }

    /// Write a plain value, clamped to the declared range.
    ///
    /// Unknown indices and non-finite values are ignored. Real-time safe.
    #[inline]
    pub fn set(&self, index: ParameterIndex, value: ParameterValue) {
        let Some(slot) = self.slots.get(index as usize) else {
            return;
        };
        if !value.is_finite() {
            return;
        }
        let clamped = slot.info.clamp(value);
        slot.value.store(clamped.to_bits(), Ordering::Relaxed);
    }

    /// Read the current value mapped to 0.0..=1.0.
    pub fn get_normalized(&self, index: ParameterIndex) -> ParameterValue {
        match self.info(index) {
            Some(info) => info.normalize(self.get(index)),
            None => 0.0,
        }
    }

    /// Write a value given in 0.0..=1.0.
    pub fn set_normalized(&self, index: ParameterIndex, normalized: ParameterValue) {
        if !normalized.is_finite() {
            return;
        }
        if let Some(info) = self.info(index) {
            self.set(index, info.denormalize(normalized));
        }
    }

    /// Restore every parameter to its declared default.
    pub fn reset(&self) {
        for slot in self.slots.iter() {
            slot.value.store(slot.info.default.to_bits(), Ordering::Relaxed);
        }
    }
}

impl std::fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().map(|slot| {
                (slot.info.name, f64::from_bits(slot.value.load(Ordering::Relaxed)))
            }))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn store() -> ParameterStore {
        ParameterStore::new(vec![
            ParameterInfo::new(0, "Param1").with_range(0.0, 100.0).output(),
            ParameterInfo::new(1, "Mix").with_default(0.5),
        ])
    }

    #[test]
    fn test_defaults_after_construction() {
        let params = store();
        assert_eq!(params.count(), 2);
        assert_eq!(params.get(0), 0.0);
        assert_eq!(params.get(1), 0.5);
    }

    #[test]
    fn test_write_then_read_returns_written_value() {
        let params = store();
        for value in [0.0, 17.0, 42.0, 99.5, 100.0] {
            params.set(0, value);
            assert_eq!(params.get(0), value);
        }
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let params = store();
        params.set(0, 250.0);
        assert_eq!(params.get(0), 100.0);
        params.set(0, -1.0);
        assert_eq!(params.get(0), 0.0);
    }

    #[test]
    fn test_non_finite_writes_are_ignored() {
        let params = store();
        params.set(0, 12.0);
        params.set(0, f64::NAN);
        params.set(0, f64::INFINITY);
        assert_eq!(params.get(0), 12.0);
    }

    #[test]
    fn test_unknown_index_is_benign() {
        let params = store();
        assert_eq!(params.get(7), 0.0);
        params.set(7, 3.0);
        assert_eq!(params.get(7), 0.0);
        assert!(params.info(7).is_none());
        assert_eq!(params.get_normalized(7), 0.0);
    }

    #[test]
    fn test_normalized_access() {
        let params = store();
        params.set_normalized(0, 0.25);
        assert_eq!(params.get(0), 25.0);
        assert_eq!(params.get_normalized(0), 0.25);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let params = store();
        params.set(0, 80.0);
        params.set(1, 0.9);
        params.reset();
        assert_eq!(params.get(0), 0.0);
        assert_eq!(params.get(1), 0.5);
    }

    #[test]
    fn test_concurrent_writers_leave_a_written_value() {
        let params = Arc::new(store());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let params = Arc::clone(&params);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        params.set(0, n as f64 * 10.0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let value = params.get(0);
        assert!([0.0, 10.0, 20.0, 30.0].contains(&value));
    }

    #[test]
    #[should_panic(expected = "declared with index")]
    fn test_mismatched_index_panics() {
        ParameterStore::new(vec![ParameterInfo::new(1, "Wrong")]);
    }

    #[test]
    #[should_panic(expected = "default lies outside")]
    fn test_default_outside_range_panics() {
        ParameterStore::new(vec![ParameterInfo::new(0, "Bad").with_default(5.0)]);
    }
}
