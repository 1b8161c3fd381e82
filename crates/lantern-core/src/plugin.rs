//! The processing-unit contract seen by format wrappers.
//!
//! A plugin owns its [`ParameterStore`] behind an `Arc` so the wrapper and
//! the editor can read and write the same slots without going through the
//! plugin object. Everything else the host needs (port layout, processing)
//! is reached through this trait.

use std::sync::Arc;

use crate::parameter_store::ParameterStore;
use crate::ports::AudioPorts;
use crate::types::{ParameterIndex, ParameterValue};

/// Borrowed audio channels for one processing call.
///
/// The wrapper builds the slice arrays on the stack from host pointers, so
/// constructing a buffer never allocates.
pub struct Buffer<'a> {
    inputs: &'a [&'a [f32]],
    outputs: &'a mut [&'a mut [f32]],
    num_samples: usize,
}

impl<'a> Buffer<'a> {
    /// Wrap channel slices. Every slice must hold at least `num_samples` samples.
    pub fn new(inputs: &'a [&'a [f32]], outputs: &'a mut [&'a mut [f32]], num_samples: usize) -> Self {
        Self {
            inputs,
            outputs,
            num_samples,
        }
    }

    /// Number of samples in this block.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of input channels.
    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output channels.
    #[inline]
    pub fn num_output_channels(&self) -> usize {
        self.outputs.len()
    }

    /// An input channel's samples, or an empty slice if the channel doesn't exist.
    #[inline]
    pub fn input(&self, channel: usize) -> &[f32] {
        self.inputs
            .get(channel)
            .map(|c| &c[..self.num_samples])
            .unwrap_or(&[])
    }

    /// An output channel's samples, or `None` if the channel doesn't exist.
    #[inline]
    pub fn output(&mut self, channel: usize) -> Option<&mut [f32]> {
        let num_samples = self.num_samples;
        self.outputs.get_mut(channel).map(|c| &mut c[..num_samples])
    }

    /// Copy each input channel to the output channel with the same index.
    ///
    /// Output channels without a matching input are silenced.
    pub fn copy_through(&mut self) {
        let n = self.num_samples;
        for (ch, output) in self.outputs.iter_mut().enumerate() {
            match self.inputs.get(ch) {
                Some(input) => output[..n].copy_from_slice(&input[..n]),
                None => output[..n].fill(0.0),
            }
        }
    }

    /// Silence all output channels.
    pub fn clear_outputs(&mut self) {
        let n = self.num_samples;
        for output in self.outputs.iter_mut() {
            output[..n].fill(0.0);
        }
    }
}

/// A processing unit hosted by a format wrapper.
///
/// # Thread Safety
///
/// `process` runs on the host's audio thread and must be real-time safe: no
/// allocation, no locks, no blocking calls. Parameter access through the
/// store is lock-free.
pub trait Plugin: Send + 'static {
    /// Create an instance with default state.
    fn create() -> Self
    where
        Self: Sized;

    /// Shared parameter storage. The same `Arc` must be returned on every call.
    fn parameters(&self) -> &Arc<ParameterStore>;

    /// Audio port layout. Defaults to one stereo input and one stereo output.
    fn audio_ports(&self) -> AudioPorts {
        AudioPorts::stereo()
    }

    /// Called before processing starts and whenever sample rate or maximum
    /// block size change.
    fn setup(&mut self, sample_rate: f64, max_block_size: usize) {
        let _ = (sample_rate, max_block_size);
    }

    /// Process one block of audio.
    fn process(&mut self, buffer: &mut Buffer<'_>);

    /// Current value of a parameter, `0.0` for an unknown index.
    fn get_parameter_value(&self, index: ParameterIndex) -> ParameterValue {
        self.parameters().get(index)
    }

    /// Write a parameter. Unknown indices are ignored.
    fn set_parameter_value(&self, index: ParameterIndex, value: ParameterValue) {
        self.parameters().set(index, value);
    }
}
