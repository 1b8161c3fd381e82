//! Generic VST3 component wrapping a [`Plugin`].
//!
//! Uses the combined component pattern: one object implements `IComponent`,
//! `IAudioProcessor` and `IEditController`.
//!
//! ```text
//! Plugin (parameters, ports, process)
//!        ↓
//! Vst3Component<P>
//!        ↓
//! IComponent, IAudioProcessor, IEditController
//! ```
//!
//! The host's processing thread only touches the plugin inside `process` and
//! `setupProcessing`. Everything the edit controller needs goes through the
//! shared [`ParameterStore`], so controller calls never alias the plugin.

use std::cell::UnsafeCell;
use std::ffi::{c_char, CStr};
use std::slice;
use std::sync::Arc;

use lantern_core::{
    AudioPort, AudioPorts, Config, EditSink, ParameterStore, Plugin, PortGroup, MAX_CHANNELS,
    MAX_PORTS,
};
use lantern_webview::default_factory;
use vst3::{Class, ComRef, ComWrapper, Steinberg::Vst::*, Steinberg::*};

use crate::factory::ComponentFactory;
use crate::handler::ComponentHandlerSink;
use crate::util::{read_utf16, write_utf16};
use crate::view::EditorView;

const MAX_TOTAL_CHANNELS: usize = MAX_CHANNELS * MAX_PORTS;

/// VST3 component driving any [`Plugin`].
///
/// ```ignore
/// static CONFIG: Config = Config::new("Meter", Category::Effect);
/// static VST3_CONFIG: Vst3Config = Vst3Config::new("6E1B3C52-8F0A-4D7B-9C21-5A4F0E7D3B19");
/// export_vst3!(CONFIG, VST3_CONFIG, Meter);
/// ```
pub struct Vst3Component<P: Plugin> {
    plugin: UnsafeCell<P>,
    params: Arc<ParameterStore>,
    ports: AudioPorts,
    config: &'static Config,
    sample_rate: UnsafeCell<f64>,
    max_block_size: UnsafeCell<usize>,
    /// Last normalized value reported to the host per parameter, NaN until
    /// the first report.
    reported: UnsafeCell<Vec<f64>>,
    handler: Arc<ComponentHandlerSink>,
}

// SAFETY: `P: Send`. The UnsafeCell fields are only touched from the host's
// processing context, which VST3 serializes.
unsafe impl<P: Plugin> Send for Vst3Component<P> {}
// SAFETY: see above; shared state is the atomic parameter store and the
// mutex-guarded handler sink.
unsafe impl<P: Plugin> Sync for Vst3Component<P> {}

impl<P: Plugin> Vst3Component<P> {
    pub fn new(config: &'static Config) -> Self {
        let plugin = P::create();
        let params = Arc::clone(plugin.parameters());
        let ports = plugin.audio_ports();
        if let Err(err) = ports.validate() {
            log::error!("{}: invalid audio port layout: {err}", config.name);
        }
        let reported = vec![f64::NAN; params.count()];

        Self {
            plugin: UnsafeCell::new(plugin),
            params,
            ports,
            config,
            sample_rate: UnsafeCell::new(44100.0),
            max_block_size: UnsafeCell::new(1024),
            reported: UnsafeCell::new(reported),
            handler: Arc::new(ComponentHandlerSink::new()),
        }
    }

    /// Shared parameter store.
    pub fn parameters(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    /// Sample rate from the last `setupProcessing`.
    pub fn sample_rate(&self) -> f64 {
        // SAFETY: plain read of a value only written in setupProcessing.
        unsafe { *self.sample_rate.get() }
    }

    /// Maximum block size from the last `setupProcessing`.
    pub fn max_block_size(&self) -> usize {
        // SAFETY: plain read of a value only written in setupProcessing.
        unsafe { *self.max_block_size.get() }
    }

    /// # Safety
    /// Only from the host's processing context (process, setupProcessing).
    #[inline]
    #[allow(clippy::mut_from_ref)]
    unsafe fn plugin_mut(&self) -> &mut P {
        // SAFETY: forwarded caller guarantee.
        unsafe { &mut *self.plugin.get() }
    }

    fn port(&self, dir: BusDirection, index: i32) -> Option<&AudioPort> {
        let ports = match dir as BusDirections {
            BusDirections_::kInput => &self.ports.inputs,
            BusDirections_::kOutput => &self.ports.outputs,
            _ => return None,
        };
        usize::try_from(index).ok().and_then(|i| ports.get(i))
    }

    /// Apply the last point of each incoming queue.
    ///
    /// # Safety
    /// `changes` must be null or a valid `IParameterChanges`.
    unsafe fn apply_input_changes(&self, changes: *mut IParameterChanges) {
        // SAFETY: forwarded caller guarantee.
        let Some(changes) = (unsafe { ComRef::from_raw(changes) }) else {
            return;
        };
        // SAFETY: live host object for the duration of process().
        let count = unsafe { changes.getParameterCount() };
        for i in 0..count {
            // SAFETY: index within the reported count.
            let Some(queue) = (unsafe { ComRef::from_raw(changes.getParameterData(i)) }) else {
                continue;
            };
            // SAFETY: live host queue.
            let (id, points) = unsafe { (queue.getParameterId(), queue.getPointCount()) };
            if points <= 0 {
                continue;
            }
            let mut offset = 0;
            let mut value = 0.0;
            // SAFETY: out-pointers are valid locals.
            if unsafe { queue.getPoint(points - 1, &mut offset, &mut value) } == kResultOk {
                match self.params.info(id) {
                    Some(info) if !info.is_output() => self.params.set_normalized(id, value),
                    _ => log::debug!("Ignoring host change for parameter {id}"),
                }
            }
        }
    }

    /// Report output parameters whose value changed since the last block.
    ///
    /// # Safety
    /// `changes` must be null or a valid `IParameterChanges`. Processing
    /// context only.
    unsafe fn report_output_changes(&self, changes: *mut IParameterChanges) {
        // SAFETY: forwarded caller guarantee.
        let Some(changes) = (unsafe { ComRef::from_raw(changes) }) else {
            return;
        };
        // SAFETY: processing context only.
        let reported = unsafe { &mut *self.reported.get() };

        for info in self.params.iter().filter(|info| info.is_output()) {
            let value = self.params.get_normalized(info.index);
            let Some(last) = reported.get_mut(info.index as usize) else {
                continue;
            };
            if *last == value {
                continue;
            }
            let mut queue_index = 0;
            // SAFETY: in/out pointers are valid locals.
            let queue = unsafe { changes.addParameterData(&info.index, &mut queue_index) };
            // SAFETY: null or a queue owned by the host for this block.
            if let Some(queue) = unsafe { ComRef::from_raw(queue) } {
                let mut point_index = 0;
                // SAFETY: out-pointer is a valid local.
                if unsafe { queue.addPoint(0, value, &mut point_index) } == kResultOk {
                    *last = value;
                }
            }
        }
    }
}

impl<P: Plugin> ComponentFactory for Vst3Component<P> {
    fn create(config: &'static Config) -> Self {
        Self::new(config)
    }
}

impl<P: Plugin> Class for Vst3Component<P> {
    type Interfaces = (
        IComponent,
        IAudioProcessor,
        IProcessContextRequirements,
        IEditController,
    );
}

// =============================================================================
// IPluginBase
// =============================================================================

impl<P: Plugin> IPluginBaseTrait for Vst3Component<P> {
    unsafe fn initialize(&self, _context: *mut FUnknown) -> tresult {
        kResultOk
    }

    unsafe fn terminate(&self) -> tresult {
        // SAFETY: dropping our handler reference; null is always valid.
        unsafe { self.handler.replace(std::ptr::null_mut()) };
        kResultOk
    }
}

// =============================================================================
// IComponent
// =============================================================================

impl<P: Plugin> IComponentTrait for Vst3Component<P> {
    unsafe fn getControllerClassId(&self, class_id: *mut TUID) -> tresult {
        if class_id.is_null() {
            return kInvalidArgument;
        }
        kNotImplemented
    }

    unsafe fn setIoMode(&self, _mode: IoMode) -> tresult {
        kResultOk
    }

    unsafe fn getBusCount(&self, media_type: MediaType, dir: BusDirection) -> i32 {
        if media_type as MediaTypes != MediaTypes_::kAudio {
            return 0;
        }
        match dir as BusDirections {
            BusDirections_::kInput => self.ports.inputs.len() as i32,
            BusDirections_::kOutput => self.ports.outputs.len() as i32,
            _ => 0,
        }
    }

    unsafe fn getBusInfo(
        &self,
        media_type: MediaType,
        dir: BusDirection,
        index: i32,
        bus: *mut BusInfo,
    ) -> tresult {
        if bus.is_null() || media_type as MediaTypes != MediaTypes_::kAudio {
            return kInvalidArgument;
        }
        let Some(port) = self.port(dir, index) else {
            return kInvalidArgument;
        };

        // SAFETY: non-null and provided by the host for writing.
        let bus = unsafe { &mut *bus };
        bus.mediaType = MediaTypes_::kAudio as MediaType;
        bus.direction = dir;
        bus.channelCount = port.channel_count as i32;
        write_utf16(&mut bus.name, port.name);
        bus.busType = if index == 0 {
            BusTypes_::kMain as BusType
        } else {
            BusTypes_::kAux as BusType
        };
        bus.flags = BusInfo_::BusFlags_::kDefaultActive;
        kResultOk
    }

    unsafe fn getRoutingInfo(
        &self,
        _in_info: *mut RoutingInfo,
        _out_info: *mut RoutingInfo,
    ) -> tresult {
        kNotImplemented
    }

    unsafe fn activateBus(
        &self,
        _media_type: MediaType,
        _dir: BusDirection,
        _index: i32,
        _state: TBool,
    ) -> tresult {
        kResultOk
    }

    unsafe fn setActive(&self, _state: TBool) -> tresult {
        kResultOk
    }

    unsafe fn setState(&self, _state: *mut IBStream) -> tresult {
        kResultOk
    }

    unsafe fn getState(&self, _state: *mut IBStream) -> tresult {
        kResultOk
    }
}

// =============================================================================
// IAudioProcessor
// =============================================================================

impl<P: Plugin> IAudioProcessorTrait for Vst3Component<P> {
    unsafe fn setBusArrangements(
        &self,
        inputs: *mut SpeakerArrangement,
        num_ins: i32,
        outputs: *mut SpeakerArrangement,
        num_outs: i32,
    ) -> tresult {
        if num_ins as usize != self.ports.inputs.len()
            || num_outs as usize != self.ports.outputs.len()
        {
            return kResultFalse;
        }

        for (i, port) in self.ports.inputs.iter().enumerate() {
            // SAFETY: the host passes `num_ins` arrangements.
            if unsafe { *inputs.add(i) } != speaker_arrangement(port) {
                return kResultFalse;
            }
        }
        for (i, port) in self.ports.outputs.iter().enumerate() {
            // SAFETY: the host passes `num_outs` arrangements.
            if unsafe { *outputs.add(i) } != speaker_arrangement(port) {
                return kResultFalse;
            }
        }

        kResultTrue
    }

    unsafe fn getBusArrangement(
        &self,
        dir: BusDirection,
        index: i32,
        arr: *mut SpeakerArrangement,
    ) -> tresult {
        if arr.is_null() {
            return kInvalidArgument;
        }
        match self.port(dir, index) {
            Some(port) => {
                // SAFETY: non-null and provided by the host for writing.
                unsafe { *arr = speaker_arrangement(port) };
                kResultOk
            }
            None => kInvalidArgument,
        }
    }

    unsafe fn canProcessSampleSize(&self, symbolic_sample_size: i32) -> tresult {
        match symbolic_sample_size as SymbolicSampleSizes {
            SymbolicSampleSizes_::kSample32 => kResultOk,
            _ => kNotImplemented,
        }
    }

    unsafe fn getLatencySamples(&self) -> u32 {
        0
    }

    unsafe fn setupProcessing(&self, setup: *mut ProcessSetup) -> tresult {
        if setup.is_null() {
            return kInvalidArgument;
        }

        // SAFETY: non-null and valid for this call.
        let setup = unsafe { &*setup };
        let max_block_size = setup.maxSamplesPerBlock.max(0) as usize;

        // SAFETY: setupProcessing is serialized with process().
        unsafe {
            *self.sample_rate.get() = setup.sampleRate;
            *self.max_block_size.get() = max_block_size;
            self.plugin_mut().setup(setup.sampleRate, max_block_size);
        }

        kResultOk
    }

    unsafe fn setProcessing(&self, _state: TBool) -> tresult {
        kResultOk
    }

    unsafe fn process(&self, data: *mut ProcessData) -> tresult {
        if data.is_null() {
            return kInvalidArgument;
        }

        // SAFETY: non-null and valid for this call.
        let data = unsafe { &*data };

        // SAFETY: host-provided pointer, null when there are no changes.
        unsafe { self.apply_input_changes(data.inputParameterChanges) };

        let num_samples = data.numSamples.max(0) as usize;
        if num_samples > 0 {
            let mut inputs: [&[f32]; MAX_TOTAL_CHANNELS] = [&[]; MAX_TOTAL_CHANNELS];
            let mut outputs: [&mut [f32]; MAX_TOTAL_CHANNELS] = Default::default();
            let mut num_inputs = 0;
            let mut num_outputs = 0;

            // SAFETY: the host guarantees `numInputs` buses, each with
            // `numChannels` buffers of `numSamples` samples.
            unsafe {
                for ptr in channel_pointers(data.inputs, data.numInputs) {
                    if num_inputs < MAX_TOTAL_CHANNELS {
                        inputs[num_inputs] = slice::from_raw_parts(ptr, num_samples);
                        num_inputs += 1;
                    }
                }
                for ptr in channel_pointers(data.outputs, data.numOutputs) {
                    if num_outputs < MAX_TOTAL_CHANNELS {
                        outputs[num_outputs] = slice::from_raw_parts_mut(ptr, num_samples);
                        num_outputs += 1;
                    }
                }
            }

            let mut buffer = lantern_core::Buffer::new(
                &inputs[..num_inputs],
                &mut outputs[..num_outputs],
                num_samples,
            );
            // SAFETY: inside the host's processing context.
            unsafe { self.plugin_mut() }.process(&mut buffer);
        }

        // SAFETY: host-provided pointer, null when the host takes no output.
        unsafe { self.report_output_changes(data.outputParameterChanges) };

        kResultOk
    }

    unsafe fn getTailSamples(&self) -> u32 {
        0
    }
}

impl<P: Plugin> IProcessContextRequirementsTrait for Vst3Component<P> {
    unsafe fn getProcessContextRequirements(&self) -> u32 {
        0
    }
}

// =============================================================================
// IEditController
// =============================================================================

impl<P: Plugin> IEditControllerTrait for Vst3Component<P> {
    unsafe fn setComponentState(&self, _state: *mut IBStream) -> tresult {
        kResultOk
    }

    unsafe fn setState(&self, _state: *mut IBStream) -> tresult {
        kResultOk
    }

    unsafe fn getState(&self, _state: *mut IBStream) -> tresult {
        kResultOk
    }

    unsafe fn getParameterCount(&self) -> i32 {
        self.params.count() as i32
    }

    unsafe fn getParameterInfo(&self, param_index: i32, info: *mut ParameterInfo) -> tresult {
        if info.is_null() || param_index < 0 {
            return kInvalidArgument;
        }
        let Some(param) = self.params.info(param_index as u32) else {
            return kInvalidArgument;
        };

        // SAFETY: non-null and provided by the host for writing.
        let info = unsafe { &mut *info };
        info.id = param.index;
        write_utf16(&mut info.title, param.name);
        write_utf16(&mut info.shortTitle, param.short_name);
        write_utf16(&mut info.units, param.units);
        info.stepCount = 0;
        info.defaultNormalizedValue = param.normalize(param.default);
        info.unitId = 0;

        let mut flags = 0;
        if param.is_output() {
            flags |= ParameterInfo_::ParameterFlags_::kIsReadOnly;
        } else if param.flags.can_automate {
            flags |= ParameterInfo_::ParameterFlags_::kCanAutomate;
        }
        if param.flags.is_hidden {
            flags |= ParameterInfo_::ParameterFlags_::kIsHidden;
        }
        info.flags = flags;
        kResultOk
    }

    unsafe fn getParamStringByValue(
        &self,
        id: u32,
        value_normalized: f64,
        string: *mut String128,
    ) -> tresult {
        if string.is_null() {
            return kInvalidArgument;
        }
        let Some(param) = self.params.info(id) else {
            return kInvalidArgument;
        };

        let display = param.format(param.denormalize(value_normalized));
        // SAFETY: non-null and provided by the host for writing.
        write_utf16(unsafe { &mut *string }, &display);
        kResultOk
    }

    unsafe fn getParamValueByString(
        &self,
        id: u32,
        string: *mut TChar,
        value_normalized: *mut f64,
    ) -> tresult {
        if string.is_null() || value_normalized.is_null() {
            return kInvalidArgument;
        }
        let Some(param) = self.params.info(id) else {
            return kInvalidArgument;
        };

        // SAFETY: the host passes a null-terminated string.
        let text = unsafe { read_utf16(string) };
        match text.as_deref().and_then(|text| param.parse(text)) {
            Some(plain) => {
                // SAFETY: non-null and provided by the host for writing.
                unsafe { *value_normalized = param.normalize(plain) };
                kResultOk
            }
            None => kResultFalse,
        }
    }

    unsafe fn normalizedParamToPlain(&self, id: u32, value_normalized: f64) -> f64 {
        self.params
            .info(id)
            .map_or(0.0, |param| param.denormalize(value_normalized))
    }

    unsafe fn plainParamToNormalized(&self, id: u32, plain_value: f64) -> f64 {
        self.params
            .info(id)
            .map_or(0.0, |param| param.normalize(plain_value))
    }

    unsafe fn getParamNormalized(&self, id: u32) -> f64 {
        self.params.get_normalized(id)
    }

    unsafe fn setParamNormalized(&self, id: u32, value: f64) -> tresult {
        if self.params.info(id).is_none() {
            return kInvalidArgument;
        }
        self.params.set_normalized(id, value);
        kResultOk
    }

    unsafe fn setComponentHandler(&self, handler: *mut IComponentHandler) -> tresult {
        // SAFETY: the host passes null or a valid handler.
        unsafe { self.handler.replace(handler) };
        kResultOk
    }

    unsafe fn createView(&self, name: *const c_char) -> *mut IPlugView {
        if name.is_null() {
            return std::ptr::null_mut();
        }
        // SAFETY: non-null, null-terminated view type from the host.
        if unsafe { CStr::from_ptr(name) }.to_bytes() != b"editor" {
            return std::ptr::null_mut();
        }
        let Some(editor) = self.config.editor else {
            return std::ptr::null_mut();
        };

        let factory = match default_factory() {
            Ok(factory) => factory,
            Err(err) => {
                log::warn!("{}: no editor on this platform: {err}", self.config.name);
                return std::ptr::null_mut();
            }
        };

        let edits: Arc<dyn EditSink> = Arc::clone(&self.handler) as Arc<dyn EditSink>;
        let view = EditorView::new(factory, editor, Arc::clone(&self.params), edits);
        match ComWrapper::new(view).to_com_ptr::<IPlugView>() {
            Some(ptr) => ptr.into_raw(),
            None => std::ptr::null_mut(),
        }
    }
}

fn speaker_arrangement(port: &AudioPort) -> SpeakerArrangement {
    match (port.group, port.channel_count) {
        (PortGroup::Mono, _) | (_, 1) => SpeakerArr::kMono,
        (PortGroup::Stereo, _) | (_, 2) => SpeakerArr::kStereo,
        (PortGroup::None, n) => 1u64.checked_shl(n as u32).map_or(u64::MAX, |bit| bit - 1),
    }
}

/// Non-null channel buffers of every bus, in bus order.
///
/// # Safety
/// `buses` must be null or point to `count` valid `AudioBusBuffers`.
unsafe fn channel_pointers<'a>(
    buses: *mut AudioBusBuffers,
    count: i32,
) -> impl Iterator<Item = *mut f32> + 'a {
    let buses: &'a [AudioBusBuffers] = if buses.is_null() || count <= 0 {
        &[]
    } else {
        // SAFETY: forwarded caller guarantee.
        unsafe { slice::from_raw_parts(buses, count as usize) }
    };

    buses.iter().flat_map(|bus| {
        let channels = (bus.numChannels.max(0) as usize).min(MAX_CHANNELS);
        // SAFETY: the 32-bit member is the active one for kSample32 processing.
        let ptrs = unsafe { bus.__field0.channelBuffers32 };
        let ptrs: &'a [*mut f32] = if ptrs.is_null() || channels == 0 {
            &[]
        } else {
            // SAFETY: the host provides `numChannels` channel pointers.
            unsafe { slice::from_raw_parts(ptrs, channels) }
        };
        ptrs.iter().copied().filter(|ptr| !ptr.is_null())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use lantern_core::{Buffer, Category, ParameterInfo as Param};

    struct Meter {
        params: Arc<ParameterStore>,
        setup: Option<(f64, usize)>,
    }

    impl Plugin for Meter {
        fn create() -> Self {
            let params = ParameterStore::new(vec![
                Param::new(0, "Level").with_range(0.0, 100.0).output(),
                Param::new(1, "Gain")
                    .with_range(-60.0, 12.0)
                    .with_default(0.0)
                    .with_units("dB"),
            ]);
            Self {
                params: Arc::new(params),
                setup: None,
            }
        }

        fn parameters(&self) -> &Arc<ParameterStore> {
            &self.params
        }

        fn setup(&mut self, sample_rate: f64, max_block_size: usize) {
            self.setup = Some((sample_rate, max_block_size));
        }

        fn process(&mut self, buffer: &mut Buffer<'_>) {
            buffer.copy_through();
            let peak = buffer.input(0).iter().fold(0.0f32, |m, s| m.max(s.abs()));
            self.params.set(0, f64::from(peak) * 100.0);
        }
    }

    static CONFIG: Config = Config::new("Meter", Category::Effect);

    struct Queue {
        id: ParamID,
        points: RefCell<Vec<(i32, f64)>>,
    }

    impl Class for Queue {
        type Interfaces = (IParamValueQueue,);
    }

    impl IParamValueQueueTrait for Queue {
        unsafe fn getParameterId(&self) -> ParamID {
            self.id
        }
        unsafe fn getPointCount(&self) -> i32 {
            self.points.borrow().len() as i32
        }
        unsafe fn getPoint(&self, index: i32, offset: *mut i32, value: *mut f64) -> tresult {
            match self.points.borrow().get(index as usize) {
                Some(&(o, v)) => {
                    *offset = o;
                    *value = v;
                    kResultOk
                }
                None => kInvalidArgument,
            }
        }
        unsafe fn addPoint(&self, offset: i32, value: f64, index: *mut i32) -> tresult {
            let mut points = self.points.borrow_mut();
            *index = points.len() as i32;
            points.push((offset, value));
            kResultOk
        }
    }

    #[derive(Default)]
    struct Changes {
        queues: RefCell<Vec<ComWrapper<Queue>>>,
    }

    impl Changes {
        fn with_point(self, id: ParamID, value: f64) -> Self {
            self.queues.borrow_mut().push(ComWrapper::new(Queue {
                id,
                points: RefCell::new(vec![(0, value)]),
            }));
            self
        }

        fn reported(&self) -> Vec<(ParamID, Vec<f64>)> {
            self.queues
                .borrow()
                .iter()
                .map(|q| (q.id, q.points.borrow().iter().map(|p| p.1).collect()))
                .collect()
        }
    }

    impl Class for Changes {
        type Interfaces = (IParameterChanges,);
    }

    impl IParameterChangesTrait for Changes {
        unsafe fn getParameterCount(&self) -> i32 {
            self.queues.borrow().len() as i32
        }
        unsafe fn getParameterData(&self, index: i32) -> *mut IParamValueQueue {
            self.queues
                .borrow()
                .get(index as usize)
                .and_then(|q| q.as_com_ref::<IParamValueQueue>())
                .map_or(std::ptr::null_mut(), |q| q.as_ptr())
        }
        unsafe fn addParameterData(&self, id: *const ParamID, index: *mut i32) -> *mut IParamValueQueue {
            let mut queues = self.queues.borrow_mut();
            *index = queues.len() as i32;
            queues.push(ComWrapper::new(Queue {
                id: *id,
                points: RefCell::new(Vec::new()),
            }));
            queues
                .last()
                .and_then(|q| q.as_com_ref::<IParamValueQueue>())
                .map_or(std::ptr::null_mut(), |q| q.as_ptr())
        }
    }

    fn changes_ptr(changes: &ComWrapper<Changes>) -> *mut IParameterChanges {
        changes.as_com_ref::<IParameterChanges>().unwrap().as_ptr()
    }

    /// Runs one stereo block of `input` through the component.
    fn run_block(
        component: &Vst3Component<Meter>,
        input: &mut [f32],
        output: &mut [f32],
        input_changes: *mut IParameterChanges,
        output_changes: *mut IParameterChanges,
    ) {
        let mut in_ptrs = [input.as_mut_ptr(), input.as_mut_ptr()];
        let mut out_left = vec![0.0f32; output.len()];
        let mut out_ptrs = [output.as_mut_ptr(), out_left.as_mut_ptr()];

        let mut in_bus: AudioBusBuffers = unsafe { std::mem::zeroed() };
        in_bus.numChannels = 2;
        in_bus.__field0.channelBuffers32 = in_ptrs.as_mut_ptr();
        let mut out_bus: AudioBusBuffers = unsafe { std::mem::zeroed() };
        out_bus.numChannels = 2;
        out_bus.__field0.channelBuffers32 = out_ptrs.as_mut_ptr();

        let mut data: ProcessData = unsafe { std::mem::zeroed() };
        data.numSamples = input.len() as i32;
        data.numInputs = 1;
        data.inputs = &mut in_bus;
        data.numOutputs = 1;
        data.outputs = &mut out_bus;
        data.inputParameterChanges = input_changes;
        data.outputParameterChanges = output_changes;

        assert_eq!(unsafe { component.process(&mut data) }, kResultOk);
    }

    #[test]
    fn test_parameter_info_flags() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        assert_eq!(unsafe { component.getParameterCount() }, 2);

        let mut info: ParameterInfo = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { component.getParameterInfo(0, &mut info) }, kResultOk);
        assert_eq!(info.id, 0);
        assert_ne!(info.flags & ParameterInfo_::ParameterFlags_::kIsReadOnly, 0);
        assert_eq!(info.flags & ParameterInfo_::ParameterFlags_::kCanAutomate, 0);
        assert_eq!(unsafe { read_utf16(info.title.as_ptr()) }.as_deref(), Some("Level"));

        assert_eq!(unsafe { component.getParameterInfo(1, &mut info) }, kResultOk);
        assert_ne!(info.flags & ParameterInfo_::ParameterFlags_::kCanAutomate, 0);
        assert!((info.defaultNormalizedValue - 60.0 / 72.0).abs() < 1e-12);

        assert_eq!(unsafe { component.getParameterInfo(2, &mut info) }, kInvalidArgument);
    }

    #[test]
    fn test_normalized_access_goes_through_store() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        assert_eq!(unsafe { component.setParamNormalized(0, 0.42) }, kResultOk);
        assert!((component.parameters().get(0) - 42.0).abs() < 1e-9);
        assert!((unsafe { component.getParamNormalized(0) } - 0.42).abs() < 1e-12);

        assert_eq!(unsafe { component.setParamNormalized(9, 0.5) }, kInvalidArgument);
        assert_eq!(unsafe { component.normalizedParamToPlain(0, 0.5) }, 50.0);
        assert_eq!(unsafe { component.plainParamToNormalized(0, 25.0) }, 0.25);
    }

    #[test]
    fn test_string_conversion() {
        let component = Vst3Component::<Meter>::new(&CONFIG);

        let mut text: String128 = [0; 128];
        assert_eq!(unsafe { component.getParamStringByValue(1, 1.0, &mut text) }, kResultOk);
        assert_eq!(unsafe { read_utf16(text.as_ptr()) }.as_deref(), Some("12.00 dB"));

        let mut input: Vec<TChar> = "-60 dB".encode_utf16().map(|c| c as TChar).collect();
        input.push(0);
        let mut normalized = -1.0;
        let result = unsafe { component.getParamValueByString(1, input.as_mut_ptr(), &mut normalized) };
        assert_eq!(result, kResultOk);
        assert_eq!(normalized, 0.0);

        let mut junk: Vec<TChar> = "loud".encode_utf16().map(|c| c as TChar).collect();
        junk.push(0);
        let result = unsafe { component.getParamValueByString(1, junk.as_mut_ptr(), &mut normalized) };
        assert_eq!(result, kResultFalse);
    }

    #[test]
    fn test_stereo_buses() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        let audio = MediaTypes_::kAudio as MediaType;
        let input = BusDirections_::kInput as BusDirection;
        let output = BusDirections_::kOutput as BusDirection;

        assert_eq!(unsafe { component.getBusCount(audio, input) }, 1);
        assert_eq!(unsafe { component.getBusCount(audio, output) }, 1);
        assert_eq!(unsafe { component.getBusCount(MediaTypes_::kEvent as MediaType, input) }, 0);

        let mut bus: BusInfo = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { component.getBusInfo(audio, output, 0, &mut bus) }, kResultOk);
        assert_eq!(bus.channelCount, 2);
        assert_eq!(unsafe { component.getBusInfo(audio, output, 1, &mut bus) }, kInvalidArgument);

        let mut arrangement = 0;
        assert_eq!(unsafe { component.getBusArrangement(input, 0, &mut arrangement) }, kResultOk);
        assert_eq!(arrangement, SpeakerArr::kStereo);

        let mut ins = [SpeakerArr::kStereo];
        let mut outs = [SpeakerArr::kMono];
        let result = unsafe { component.setBusArrangements(ins.as_mut_ptr(), 1, outs.as_mut_ptr(), 1) };
        assert_eq!(result, kResultFalse);
        outs[0] = SpeakerArr::kStereo;
        let result = unsafe { component.setBusArrangements(ins.as_mut_ptr(), 1, outs.as_mut_ptr(), 1) };
        assert_eq!(result, kResultTrue);
    }

    #[test]
    fn test_setup_reaches_plugin() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        let mut setup: ProcessSetup = unsafe { std::mem::zeroed() };
        setup.sampleRate = 48000.0;
        setup.maxSamplesPerBlock = 256;
        assert_eq!(unsafe { component.setupProcessing(&mut setup) }, kResultOk);
        assert_eq!(component.sample_rate(), 48000.0);
        assert_eq!(component.max_block_size(), 256);
        assert_eq!(unsafe { (*component.plugin.get()).setup }, Some((48000.0, 256)));
    }

    #[test]
    fn test_process_passes_audio_through() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        let mut input = [0.1f32, -0.5, 0.25, 0.0];
        let mut output = [9.0f32; 4];
        run_block(&component, &mut input, &mut output, std::ptr::null_mut(), std::ptr::null_mut());
        assert_eq!(output, input);
        assert!((component.parameters().get(0) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_process_applies_last_input_point() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        let changes = ComWrapper::new(Changes::default().with_point(1, 0.25));
        changes.queues.borrow()[0].points.borrow_mut().push((2, 1.0));

        let mut input = [0.0f32; 4];
        let mut output = [0.0f32; 4];
        run_block(&component, &mut input, &mut output, changes_ptr(&changes), std::ptr::null_mut());
        assert_eq!(component.parameters().get(1), 12.0);
    }

    #[test]
    fn test_host_cannot_write_output_parameters() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        let changes = ComWrapper::new(Changes::default().with_point(0, 1.0));
        let mut input = [0.0f32; 4];
        let mut output = [0.0f32; 4];
        run_block(&component, &mut input, &mut output, changes_ptr(&changes), std::ptr::null_mut());
        assert_eq!(component.parameters().get(0), 0.0);
    }

    #[test]
    fn test_output_changes_reported_once() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        let mut input = [0.5f32; 4];
        let mut output = [0.0f32; 4];

        let first = ComWrapper::new(Changes::default());
        run_block(&component, &mut input, &mut output, std::ptr::null_mut(), changes_ptr(&first));
        assert_eq!(first.reported(), vec![(0, vec![0.5])]);

        let second = ComWrapper::new(Changes::default());
        run_block(&component, &mut input, &mut output, std::ptr::null_mut(), changes_ptr(&second));
        assert!(second.reported().is_empty());

        let mut louder = [1.0f32; 4];
        let third = ComWrapper::new(Changes::default());
        run_block(&component, &mut louder, &mut output, std::ptr::null_mut(), changes_ptr(&third));
        assert_eq!(third.reported(), vec![(0, vec![1.0])]);
    }

    #[test]
    fn test_create_view_requires_editor_name() {
        let component = Vst3Component::<Meter>::new(&CONFIG);
        assert!(unsafe { component.createView(c"other".as_ptr()) }.is_null());
        assert!(unsafe { component.createView(std::ptr::null()) }.is_null());
        // No editor configured.
        assert!(unsafe { component.createView(c"editor".as_ptr()) }.is_null());
    }
}
