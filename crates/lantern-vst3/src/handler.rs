//! Forwarding editor edits to the host's component handler.

use lantern_core::{EditSink, ParameterIndex, ParameterValue};
use parking_lot::Mutex;
use vst3::Steinberg::Vst::{IComponentHandler, IComponentHandlerTrait};
use vst3::Steinberg::FUnknown;
use vst3::ComRef;

struct HandlerPtr(*mut IComponentHandler);

// SAFETY: the host's component handler is callable from the UI thread, which
// is the only thread editing through this sink. The pointer itself is guarded
// by the mutex.
unsafe impl Send for HandlerPtr {}

/// Holds one counted reference to the host's `IComponentHandler`.
///
/// The component shares this sink with every editor it creates, so a handler
/// installed after the editor opened still receives edits.
pub struct ComponentHandlerSink {
    handler: Mutex<HandlerPtr>,
}

impl ComponentHandlerSink {
    pub fn new() -> Self {
        Self {
            handler: Mutex::new(HandlerPtr(std::ptr::null_mut())),
        }
    }

    /// Swap in a new handler (or none), releasing the previous one.
    ///
    /// # Safety
    /// `handler` must be null or a valid COM pointer.
    pub unsafe fn replace(&self, handler: *mut IComponentHandler) {
        // SAFETY: forwarded caller guarantee.
        unsafe { add_ref(handler) };
        let old = std::mem::replace(&mut *self.handler.lock(), HandlerPtr(handler));
        // SAFETY: `old` was add-ref'd when it was installed.
        unsafe { release(old.0) };
    }

    pub fn is_connected(&self) -> bool {
        !self.handler.lock().0.is_null()
    }

    /// Call into the handler without holding the lock, so the host may
    /// re-enter `replace` from inside the callback.
    fn with_handler(&self, f: impl FnOnce(ComRef<'_, IComponentHandler>)) {
        let ptr = {
            let guard = self.handler.lock();
            // SAFETY: the stored pointer is null or holds our reference.
            unsafe { add_ref(guard.0) };
            guard.0
        };
        // SAFETY: the reference taken above keeps the handler alive.
        if let Some(handler) = unsafe { ComRef::from_raw(ptr) } {
            f(handler);
        }
        // SAFETY: balances the `add_ref` above.
        unsafe { release(ptr) };
    }
}

impl Default for ComponentHandlerSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSink for ComponentHandlerSink {
    fn begin_edit(&self, index: ParameterIndex) {
        self.with_handler(|handler| {
            // SAFETY: live handler reference.
            unsafe { handler.beginEdit(index) };
        });
    }

    fn perform_edit(&self, index: ParameterIndex, normalized: ParameterValue) {
        self.with_handler(|handler| {
            // SAFETY: live handler reference.
            unsafe { handler.performEdit(index, normalized) };
        });
    }

    fn end_edit(&self, index: ParameterIndex) {
        self.with_handler(|handler| {
            // SAFETY: live handler reference.
            unsafe { handler.endEdit(index) };
        });
    }
}

impl Drop for ComponentHandlerSink {
    fn drop(&mut self) {
        let handler = std::mem::replace(self.handler.get_mut(), HandlerPtr(std::ptr::null_mut()));
        // SAFETY: the stored pointer was add-ref'd in `replace`.
        unsafe { release(handler.0) };
    }
}

/// # Safety
/// `ptr` must be null or a valid COM pointer.
pub(crate) unsafe fn add_ref<I>(ptr: *mut I) {
    if !ptr.is_null() {
        let unknown = ptr as *mut FUnknown;
        // SAFETY: every VST3 interface starts with the FUnknown vtable.
        unsafe { ((*(*unknown).vtbl).addRef)(unknown) };
    }
}

/// # Safety
/// `ptr` must be null or a valid COM pointer holding a reference we own.
pub(crate) unsafe fn release<I>(ptr: *mut I) {
    if !ptr.is_null() {
        let unknown = ptr as *mut FUnknown;
        // SAFETY: every VST3 interface starts with the FUnknown vtable.
        unsafe { ((*(*unknown).vtbl).release)(unknown) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};
    use vst3::Steinberg::{kResultOk, tresult};
    use vst3::Steinberg::Vst::{ParamID, ParamValue};
    use vst3::{Class, ComWrapper};

    #[derive(Default)]
    struct RecordingHandler {
        calls: StdMutex<Vec<String>>,
    }

    impl Class for RecordingHandler {
        type Interfaces = (IComponentHandler,);
    }

    impl IComponentHandlerTrait for RecordingHandler {
        unsafe fn beginEdit(&self, id: ParamID) -> tresult {
            self.calls.lock().unwrap().push(format!("begin {id}"));
            kResultOk
        }
        unsafe fn performEdit(&self, id: ParamID, value: ParamValue) -> tresult {
            self.calls.lock().unwrap().push(format!("perform {id} {value}"));
            kResultOk
        }
        unsafe fn endEdit(&self, id: ParamID) -> tresult {
            self.calls.lock().unwrap().push(format!("end {id}"));
            kResultOk
        }
        unsafe fn restartComponent(&self, _flags: i32) -> tresult {
            kResultOk
        }
    }

    #[test]
    fn test_edits_reach_handler() {
        let handler = ComWrapper::new(RecordingHandler::default());
        let ptr = handler.as_com_ref::<IComponentHandler>().unwrap().as_ptr();

        let sink = ComponentHandlerSink::new();
        assert!(!sink.is_connected());
        unsafe { sink.replace(ptr) };
        assert!(sink.is_connected());

        sink.begin_edit(1);
        sink.perform_edit(1, 0.25);
        sink.end_edit(1);

        assert_eq!(
            *handler.calls.lock().unwrap(),
            vec!["begin 1", "perform 1 0.25", "end 1"]
        );
    }

    struct ReentrantHandler {
        sink: Arc<ComponentHandlerSink>,
        calls: StdMutex<Vec<String>>,
    }

    impl Class for ReentrantHandler {
        type Interfaces = (IComponentHandler,);
    }

    impl IComponentHandlerTrait for ReentrantHandler {
        unsafe fn beginEdit(&self, id: ParamID) -> tresult {
            // Host tears the handler down from inside the callback.
            unsafe { self.sink.replace(std::ptr::null_mut()) };
            self.calls.lock().unwrap().push(format!("begin {id}"));
            kResultOk
        }
        unsafe fn performEdit(&self, _id: ParamID, _value: ParamValue) -> tresult {
            kResultOk
        }
        unsafe fn endEdit(&self, _id: ParamID) -> tresult {
            kResultOk
        }
        unsafe fn restartComponent(&self, _flags: i32) -> tresult {
            kResultOk
        }
    }

    #[test]
    fn test_handler_may_replace_itself_during_edit() {
        let sink = Arc::new(ComponentHandlerSink::new());
        let handler = ComWrapper::new(ReentrantHandler {
            sink: Arc::clone(&sink),
            calls: StdMutex::new(Vec::new()),
        });
        let ptr = handler.as_com_ref::<IComponentHandler>().unwrap().as_ptr();
        unsafe { sink.replace(ptr) };

        sink.begin_edit(3);
        assert!(!sink.is_connected());
        assert_eq!(*handler.calls.lock().unwrap(), vec!["begin 3"]);

        sink.end_edit(3);
        assert_eq!(handler.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_disconnected_sink_ignores_edits() {
        let handler = ComWrapper::new(RecordingHandler::default());
        let ptr = handler.as_com_ref::<IComponentHandler>().unwrap().as_ptr();

        let sink = ComponentHandlerSink::new();
        unsafe { sink.replace(ptr) };
        unsafe { sink.replace(std::ptr::null_mut()) };
        sink.perform_edit(0, 1.0);

        assert!(handler.calls.lock().unwrap().is_empty());
    }
}
