//! `IPlugView` backed by a web editor session.
//!
//! The view stays alive between `attached` and `removed` calls; each
//! attachment opens a fresh [`UiSession`] in the host's parent window.

use std::cell::UnsafeCell;
use std::ffi::{c_void, CStr};
use std::sync::Arc;

use lantern_core::{EditSink, EditorConfig, ParameterStore, Size};
use lantern_webview::{ParentWindow, SessionConfig, SurfaceFactory, UiSession};
use vst3::Class;
use vst3::Steinberg::*;

use crate::handler::{add_ref, release};

/// VST3 editor view.
pub struct EditorView {
    factory: Box<dyn SurfaceFactory>,
    editor: EditorConfig,
    params: Arc<ParameterStore>,
    edits: Arc<dyn EditSink>,
    session: UnsafeCell<Option<UiSession>>,
    size: UnsafeCell<Size>,
    frame: UnsafeCell<*mut IPlugFrame>,
}

// SAFETY: VST3 calls IPlugView methods on the UI thread only.
unsafe impl Send for EditorView {}
// SAFETY: VST3 calls IPlugView methods on the UI thread only.
unsafe impl Sync for EditorView {}

impl EditorView {
    pub fn new(
        factory: Box<dyn SurfaceFactory>,
        editor: EditorConfig,
        params: Arc<ParameterStore>,
        edits: Arc<dyn EditSink>,
    ) -> Self {
        Self {
            factory,
            size: UnsafeCell::new(editor.size),
            editor,
            params,
            edits,
            session: UnsafeCell::new(None),
            frame: UnsafeCell::new(std::ptr::null_mut()),
        }
    }

    /// Whether an editor session is open.
    pub fn is_attached(&self) -> bool {
        // SAFETY: UI thread only.
        unsafe { &*self.session.get() }.is_some()
    }

    /// Push store changes to the page outside the surface's own timer.
    pub fn idle(&self) {
        // SAFETY: UI thread only.
        if let Some(session) = unsafe { &*self.session.get() } {
            session.idle();
        }
    }
}

impl Class for EditorView {
    type Interfaces = (IPlugView,);
}

#[allow(non_snake_case)]
impl IPlugViewTrait for EditorView {
    unsafe fn isPlatformTypeSupported(&self, r#type: FIDString) -> tresult {
        if r#type.is_null() {
            return kResultFalse;
        }
        // SAFETY: non-null, null-terminated platform type from the host.
        let platform = unsafe { CStr::from_ptr(r#type) };
        match platform.to_str() {
            Ok(platform) if self.factory.supports_platform(platform) => kResultOk,
            _ => kResultFalse,
        }
    }

    unsafe fn attached(&self, parent: *mut c_void, r#type: FIDString) -> tresult {
        // SAFETY: forwarded host arguments.
        if unsafe { self.isPlatformTypeSupported(r#type) } != kResultOk {
            return kResultFalse;
        }

        // SAFETY: UI thread only.
        let session = unsafe { &mut *self.session.get() };
        if session.is_some() {
            return kResultFalse;
        }

        let config = SessionConfig {
            // SAFETY: UI thread only.
            size: unsafe { *self.size.get() },
            ..SessionConfig::from(&self.editor)
        };
        match UiSession::open(
            &*self.factory,
            ParentWindow(parent),
            config,
            Arc::clone(&self.params),
            Some(Arc::clone(&self.edits)),
        ) {
            Ok(opened) => {
                *session = Some(opened);
                kResultOk
            }
            Err(err) => {
                log::error!("Failed to open editor: {err}");
                kResultFalse
            }
        }
    }

    unsafe fn removed(&self) -> tresult {
        // SAFETY: UI thread only.
        if let Some(mut session) = unsafe { &mut *self.session.get() }.take() {
            session.close();
        }
        kResultOk
    }

    unsafe fn onWheel(&self, _distance: f32) -> tresult {
        kResultFalse
    }

    unsafe fn onKeyDown(&self, _key: char16, _keyCode: int16, _modifiers: int16) -> tresult {
        kResultFalse
    }

    unsafe fn onKeyUp(&self, _key: char16, _keyCode: int16, _modifiers: int16) -> tresult {
        kResultFalse
    }

    unsafe fn getSize(&self, size: *mut ViewRect) -> tresult {
        if size.is_null() {
            return kInvalidArgument;
        }
        // SAFETY: UI thread only.
        let current = unsafe { *self.size.get() };
        // SAFETY: non-null and provided by the host for writing.
        let rect = unsafe { &mut *size };
        rect.left = 0;
        rect.top = 0;
        rect.right = current.width as i32;
        rect.bottom = current.height as i32;
        kResultOk
    }

    unsafe fn onSize(&self, newSize: *mut ViewRect) -> tresult {
        if newSize.is_null() {
            return kInvalidArgument;
        }
        // SAFETY: non-null and valid for this call.
        let rect = unsafe { &*newSize };
        let size = Size::new(
            (rect.right - rect.left).max(0) as u32,
            (rect.bottom - rect.top).max(0) as u32,
        );
        // SAFETY: UI thread only.
        unsafe { *self.size.get() = size };

        // SAFETY: UI thread only.
        let slot = unsafe { &mut *self.session.get() };
        let Some(session) = slot.as_mut() else {
            return kResultOk;
        };
        match session.size_changed(size) {
            Ok(()) => kResultOk,
            Err(err) if err.is_fatal() => {
                log::error!("Editor closed after failed resize: {err}");
                *slot = None;
                kInternalError
            }
            Err(err) => {
                log::warn!("Editor resize rejected: {err}");
                kResultFalse
            }
        }
    }

    unsafe fn onFocus(&self, _state: TBool) -> tresult {
        kResultOk
    }

    unsafe fn setFrame(&self, frame: *mut IPlugFrame) -> tresult {
        // SAFETY: UI thread only.
        let slot = unsafe { &mut *self.frame.get() };
        // SAFETY: host-provided pointers; the old one holds our reference.
        unsafe {
            add_ref(frame);
            release(*slot);
        }
        *slot = frame;
        kResultOk
    }

    unsafe fn canResize(&self) -> tresult {
        if self.editor.constraints.resizable {
            kResultOk
        } else {
            kResultFalse
        }
    }

    unsafe fn checkSizeConstraint(&self, rect: *mut ViewRect) -> tresult {
        if rect.is_null() {
            return kInvalidArgument;
        }
        // SAFETY: non-null and provided by the host for writing.
        let rect = unsafe { &mut *rect };
        let requested = Size::new(
            (rect.right - rect.left).max(0) as u32,
            (rect.bottom - rect.top).max(0) as u32,
        );
        let allowed = self.editor.constraints.constrain(requested);
        rect.right = rect.left + allowed.width as i32;
        rect.bottom = rect.top + allowed.height as i32;
        kResultOk
    }
}

impl Drop for EditorView {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.get_mut().take() {
            session.close();
        }
        let frame = std::mem::replace(self.frame.get_mut(), std::ptr::null_mut());
        // SAFETY: the frame reference was taken in setFrame.
        unsafe { release(frame) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use lantern_core::{
        GuiConstraints, ParameterIndex, ParameterInfo, ParameterValue, UiSource,
    };
    use lantern_webview::{HeadlessProbe, HeadlessSurfaceFactory};

    const PARENT: *mut c_void = 0x5150 as *mut c_void;

    #[derive(Default)]
    struct Edits(Mutex<Vec<(ParameterIndex, ParameterValue)>>);

    impl EditSink for Edits {
        fn begin_edit(&self, _index: ParameterIndex) {}
        fn perform_edit(&self, index: ParameterIndex, normalized: ParameterValue) {
            self.0.lock().unwrap().push((index, normalized));
        }
        fn end_edit(&self, _index: ParameterIndex) {}
    }

    fn view(editor: EditorConfig) -> (EditorView, HeadlessProbe, Arc<ParameterStore>, Arc<Edits>) {
        let factory = HeadlessSurfaceFactory::new();
        let probe = factory.probe();
        let params = Arc::new(ParameterStore::new(vec![
            ParameterInfo::new(0, "Param1").with_range(0.0, 100.0).output(),
            ParameterInfo::new(1, "Mix").with_range(0.0, 1.0),
        ]));
        let edits = Arc::new(Edits::default());
        let view = EditorView::new(
            Box::new(factory),
            editor,
            Arc::clone(&params),
            Arc::clone(&edits) as Arc<dyn EditSink>,
        );
        (view, probe, params, edits)
    }

    fn dev_editor() -> EditorConfig {
        EditorConfig::new(UiSource::DevServer("http://localhost:5173")).with_size(800, 600)
    }

    fn rect(width: i32, height: i32) -> ViewRect {
        ViewRect {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }

    #[test]
    fn test_attach_opens_session_in_parent() {
        let (view, probe, _, _) = view(dev_editor());
        assert_eq!(unsafe { view.attached(PARENT, kPlatformTypeHWND) }, kResultOk);
        assert!(view.is_attached());
        assert_eq!(probe.parent(), Some(0x5150));
        assert_eq!(probe.size(), Size::new(800, 600));

        assert_eq!(unsafe { view.attached(PARENT, kPlatformTypeHWND) }, kResultFalse);
        assert_eq!(probe.created(), 1);
    }

    #[test]
    fn test_removed_destroys_surface() {
        let (view, probe, _, _) = view(dev_editor());
        unsafe { view.attached(PARENT, kPlatformTypeHWND) };
        assert_eq!(unsafe { view.removed() }, kResultOk);
        assert!(!view.is_attached());
        assert!(probe.is_destroyed());
    }

    #[test]
    fn test_failed_attach_reports_false() {
        static GARBAGE: &[u8] = b"definitely not a zip";
        let (view, probe, _, _) = view(EditorConfig::new(UiSource::Archive(GARBAGE)));
        assert_eq!(unsafe { view.attached(PARENT, kPlatformTypeHWND) }, kResultFalse);
        assert!(!view.is_attached());
        assert_eq!(probe.created(), 0);
    }

    #[test]
    fn test_size_before_attach_is_used_on_open() {
        let (view, probe, _, _) = view(dev_editor());
        let mut requested = rect(1024, 700);
        assert_eq!(unsafe { view.onSize(&mut requested) }, kResultOk);
        unsafe { view.attached(PARENT, kPlatformTypeHWND) };
        assert_eq!(probe.size(), Size::new(1024, 700));

        let mut reported = rect(0, 0);
        assert_eq!(unsafe { view.getSize(&mut reported) }, kResultOk);
        assert_eq!((reported.right, reported.bottom), (1024, 700));
    }

    #[test]
    fn test_repeated_size_is_idempotent() {
        let (view, probe, _, _) = view(dev_editor());
        unsafe { view.attached(PARENT, kPlatformTypeHWND) };
        let calls = probe.resize_calls();

        let mut same = rect(640, 480);
        assert_eq!(unsafe { view.onSize(&mut same) }, kResultOk);
        assert_eq!(unsafe { view.onSize(&mut same) }, kResultOk);
        assert_eq!(probe.resize_calls(), calls + 1);
        assert_eq!(probe.size(), Size::new(640, 480));
    }

    #[test]
    fn test_geometry_fault_closes_editor() {
        let (view, probe, _, _) = view(dev_editor());
        unsafe { view.attached(PARENT, kPlatformTypeHWND) };
        probe.fail_geometry(true);

        let mut requested = rect(500, 400);
        assert_eq!(unsafe { view.onSize(&mut requested) }, kInternalError);
        assert!(!view.is_attached());
        assert!(probe.is_destroyed());
    }

    #[test]
    fn test_size_constraints() {
        let constraints = GuiConstraints::new(Size::new(400, 300), Size::new(1600, 1200));
        let (view, _, _, _) = view(dev_editor().with_constraints(constraints));
        assert_eq!(unsafe { view.canResize() }, kResultOk);

        let mut small = rect(100, 2000);
        assert_eq!(unsafe { view.checkSizeConstraint(&mut small) }, kResultOk);
        assert_eq!((small.right, small.bottom), (400, 1200));

        let fixed = GuiConstraints::fixed(Size::new(800, 600));
        let (view, _, _, _) = self::view(dev_editor().with_constraints(fixed));
        assert_eq!(unsafe { view.canResize() }, kResultFalse);
    }

    #[test]
    fn test_script_edits_reach_sink() {
        let (view, probe, params, edits) = view(dev_editor());
        unsafe { view.attached(PARENT, kPlatformTypeHWND) };

        probe.post_message(r#"{"type":"invoke","callId":1,"name":"hostSetParameter","args":[1,0.5]}"#);
        probe.post_message(r#"{"type":"invoke","callId":2,"name":"hostSetParameter","args":[0,80]}"#);

        assert_eq!(params.get(1), 0.5);
        assert_eq!(params.get(0), 80.0);
        assert_eq!(*edits.0.lock().unwrap(), vec![(1, 0.5)]);
    }

    #[test]
    fn test_idle_pushes_processing_changes() {
        let (view, probe, params, _) = view(dev_editor());
        unsafe { view.attached(PARENT, kPlatformTypeHWND) };
        view.idle();
        probe.take_scripts();

        params.set(0, 42.0);
        view.idle();
        let scripts = probe.take_scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("parameterChanged(0,42.0)"));
    }
}
