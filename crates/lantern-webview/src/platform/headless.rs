//! A render surface without a window system.
//!
//! The surface records everything done to it (parent, geometry, evaluated
//! scripts) in a shared [`HeadlessProbe`]. The probe also plays the page's
//! part: it posts script messages, fires ticks and load events, and fetches
//! resources the way an engine would. Used to exercise sessions and format
//! wrappers on any platform.

use std::ffi::c_void;
use std::sync::Arc;

use lantern_core::{ScriptContext, Size};
use parking_lot::Mutex;

use crate::error::{Result, WebViewError};
use crate::resources::{request_path, ResourceProvider};
use crate::surface::{
    NativeHandle, ParentWindow, RenderSurface, SurfaceEvents, SurfaceFactory, SurfaceOptions,
};

#[derive(Default)]
struct ProbeState {
    created: usize,
    entry_url: Option<String>,
    dev_tools: bool,
    parent: Option<usize>,
    size: Size,
    resize_calls: usize,
    scripts: Vec<String>,
    destroyed: bool,
    fail_create: bool,
    fail_embed: bool,
    fail_geometry: bool,
    events: Option<Arc<dyn SurfaceEvents>>,
    resources: Option<Arc<dyn ResourceProvider>>,
}

/// Shared view into headless surfaces created by one factory.
///
/// Reflects the most recently created surface.
#[derive(Clone, Default)]
pub struct HeadlessProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl HeadlessProbe {
    /// Number of surfaces created so far.
    pub fn created(&self) -> usize {
        self.state.lock().created
    }

    /// URL the surface navigated to.
    pub fn entry_url(&self) -> Option<String> {
        self.state.lock().entry_url.clone()
    }

    /// Whether developer tools were requested.
    pub fn dev_tools(&self) -> bool {
        self.state.lock().dev_tools
    }

    /// Address of the parent window the surface is embedded in.
    pub fn parent(&self) -> Option<usize> {
        self.state.lock().parent
    }

    /// Last applied size.
    pub fn size(&self) -> Size {
        self.state.lock().size
    }

    /// Number of geometry changes reaching the window system.
    pub fn resize_calls(&self) -> usize {
        self.state.lock().resize_calls
    }

    /// Whether the surface was destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Scripts evaluated so far, oldest first.
    pub fn scripts(&self) -> Vec<String> {
        self.state.lock().scripts.clone()
    }

    /// Drain the evaluated scripts.
    pub fn take_scripts(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().scripts)
    }

    /// Make the next `create` fail.
    pub fn fail_creation(&self, fail: bool) {
        self.state.lock().fail_create = fail;
    }

    /// Make reparenting fail.
    pub fn fail_embedding(&self, fail: bool) {
        self.state.lock().fail_embed = fail;
    }

    /// Make geometry changes fail.
    pub fn fail_geometry(&self, fail: bool) {
        self.state.lock().fail_geometry = fail;
    }

    /// Post a raw message as the page script would.
    pub fn post_message(&self, message: &str) {
        if let Some(events) = self.live_events() {
            events.on_message(self, message);
        }
    }

    /// Fire one display-rate tick.
    pub fn tick(&self) {
        if let Some(events) = self.live_events() {
            events.on_tick(self);
        }
    }

    /// Signal that the entry page finished loading.
    pub fn load(&self) {
        if let Some(events) = self.live_events() {
            events.on_loaded(self);
        }
    }

    /// Fetch a URI through the surface's resource provider.
    ///
    /// Returns the body and content type, or `None` where an engine would
    /// receive a 404.
    pub fn fetch(&self, uri: &str) -> Option<(Vec<u8>, &'static str)> {
        let resources = self.state.lock().resources.clone()?;
        let path = request_path(uri)?;
        resources
            .resolve(&path)
            .map(|resource| (resource.data.to_vec(), resource.mime_type))
    }

    // Events are cloned out so callbacks can evaluate scripts on the probe.
    fn live_events(&self) -> Option<Arc<dyn SurfaceEvents>> {
        let state = self.state.lock();
        if state.destroyed {
            return None;
        }
        state.events.clone()
    }
}

impl ScriptContext for HeadlessProbe {
    fn evaluate_script(&self, script: &str) {
        self.state.lock().scripts.push(script.to_string());
    }
}

/// Factory for [`HeadlessSurface`]s. Accepts any platform type.
#[derive(Clone, Default)]
pub struct HeadlessSurfaceFactory {
    probe: HeadlessProbe,
}

impl HeadlessSurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe observing the surfaces this factory creates.
    pub fn probe(&self) -> HeadlessProbe {
        self.probe.clone()
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn supports_platform(&self, _platform_type: &str) -> bool {
        true
    }

    fn create(
        &self,
        options: SurfaceOptions,
        events: Arc<dyn SurfaceEvents>,
    ) -> Result<Box<dyn RenderSurface>> {
        let mut state = self.probe.state.lock();
        if state.fail_create {
            return Err(WebViewError::CreationFailed("headless creation disabled".into()));
        }
        *state = ProbeState {
            created: state.created + 1,
            entry_url: Some(options.resources.entry_url().to_string()),
            dev_tools: options.dev_tools,
            size: options.size,
            fail_embed: state.fail_embed,
            fail_geometry: state.fail_geometry,
            events: Some(events),
            resources: Some(options.resources),
            ..ProbeState::default()
        };
        drop(state);

        Ok(Box::new(HeadlessSurface {
            probe: self.probe.clone(),
            size: options.size,
            destroyed: false,
        }))
    }
}

/// A surface that only records what happens to it.
pub struct HeadlessSurface {
    probe: HeadlessProbe,
    size: Size,
    destroyed: bool,
}

impl ScriptContext for HeadlessSurface {
    fn evaluate_script(&self, script: &str) {
        if !self.destroyed {
            self.probe.evaluate_script(script);
        }
    }
}

impl RenderSurface for HeadlessSurface {
    fn embed(&mut self, parent: ParentWindow) -> Result<()> {
        let mut state = self.probe.state.lock();
        if state.parent.is_some() {
            return Err(WebViewError::AlreadyAttached);
        }
        if state.fail_embed {
            return Err(WebViewError::CreationFailed("reparenting rejected".into()));
        }
        state.parent = Some(parent.0 as usize);
        Ok(())
    }

    fn resize(&mut self, size: Size) -> Result<()> {
        let mut state = self.probe.state.lock();
        if state.fail_geometry {
            return Err(WebViewError::Geometry(format!(
                "{}x{} rejected",
                size.width, size.height
            )));
        }
        state.resize_calls += 1;
        state.size = size;
        self.size = size;
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn native_handle(&self) -> NativeHandle {
        NativeHandle(Arc::as_ptr(&self.probe.state) as *mut c_void)
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let mut state = self.probe.state.lock();
        state.destroyed = true;
        state.parent = None;
        state.events = None;
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::LiveResources;

    struct Echo;

    impl SurfaceEvents for Echo {
        fn on_message(&self, script: &dyn ScriptContext, message: &str) {
            script.evaluate_script(&format!("echo({message})"));
        }
        fn on_tick(&self, script: &dyn ScriptContext) {
            script.evaluate_script("tick()");
        }
        fn on_loaded(&self, _script: &dyn ScriptContext) {}
    }

    fn options() -> SurfaceOptions {
        SurfaceOptions {
            resources: Arc::new(LiveResources::new("http://localhost:5173")),
            dev_tools: true,
            size: Size::new(800, 600),
        }
    }

    #[test]
    fn test_records_embedding_and_geometry() {
        let factory = HeadlessSurfaceFactory::new();
        let probe = factory.probe();
        let mut surface = factory.create(options(), Arc::new(Echo)).unwrap();

        assert_eq!(probe.entry_url().as_deref(), Some("http://localhost:5173"));
        assert!(probe.dev_tools());

        surface.embed(ParentWindow(0x1000 as *mut c_void)).unwrap();
        assert_eq!(probe.parent(), Some(0x1000));
        assert!(matches!(
            surface.embed(ParentWindow(0x2000 as *mut c_void)),
            Err(WebViewError::AlreadyAttached)
        ));

        surface.resize(Size::new(1024, 768)).unwrap();
        assert_eq!(surface.size(), Size::new(1024, 768));
        assert_eq!(probe.resize_calls(), 1);
    }

    #[test]
    fn test_events_reach_callbacks_until_destroyed() {
        let factory = HeadlessSurfaceFactory::new();
        let probe = factory.probe();
        let mut surface = factory.create(options(), Arc::new(Echo)).unwrap();

        probe.post_message("1");
        probe.tick();
        assert_eq!(probe.take_scripts(), vec!["echo(1)", "tick()"]);

        surface.destroy();
        probe.tick();
        assert!(probe.scripts().is_empty());
        assert!(probe.is_destroyed());
    }

    #[test]
    fn test_geometry_failure_is_fatal() {
        let factory = HeadlessSurfaceFactory::new();
        let probe = factory.probe();
        let mut surface = factory.create(options(), Arc::new(Echo)).unwrap();

        probe.fail_geometry(true);
        let err = surface.resize(Size::new(10, 10)).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(surface.size(), Size::new(800, 600));
    }
}
