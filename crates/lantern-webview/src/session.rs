//! One open editor: a render surface wired to the parameter store.
//!
//! [`UiSession::open`] builds everything the editor needs in order (content
//! provider, bridge, surface, embedding, initial size). A failure at any step
//! releases what was already built, so a session either exists fully or not
//! at all.

use std::sync::Arc;

use lantern_core::{
    Bridge, EditSink, EditorConfig, ParameterIndex, ParameterStore, ParameterSync,
    ParameterValue, ScriptContext, Size, UiSource,
};
use parking_lot::Mutex;

use crate::error::{Result, WebViewError};
use crate::resources::provider_for;
use crate::surface::{NativeHandle, ParentWindow, RenderSurface, SurfaceEvents, SurfaceFactory, SurfaceOptions};

/// What a session shows and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub source: UiSource,
    pub size: Size,
    pub dev_tools: bool,
}

impl From<&EditorConfig> for SessionConfig {
    fn from(editor: &EditorConfig) -> Self {
        Self {
            source: editor.source,
            size: editor.size,
            dev_tools: editor.dev_tools,
        }
    }
}

/// Surface callbacks for one session.
struct SessionEvents {
    bridge: Bridge,
    sync: Mutex<ParameterSync>,
}

impl SessionEvents {
    fn push_changes<S: ScriptContext + ?Sized>(&self, script: &S) {
        let pending = self.sync.lock().poll(self.bridge.parameters());
        if let Some(pending) = pending {
            script.evaluate_script(&pending);
        }
    }
}

impl SurfaceEvents for SessionEvents {
    fn on_message(&self, script: &dyn ScriptContext, message: &str) {
        if let Some(reply) = self.bridge.handle_message(message) {
            script.evaluate_script(&reply);
        }
    }

    fn on_tick(&self, script: &dyn ScriptContext) {
        self.push_changes(script);
    }

    fn on_loaded(&self, script: &dyn ScriptContext) {
        self.sync.lock().reset();
        self.push_changes(script);
    }
}

/// An open editor.
pub struct UiSession {
    surface: Option<Box<dyn RenderSurface>>,
    events: Arc<SessionEvents>,
}

impl UiSession {
    /// Create a surface, embed it into `parent` and apply the configured size.
    ///
    /// UI edits of input parameters are forwarded to `edit_sink` when given.
    pub fn open(
        factory: &dyn SurfaceFactory,
        parent: ParentWindow,
        config: SessionConfig,
        params: Arc<ParameterStore>,
        edit_sink: Option<Arc<dyn EditSink>>,
    ) -> Result<Self> {
        if parent.is_null() {
            return Err(WebViewError::CreationFailed("null parent window".into()));
        }

        let resources = provider_for(&config.source)?;

        let mut bridge = Bridge::new(Arc::clone(&params));
        if let Some(sink) = edit_sink {
            bridge = bridge.with_edit_sink(sink);
        }
        let events = Arc::new(SessionEvents {
            sync: Mutex::new(ParameterSync::new(params.count())),
            bridge,
        });

        let options = SurfaceOptions {
            resources,
            dev_tools: config.dev_tools,
            size: config.size,
        };
        let mut surface = factory.create(options, Arc::clone(&events) as Arc<dyn SurfaceEvents>)?;

        let placed = surface.embed(parent).and_then(|()| surface.resize(config.size));
        if let Err(err) = placed {
            log::error!("Failed to place editor surface: {err}");
            surface.destroy();
            return Err(err);
        }

        log::debug!("Editor session opened at {}x{}", config.size.width, config.size.height);

        Ok(Self {
            surface: Some(surface),
            events,
        })
    }

    /// Apply a new size. Repeating the current size does nothing.
    ///
    /// A fatal error closes the session before it is returned.
    pub fn size_changed(&mut self, size: Size) -> Result<()> {
        let surface = self.surface.as_mut().ok_or(WebViewError::NotAttached)?;
        if surface.size() == size {
            return Ok(());
        }
        if let Err(err) = surface.resize(size) {
            log::error!("Editor resize to {}x{} failed: {err}", size.width, size.height);
            if err.is_fatal() {
                self.close();
            }
            return Err(err);
        }
        Ok(())
    }

    /// Push a parameter change observed on the UI thread to the page now.
    pub fn parameter_changed(&self, index: ParameterIndex, value: ParameterValue) {
        if let Some(surface) = &self.surface {
            let script = self.events.sync.lock().notify(index, value);
            if let Some(script) = script {
                surface.evaluate_script(&script);
            }
        }
    }

    /// Push store changes to the page. For hosts driving the UI from an
    /// idle callback instead of the surface's own timer.
    pub fn idle(&self) {
        if let Some(surface) = &self.surface {
            self.events.push_changes(&**surface);
        }
    }

    /// The surface's native window, if open.
    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.surface.as_ref().map(|s| s.native_handle())
    }

    /// Current surface size, if open.
    pub fn size(&self) -> Option<Size> {
        self.surface.as_ref().map(|s| s.size())
    }

    /// Whether the surface is still alive.
    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Destroy the surface. Further calls are no-ops.
    pub fn close(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.destroy();
            log::debug!("Editor session closed");
        }
    }
}

impl Drop for UiSession {
    fn drop(&mut self) {
        self.close();
    }
}
