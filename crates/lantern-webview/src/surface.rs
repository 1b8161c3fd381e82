//! The render surface abstraction.
//!
//! A render surface is a native child window hosting a web engine. It is
//! created detached, embedded into a host-provided parent window, and resized
//! as the host asks. Each platform backend provides a [`SurfaceFactory`].
//!
//! All methods run on the host's UI thread.

use std::ffi::c_void;
use std::sync::Arc;

use lantern_core::{ScriptContext, Size};

use crate::error::Result;
use crate::resources::ResourceProvider;

/// Host-provided parent window (an `HWND` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentWindow(pub *mut c_void);

impl ParentWindow {
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// The surface's own native window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeHandle(pub *mut c_void);

impl NativeHandle {
    pub const fn null() -> Self {
        Self(std::ptr::null_mut())
    }
}

/// Settings for creating a surface.
#[derive(Clone)]
pub struct SurfaceOptions {
    /// Content source.
    pub resources: Arc<dyn ResourceProvider>,
    /// Whether to enable developer tools.
    pub dev_tools: bool,
    /// Initial size in pixels.
    pub size: Size,
}

/// Callbacks from a surface, delivered on the UI thread.
///
/// Each callback receives the surface's script channel so replies can be
/// evaluated immediately.
pub trait SurfaceEvents: Send + Sync {
    /// A raw message posted by the page script.
    fn on_message(&self, script: &dyn ScriptContext, message: &str);

    /// Periodic UI-thread tick at display rate.
    fn on_tick(&self, script: &dyn ScriptContext);

    /// The entry page finished loading.
    fn on_loaded(&self, script: &dyn ScriptContext);
}

/// A web engine hosted in a native window.
pub trait RenderSurface: ScriptContext {
    /// Make the surface a child of `parent`, preserving its size.
    fn embed(&mut self, parent: ParentWindow) -> Result<()>;

    /// Change the surface size. A rejected change is fatal for the surface.
    fn resize(&mut self, size: Size) -> Result<()>;

    /// Current size.
    fn size(&self) -> Size;

    /// The surface's native window.
    fn native_handle(&self) -> NativeHandle;

    /// Release the engine and the native window. Safe to call twice.
    fn destroy(&mut self);
}

/// Creates render surfaces for one platform.
pub trait SurfaceFactory {
    /// Whether this factory can embed into a parent of the given host
    /// platform type (e.g. `"HWND"`).
    fn supports_platform(&self, platform_type: &str) -> bool;

    /// Create a detached surface. The entry URL is loaded immediately.
    fn create(
        &self,
        options: SurfaceOptions,
        events: Arc<dyn SurfaceEvents>,
    ) -> Result<Box<dyn RenderSurface>>;
}
