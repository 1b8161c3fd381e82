//! WebView GUI support for Lantern audio plugins.
//!
//! Platform-native render surfaces, the content they serve, and the editor
//! session tying a surface to a plugin's parameters.

pub mod archive;
mod error;
pub mod mime;
pub mod platform;
pub mod resources;
pub mod session;
pub mod surface;

pub use archive::ArchiveResources;
pub use error::{Result, WebViewError};
pub use platform::default_factory;
pub use platform::headless::{HeadlessProbe, HeadlessSurfaceFactory};
pub use resources::{
    provider_for, request_path, LiveResources, Resource, ResourceProvider, VIRTUAL_ORIGIN,
};
pub use session::{SessionConfig, UiSession};
pub use surface::{
    NativeHandle, ParentWindow, RenderSurface, SurfaceEvents, SurfaceFactory, SurfaceOptions,
};
