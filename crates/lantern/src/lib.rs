//! # Lantern
//!
//! Audio plugins with a web editor.
//!
//! A plugin declares its parameters in a [`ParameterStore`](core::ParameterStore)
//! shared by the audio thread, the host and the editor. The editor is a web
//! page rendered in an embedded engine; it reads and writes parameters through
//! `hostGetParameter`/`hostSetParameter` and receives changes in
//! `parameterChanged(index, value)`.
//!
//! ```text
//! Plugin (parameters, ports, process)
//!        ↓
//! Vst3Component<P> ── EditorView ── UiSession ── render surface
//!        ↓
//! VST3 COM interfaces
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lantern::prelude::*;
//!
//! struct Meter { params: Arc<ParameterStore> }
//!
//! impl Plugin for Meter {
//!     fn create() -> Self {
//!         let level = ParameterInfo::new(0, "Level").with_range(0.0, 100.0).output();
//!         Self { params: Arc::new(ParameterStore::new(vec![level])) }
//!     }
//!     fn parameters(&self) -> &Arc<ParameterStore> { &self.params }
//!     fn process(&mut self, buffer: &mut Buffer) { buffer.copy_through(); }
//! }
//!
//! static CONFIG: Config = Config::new("Meter", Category::Effect)
//!     .with_editor(EditorConfig::new(UiSource::DevServer(DEFAULT_DEV_SERVER_URL)));
//! static VST3_CONFIG: Vst3Config = Vst3Config::new("6E1B3C52-8F0A-4D7B-9C21-5A4F0E7D3B19");
//! export_vst3!(CONFIG, VST3_CONFIG, Meter);
//! ```

pub use lantern_core as core;
pub use lantern_webview as webview;

#[cfg(feature = "vst3")]
pub use lantern_vst3 as vst3_impl;

/// VST3 items plugins may need without depending on the `vst3` crate.
#[cfg(feature = "vst3")]
pub mod vst3 {
    pub use ::vst3::{uid, Steinberg};
}

/// Everything needed to build a plugin.
///
/// ```rust,ignore
/// use lantern::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    pub use lantern_core::{
        // Processing
        AudioPort, AudioPorts, Buffer, Plugin, PortGroup,
        // Parameters
        ParameterDirection, ParameterFlags, ParameterIndex, ParameterInfo, ParameterStore,
        ParameterValue,
        // Configuration
        Category, Config, EditorConfig, GuiConstraints, Subcategory, UiSource,
        DEFAULT_DEV_SERVER_URL, DEFAULT_EDITOR_SIZE,
        // Geometry
        Rect, Size,
    };

    #[cfg(feature = "vst3")]
    pub use lantern_vst3::{export_vst3, Vst3Component, Vst3Config};
}
