//! Plugin configuration.
//!
//! A [`Config`] is a `static` built with const-fn builders. It carries host
//! facing metadata and, for plugins with an editor, where the UI comes from.
//!
//! ```ignore
//! pub static CONFIG: Config = Config::new("Meter", Category::Effect)
//!     .with_vendor("Lantern")
//!     .with_subcategories(&[Subcategory::Analyzer])
//!     .with_editor(EditorConfig::new(UiSource::select(DEV_SERVER_URL, ARCHIVE)));
//! ```

use crate::gui::{GuiConstraints, DEFAULT_EDITOR_SIZE};
use crate::types::Size;

/// Address of the development server used by debug builds.
pub const DEFAULT_DEV_SERVER_URL: &str = "http://localhost:5173";

/// Main plugin category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Audio effect.
    Effect,
    /// Virtual instrument.
    Instrument,
    /// Audio generator (test tones, noise).
    Generator,
}

impl Category {
    /// VST3 base category string.
    pub const fn to_vst3_category(&self) -> &'static str {
        match self {
            Category::Effect => "Fx",
            Category::Instrument => "Instrument",
            Category::Generator => "Generator",
        }
    }
}

/// More specific classification shown in host plugin browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcategory {
    /// Scope, FFT display, loudness metering
    Analyzer,
    /// Compressor, gate, limiter
    Dynamics,
    /// Equalization
    Eq,
    /// Utilities
    Tools,
    /// Stereo imaging
    Spatial,
    /// Mono signal path
    Mono,
    /// Stereo signal path
    Stereo,
}

impl Subcategory {
    /// VST3 subcategory string.
    pub const fn to_vst3(&self) -> &'static str {
        match self {
            Subcategory::Analyzer => "Analyzer",
            Subcategory::Dynamics => "Dynamics",
            Subcategory::Eq => "EQ",
            Subcategory::Tools => "Tools",
            Subcategory::Spatial => "Spatial",
            Subcategory::Mono => "Mono",
            Subcategory::Stereo => "Stereo",
        }
    }
}

/// Where the editor's web content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSource {
    /// Load from a running development server.
    DevServer(&'static str),
    /// Serve from a zip archive embedded in the binary.
    Archive(&'static [u8]),
}

impl UiSource {
    /// Development server in debug builds, embedded archive in release builds.
    pub const fn select(dev_server: &'static str, archive: &'static [u8]) -> Self {
        if cfg!(debug_assertions) {
            UiSource::DevServer(dev_server)
        } else {
            UiSource::Archive(archive)
        }
    }

    /// Whether content is loaded from a live server.
    pub const fn is_live(&self) -> bool {
        matches!(self, UiSource::DevServer(_))
    }
}

/// Editor window settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Content source.
    pub source: UiSource,
    /// Initial size in pixels.
    pub size: Size,
    /// Resize limits.
    pub constraints: GuiConstraints,
    /// Enable the engine's developer tools.
    pub dev_tools: bool,
}

impl EditorConfig {
    /// Editor at the default size. Developer tools follow the build profile.
    pub const fn new(source: UiSource) -> Self {
        Self {
            source,
            size: DEFAULT_EDITOR_SIZE,
            constraints: GuiConstraints::new(Size::new(400, 300), Size::new(3840, 2160)),
            dev_tools: cfg!(debug_assertions),
        }
    }

    /// Set the initial size.
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Set the resize limits.
    pub const fn with_constraints(mut self, constraints: GuiConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Force developer tools on or off.
    pub const fn with_dev_tools(mut self, enabled: bool) -> Self {
        self.dev_tools = enabled;
        self
    }
}

/// Plugin metadata.
#[derive(Debug, Clone)]
pub struct Config {
    /// Plugin name displayed in the DAW.
    pub name: &'static str,

    /// Main category.
    pub category: Category,

    /// Vendor/company name.
    pub vendor: &'static str,

    /// Vendor URL.
    pub url: &'static str,

    /// Vendor email.
    pub email: &'static str,

    /// Plugin version string.
    pub version: &'static str,

    /// Subcategories appended to the main category.
    pub subcategories: &'static [Subcategory],

    /// Editor settings. `None` for plugins without a UI.
    pub editor: Option<EditorConfig>,
}

impl Config {
    /// Create a configuration with placeholder vendor details and no editor.
    pub const fn new(name: &'static str, category: Category) -> Self {
        Self {
            name,
            category,
            vendor: "Unknown Vendor",
            url: "",
            email: "",
            version: "1.0.0",
            subcategories: &[],
            editor: None,
        }
    }

    /// Set the vendor name.
    pub const fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    /// Set the vendor URL.
    pub const fn with_url(mut self, url: &'static str) -> Self {
        self.url = url;
        self
    }

    /// Set the vendor email.
    pub const fn with_email(mut self, email: &'static str) -> Self {
        self.email = email;
        self
    }

    /// Set the version string.
    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    /// Set subcategories.
    pub const fn with_subcategories(mut self, subcategories: &'static [Subcategory]) -> Self {
        self.subcategories = subcategories;
        self
    }

    /// Attach an editor.
    pub const fn with_editor(mut self, editor: EditorConfig) -> Self {
        self.editor = Some(editor);
        self
    }

    /// Whether the plugin provides an editor.
    pub const fn has_editor(&self) -> bool {
        self.editor.is_some()
    }

    /// VST3 category string, e.g. `"Fx|Analyzer"`.
    pub fn vst3_subcategories(&self) -> String {
        let mut result = String::from(self.category.to_vst3_category());
        for sub in self.subcategories {
            result.push('|');
            result.push_str(sub.to_vst3());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ARCHIVE: &[u8] = b"PK";

    #[test]
    fn test_vst3_subcategories() {
        let config = Config::new("Meter", Category::Effect)
            .with_subcategories(&[Subcategory::Analyzer, Subcategory::Stereo]);
        assert_eq!(config.vst3_subcategories(), "Fx|Analyzer|Stereo");
    }

    #[test]
    fn test_editor_defaults() {
        let editor = EditorConfig::new(UiSource::DevServer(DEFAULT_DEV_SERVER_URL));
        assert_eq!(editor.size, Size::new(1080, 720));
        assert!(editor.source.is_live());
        assert!(editor.constraints.resizable);
    }

    #[test]
    fn test_select_follows_build_profile() {
        let source = UiSource::select(DEFAULT_DEV_SERVER_URL, ARCHIVE);
        if cfg!(debug_assertions) {
            assert_eq!(source, UiSource::DevServer("http://localhost:5173"));
        } else {
            assert_eq!(source, UiSource::Archive(ARCHIVE));
        }
    }

    #[test]
    fn test_config_without_editor() {
        let config = Config::new("Silent", Category::Generator).with_version("0.3.0");
        assert!(!config.has_editor());
        assert_eq!(config.version, "0.3.0");
    }
}
