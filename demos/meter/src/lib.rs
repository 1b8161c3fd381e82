//! Lantern Meter - a plugin exposing one output parameter to a web editor.
//!
//! The processing side owns `Param1` (0 to 100). The editor reads it with
//! `hostGetParameter(0)` and follows it through `parameterChanged`. Audio
//! passes through untouched.
//!
//! Debug builds load the editor from the development server; release builds
//! serve `ui/dist`, zipped by the build script and embedded in the binary.

use lantern::prelude::*;

/// The editor packed from `ui/dist`.
pub const UI_ARCHIVE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/ui.zip"));

/// Index of the meter value.
pub const PARAM1: ParameterIndex = 0;

pub static CONFIG: Config = Config::new("Lantern Meter", Category::Effect)
    .with_vendor("Lantern")
    .with_version(env!("CARGO_PKG_VERSION"))
    .with_subcategories(&[Subcategory::Analyzer, Subcategory::Stereo])
    .with_editor(EditorConfig::new(UiSource::select(DEFAULT_DEV_SERVER_URL, UI_ARCHIVE)));

#[cfg(feature = "vst3")]
pub static VST3_CONFIG: Vst3Config = Vst3Config::new("6E1B3C52-8F0A-4D7B-9C21-5A4F0E7D3B19");

pub struct Meter {
    params: Arc<ParameterStore>,
}

impl Plugin for Meter {
    fn create() -> Self {
        let param1 = ParameterInfo::new(PARAM1, "Param1")
            .with_range(0.0, 100.0)
            .with_default(0.0)
            .output();
        Self {
            params: Arc::new(ParameterStore::new(vec![param1])),
        }
    }

    fn parameters(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    fn audio_ports(&self) -> AudioPorts {
        AudioPorts {
            inputs: vec![AudioPort::stereo("Input")],
            outputs: vec![AudioPort::stereo("Output")],
        }
    }

    fn process(&mut self, buffer: &mut Buffer<'_>) {
        buffer.copy_through();
    }
}

#[cfg(feature = "vst3")]
export_vst3!(CONFIG, VST3_CONFIG, Meter);

#[cfg(test)]
mod tests {
    use super::*;
    use lantern::webview::{ArchiveResources, ResourceProvider};

    #[test]
    fn test_param1_declaration() {
        let meter = Meter::create();
        let info = meter.parameters().info(PARAM1).unwrap();
        assert_eq!(info.name, "Param1");
        assert_eq!((info.min, info.max, info.default), (0.0, 100.0, 0.0));
        assert!(info.is_output());
        assert_eq!(meter.get_parameter_value(PARAM1), 0.0);
    }

    #[test]
    fn test_host_value_round_trip() {
        let meter = Meter::create();
        meter.set_parameter_value(PARAM1, 42.0);
        assert_eq!(meter.get_parameter_value(PARAM1), 42.0);
        assert_eq!(meter.get_parameter_value(7), 0.0);
    }

    #[test]
    fn test_process_passes_audio_through() {
        let mut meter = Meter::create();
        let left = [0.25f32, -0.5, 1.0];
        let right = [0.0f32, 0.75, -1.0];
        let inputs: [&[f32]; 2] = [&left, &right];
        let mut out_left = [0.0f32; 3];
        let mut out_right = [0.0f32; 3];
        let mut outputs: [&mut [f32]; 2] = [&mut out_left, &mut out_right];

        meter.process(&mut Buffer::new(&inputs, &mut outputs, 3));
        assert_eq!(out_left, left);
        assert_eq!(out_right, right);
    }

    #[test]
    fn test_stereo_ports() {
        let ports = Meter::create().audio_ports();
        assert_eq!(ports.total_input_channels(), 2);
        assert_eq!(ports.total_output_channels(), 2);
        assert!(ports.validate().is_ok());
    }

    #[test]
    fn test_embedded_editor_archive() {
        let archive = ArchiveResources::from_bytes(UI_ARCHIVE).unwrap();
        let index = archive.resolve("index.html").unwrap();
        assert_eq!(index.mime_type, "text/html");
        assert!(std::str::from_utf8(index.data).unwrap().contains("assets/meter.js"));

        let script = archive.resolve("assets/meter.js").unwrap();
        assert_eq!(script.mime_type, "text/javascript");
        assert!(std::str::from_utf8(script.data).unwrap().contains("hostGetParameter"));
        assert!(archive.resolve("missing.js").is_none());
    }
}
