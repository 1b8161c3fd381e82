//! # lantern-vst3
//!
//! VST3 layer for Lantern plugins.
//!
//! - Plugin factory ([`Factory`], `IPluginFactory3`)
//! - Combined component wrapper ([`Vst3Component`])
//! - Web editor view ([`EditorView`])
//! - Module entry points ([`export_vst3!`])
//!
//! ```rust,ignore
//! use lantern_vst3::{export_vst3, Config, Vst3Config};
//!
//! static CONFIG: Config = Config::new("Meter", Category::Effect).with_vendor("Lantern");
//! static VST3_CONFIG: Vst3Config = Vst3Config::new("6E1B3C52-8F0A-4D7B-9C21-5A4F0E7D3B19");
//!
//! export_vst3!(CONFIG, VST3_CONFIG, Meter);
//! ```

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

pub mod export;
pub mod factory;
pub mod handler;
pub mod processor;
pub mod util;
pub mod view;
pub mod wrapper;

pub use factory::{ComponentFactory, Factory};
pub use handler::ComponentHandlerSink;
pub use processor::Vst3Component;
pub use view::EditorView;
pub use wrapper::Vst3Config;

pub use lantern_core::Config;

// Used by `export_vst3!`.
pub use vst3;
