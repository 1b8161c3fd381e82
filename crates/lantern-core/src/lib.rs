//! # lantern-core
//!
//! Platform-agnostic core of the Lantern plugin framework.
//!
//! - [`ParameterStore`] - lock-free parameter slots shared by audio, host and UI threads
//! - [`Plugin`] - the processing-unit contract format wrappers drive
//! - [`Bridge`] - named native functions callable from the UI script
//! - [`ParameterSync`] - pushes store changes to the UI script at display rate
//! - [`Config`] - plugin metadata and editor source selection

pub mod bridge;
pub mod config;
pub mod gui;
pub mod parameter_info;
pub mod parameter_store;
pub mod parameter_sync;
pub mod plugin;
pub mod ports;
pub mod types;

pub use bridge::{
    parameter_changed_script, BindingError, Bridge, EditSink, ScriptContext, BOOTSTRAP_SCRIPT,
    GET_PARAMETER, PARAMETER_CHANGED, SET_PARAMETER,
};
pub use config::{Category, Config, EditorConfig, Subcategory, UiSource, DEFAULT_DEV_SERVER_URL};
pub use gui::{GuiConstraints, DEFAULT_EDITOR_SIZE};
pub use parameter_info::{ParameterDirection, ParameterFlags, ParameterInfo};
pub use parameter_store::ParameterStore;
pub use parameter_sync::ParameterSync;
pub use plugin::{Buffer, Plugin};
pub use ports::{AudioPort, AudioPorts, PortGroup, PortsError};
pub use types::{ParameterIndex, ParameterValue, Rect, Size, MAX_CHANNELS, MAX_PORTS};
