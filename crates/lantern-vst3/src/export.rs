//! VST3 entry points.

/// Generate the VST3 module entry points for a plugin.
///
/// Expands to the platform-specific module entry/exit functions and
/// `GetPluginFactory`, which hands the host a [`Factory`](crate::Factory)
/// creating [`Vst3Component`](crate::Vst3Component)s of `$plugin`.
///
/// * `$config` - a `static` [`Config`](crate::Config)
/// * `$vst3_config` - a `static` [`Vst3Config`](crate::Vst3Config)
/// * `$plugin` - the type implementing [`Plugin`](lantern_core::Plugin)
///
/// ```rust,ignore
/// static CONFIG: Config = Config::new("Meter", Category::Effect);
/// static VST3_CONFIG: Vst3Config = Vst3Config::new("6E1B3C52-8F0A-4D7B-9C21-5A4F0E7D3B19");
///
/// export_vst3!(CONFIG, VST3_CONFIG, Meter);
/// ```
#[macro_export]
macro_rules! export_vst3 {
    ($config:expr, $vst3_config:expr, $plugin:ty) => {
        #[cfg(target_os = "windows")]
        #[no_mangle]
        extern "system" fn InitDll() -> bool {
            true
        }

        #[cfg(target_os = "windows")]
        #[no_mangle]
        extern "system" fn ExitDll() -> bool {
            true
        }

        // Lowercase names are required on macOS.
        #[cfg(target_os = "macos")]
        #[no_mangle]
        extern "system" fn bundleEntry(_bundle_ref: *mut ::std::ffi::c_void) -> bool {
            true
        }

        #[cfg(target_os = "macos")]
        #[no_mangle]
        extern "system" fn bundleExit() -> bool {
            true
        }

        #[cfg(target_os = "linux")]
        #[no_mangle]
        extern "system" fn ModuleEntry(_library_handle: *mut ::std::ffi::c_void) -> bool {
            true
        }

        #[cfg(target_os = "linux")]
        #[no_mangle]
        extern "system" fn ModuleExit() -> bool {
            true
        }

        #[no_mangle]
        extern "system" fn GetPluginFactory() -> *mut ::std::ffi::c_void {
            use $crate::vst3::ComWrapper;

            let factory =
                $crate::Factory::<$crate::Vst3Component<$plugin>>::new(&$config, &$vst3_config);
            match ComWrapper::new(factory).to_com_ptr::<$crate::vst3::Steinberg::IPluginFactory>() {
                Some(ptr) => ptr.into_raw() as *mut ::std::ffi::c_void,
                None => ::std::ptr::null_mut(),
            }
        }
    };
}
