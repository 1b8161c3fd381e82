//! Platform-specific render surface implementations.

use crate::error::Result;
use crate::surface::SurfaceFactory;

pub mod headless;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
pub use self::windows::WindowsSurfaceFactory as PlatformSurfaceFactory;

/// The surface factory for the current platform.
pub fn default_factory() -> Result<Box<dyn SurfaceFactory>> {
    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(self::windows::WindowsSurfaceFactory))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(crate::error::WebViewError::PlatformNotSupported)
    }
}

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;
    use crate::error::WebViewError;

    #[test]
    fn test_no_platform_factory() {
        assert!(matches!(default_factory(), Err(WebViewError::PlatformNotSupported)));
    }
}
