//! Where the render surface gets its content.
//!
//! Two strategies exist. A live provider points the engine at a development
//! server and never serves anything itself. An archive provider serves every
//! request under a virtual origin from an in-memory zip.

use std::sync::Arc;

use lantern_core::UiSource;

use crate::archive::ArchiveResources;
use crate::error::Result;

/// Origin the engine uses for archive-backed content.
pub const VIRTUAL_ORIGIN: &str = "http://lantern.localhost";

/// Request filter matching everything under [`VIRTUAL_ORIGIN`].
pub const VIRTUAL_ORIGIN_FILTER: &str = "http://lantern.localhost/*";

/// One resolved resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource<'a> {
    pub data: &'a [u8],
    pub mime_type: &'static str,
}

/// Resolves content for a render surface.
pub trait ResourceProvider: Send + Sync {
    /// URL the surface navigates to first.
    fn entry_url(&self) -> &str;

    /// Look up an archive-relative path. `None` is answered with a 404.
    fn resolve(&self, path: &str) -> Option<Resource<'_>>;

    /// Whether requests under [`VIRTUAL_ORIGIN`] must be intercepted.
    fn intercepts_requests(&self) -> bool {
        true
    }
}

/// Content served by a running development server.
#[derive(Debug, Clone)]
pub struct LiveResources {
    url: String,
}

impl LiveResources {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ResourceProvider for LiveResources {
    fn entry_url(&self) -> &str {
        &self.url
    }

    fn resolve(&self, _path: &str) -> Option<Resource<'_>> {
        None
    }

    fn intercepts_requests(&self) -> bool {
        false
    }
}

/// Build the provider for a configured content source.
///
/// Archive sources are decompressed here, once.
pub fn provider_for(source: &UiSource) -> Result<Arc<dyn ResourceProvider>> {
    match source {
        UiSource::DevServer(url) => Ok(Arc::new(LiveResources::new(*url))),
        UiSource::Archive(bytes) => Ok(Arc::new(ArchiveResources::from_bytes(bytes)?)),
    }
}

/// Map an engine request URI to an archive path.
///
/// Strips the virtual origin, leading slashes, query and fragment, and
/// percent-decodes the rest. The site root maps to `index.html`. Returns
/// `None` for URIs outside the virtual origin or that decode to invalid UTF-8.
pub fn request_path(uri: &str) -> Option<String> {
    let rest = uri.strip_prefix(VIRTUAL_ORIGIN)?;
    if !(rest.is_empty() || rest.starts_with(['/', '?', '#'])) {
        return None;
    }
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let path = percent_decode(rest[..end].trim_start_matches('/'))?;
    if path.is_empty() {
        Some("index.html".to_string())
    } else {
        Some(path)
    }
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}
