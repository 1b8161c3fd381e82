//! String conversion for VST3 interfaces.
//!
//! VST3 mixes C strings and UTF-16 wide strings in fixed-size buffers.

use std::ffi::c_char;

use vst3::Steinberg::Vst::TChar;

/// Fill `dst` from `units`, leaving room for and writing a zero terminator.
fn fill_terminated<T: Copy + Default>(dst: &mut [T], units: impl IntoIterator<Item = T>) {
    let Some(capacity) = dst.len().checked_sub(1) else {
        return;
    };
    let written = dst
        .iter_mut()
        .zip(units.into_iter().take(capacity))
        .map(|(slot, unit)| *slot = unit)
        .count();
    dst[written] = T::default();
}

/// Write `text` into a fixed C string field.
///
/// Stops at an embedded NUL or when the field is full.
pub fn write_cstr(dst: &mut [c_char], text: &str) {
    fill_terminated(
        dst,
        text.bytes().take_while(|&b| b != 0).map(|b| b as c_char),
    );
}

/// Write `text` into a fixed UTF-16 field, truncating when full.
pub fn write_utf16(dst: &mut [TChar], text: &str) {
    fill_terminated(dst, text.encode_utf16().map(|u| u as TChar));
}

/// Decode a host-supplied, zero-terminated UTF-16 string.
///
/// Returns `None` for a null pointer or invalid UTF-16.
///
/// # Safety
/// `ptr` must be null or point to a zero-terminated wide string.
pub unsafe fn read_utf16(ptr: *const TChar) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let units = (0..)
        // SAFETY: indices stop at the terminator the caller guarantees.
        .map(|i| unsafe { *ptr.add(i) } as u16)
        .take_while(|&u| u != 0);
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}
