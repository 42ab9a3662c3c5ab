//! In-process bridge to the native reader library (`libmunakas`)
//!
//! Every string the library returns is heap-allocated on its side and must
//! be released with the C allocator once copied.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};

use super::{BridgeError, TelemetryBridge, NO_DATA};

mod ffi {
    use super::{c_char, c_void};

    #[link(name = "munakas")]
    extern "C" {
        pub fn init() -> bool;
        pub fn get_player_list_json() -> *mut c_char;
        pub fn get_bomb_state_json() -> *mut c_char;
        pub fn get_map_name_string() -> *mut c_char;
        pub fn cleanup_game_connection();
    }

    extern "C" {
        pub fn free(ptr: *mut c_void);
    }
}

#[derive(Debug, Default)]
pub struct NativeBridge {
    initialized: bool,
}

impl TelemetryBridge for NativeBridge {
    fn init(&mut self) -> Result<(), BridgeError> {
        // SAFETY: no arguments; the library keeps its own process handle
        if unsafe { ffi::init() } {
            self.initialized = true;
            Ok(())
        } else {
            Err(BridgeError::Init("could not attach to the game process".into()))
        }
    }

    fn poll_players(&mut self) -> Vec<u8> {
        // SAFETY: returns a malloc'd NUL-terminated string or null
        unsafe { take_c_string(ffi::get_player_list_json()) }.unwrap_or_else(|| NO_DATA.to_vec())
    }

    fn poll_bomb(&mut self) -> Option<Vec<u8>> {
        // SAFETY: as above
        unsafe { take_c_string(ffi::get_bomb_state_json()) }
    }

    fn current_map(&mut self) -> Option<String> {
        // SAFETY: as above
        unsafe { take_c_string(ffi::get_map_name_string()) }
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
            .filter(|name| !name.is_empty())
    }

    fn cleanup(&mut self) {
        if self.initialized {
            // SAFETY: paired with a successful init
            unsafe { ffi::cleanup_game_connection() };
            self.initialized = false;
            tracing::info!("Native telemetry bridge released");
        }
    }
}

impl Drop for NativeBridge {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Copy out and free a string allocated by the library.
///
/// # Safety
/// `ptr` must be null or a NUL-terminated string from `malloc` that is not
/// used again by the caller.
unsafe fn take_c_string(ptr: *mut c_char) -> Option<Vec<u8>> {
    if ptr.is_null() {
        return None;
    }
    let bytes = CStr::from_ptr(ptr).to_bytes().to_vec();
    ffi::free(ptr.cast::<c_void>());
    Some(bytes)
}
