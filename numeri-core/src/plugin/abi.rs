//! The stable C ABI crossed by every dynamically loaded plugin.
//!
//! An explicit `#[repr(C)]` struct of function pointers plus an opaque
//! state pointer, which survives across a `dlopen` boundary without
//! relying on any target language's vtable layout or name mangling.

use std::ffi::{c_char, c_void, CStr, CString};
use std::os::raw::c_int;

use crate::errors::NumeriError;
use crate::plugin::{Plugin, PluginConfig};

/// Opaque plugin state. The host never dereferences this; it is only ever
/// passed back into the vtable's function pointers.
#[repr(C)]
pub struct PluginState {
    _private: [u8; 0],
}

/// The function-pointer table every plugin shared object exposes through
/// its `create_plugin` factory. Every function takes the opaque state
/// pointer as its first argument, mirroring a C++ vtable's implicit
/// `this`.
#[repr(C)]
pub struct PluginVTable {
    pub name: unsafe extern "C" fn(*mut PluginState) -> *const c_char,
    pub init: unsafe extern "C" fn(*mut PluginState, *mut c_void) -> c_int,
    pub execute: unsafe extern "C" fn(*mut PluginState),
    pub stop: unsafe extern "C" fn(*mut PluginState),
    pub destroy: unsafe extern "C" fn(*mut PluginState),
}

/// Signature of the `create_plugin` symbol every plugin shared object
/// exports.
pub type CreatePluginFn = unsafe extern "C" fn() -> *mut RawPlugin;
/// Signature of the `destroy_plugin` symbol.
pub type DestroyPluginFn = unsafe extern "C" fn(*mut RawPlugin);

/// What `create_plugin` actually returns: a state pointer paired with its
/// vtable, boxed together so the host has one pointer to carry around.
#[repr(C)]
pub struct RawPlugin {
    pub state: *mut PluginState,
    pub vtable: PluginVTable,
}

/// A safe host-side wrapper around a loaded plugin's raw ABI pointer.
///
/// Every method here forwards through the vtable; none of it unwinds —
/// `execute`/`init`/`stop` on the plugin side are caught at the
/// `export_plugin!`-generated shim and turned into a logged error or a
/// non-zero status code before they would cross back into the host.
pub struct PluginHandle {
    raw: *mut RawPlugin,
    name: String,
    destroy: DestroyPluginFn,
}

// SAFETY: a plugin's `execute` runs on a single dedicated thread; `stop`
// is documented as callable from any thread and the plugin side is
// required to make it idempotent and safe for concurrent use. The handle
// itself carries no other mutable state the host touches from multiple
// threads at once.
unsafe impl Send for PluginHandle {}
unsafe impl Sync for PluginHandle {}

impl PluginHandle {
    /// Wraps a raw plugin pointer obtained from a `create_plugin` symbol,
    /// paired with the `destroy_plugin` symbol resolved from the same
    /// shared object.
    ///
    /// # Safety
    /// `raw` must have been produced by a `create_plugin` export generated
    /// by [`crate::export_plugin!`] (or an ABI-compatible equivalent),
    /// `destroy` must be the matching `destroy_plugin` export from that
    /// same shared object, and `raw` must not be used again once this
    /// `PluginHandle` is dropped.
    pub unsafe fn from_raw(raw: *mut RawPlugin, destroy: DestroyPluginFn) -> Self {
        let name_ptr = ((*raw).vtable.name)((*raw).state);
        let name = if name_ptr.is_null() {
            String::from("<unnamed plugin>")
        } else {
            CStr::from_ptr(name_ptr).to_string_lossy().into_owned()
        };
        Self { raw, name, destroy }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls `init` through the vtable. `config` is boxed and passed as an
    /// opaque `*mut c_void`; the generated shim on the plugin side
    /// downcasts it back to [`PluginConfig`] and takes ownership.
    pub fn init(&self, config: PluginConfig) -> Result<(), NumeriError> {
        let boxed = Box::into_raw(Box::new(config)) as *mut c_void;
        let status = unsafe { ((*self.raw).vtable.init)((*self.raw).state, boxed) };
        if status == 0 {
            Ok(())
        } else {
            Err(NumeriError::PluginInit {
                name: self.name.clone(),
                reason: format!("init returned non-zero status {status}"),
            })
        }
    }

    pub fn execute(&self) {
        unsafe { ((*self.raw).vtable.execute)((*self.raw).state) }
    }

    pub fn stop(&self) {
        unsafe { ((*self.raw).vtable.stop)((*self.raw).state) }
    }
}

impl Drop for PluginHandle {
    fn drop(&mut self) {
        // Go through the shared object's exported `destroy_plugin` symbol
        // rather than reaching into the vtable directly, so any teardown
        // logic a plugin author put in that export actually runs.
        unsafe {
            (self.destroy)(self.raw);
        }
    }
}

/// Boxes a C string for `PluginVTable::name` to hand back; leaked
/// intentionally for the process lifetime (a plugin's name is a `'static`
/// string literal in every realistic implementation).
pub fn leak_c_name(name: &str) -> *const c_char {
    CString::new(name)
        .unwrap_or_else(|_| CString::new("<invalid-name>").unwrap())
        .into_raw()
}

/// Expands a type implementing [`crate::plugin::Plugin`] into the two
/// `extern "C"` symbols a plugin shared object must export
/// (`create_plugin`/`destroy_plugin`), plus the vtable glue. This is
/// the only place an individual plugin crate touches `unsafe`.
#[macro_export]
macro_rules! export_plugin {
    ($plugin_ty:ty) => {
        #[no_mangle]
        pub unsafe extern "C" fn create_plugin() -> *mut $crate::plugin::abi::RawPlugin {
            let plugin: Box<dyn $crate::plugin::Plugin> = Box::new(<$plugin_ty>::default());
            let state = Box::into_raw(Box::new(plugin)) as *mut $crate::plugin::abi::PluginState;

            unsafe extern "C" fn name_trampoline(
                state: *mut $crate::plugin::abi::PluginState,
            ) -> *const std::os::raw::c_char {
                let plugin = &*(state as *mut Box<dyn $crate::plugin::Plugin>);
                $crate::plugin::abi::leak_c_name(plugin.name())
            }

            unsafe extern "C" fn init_trampoline(
                state: *mut $crate::plugin::abi::PluginState,
                config: *mut std::ffi::c_void,
            ) -> std::os::raw::c_int {
                let plugin = &mut *(state as *mut Box<dyn $crate::plugin::Plugin>);
                let config = *Box::from_raw(config as *mut $crate::plugin::PluginConfig);
                let result =
                    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| plugin.init(config)));
                match result {
                    Ok(Ok(())) => 0,
                    Ok(Err(_)) => 1,
                    Err(_) => 2,
                }
            }

            unsafe extern "C" fn execute_trampoline(state: *mut $crate::plugin::abi::PluginState) {
                let plugin = &mut *(state as *mut Box<dyn $crate::plugin::Plugin>);
                let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    plugin.execute();
                }));
            }

            unsafe extern "C" fn stop_trampoline(state: *mut $crate::plugin::abi::PluginState) {
                let plugin = &*(state as *mut Box<dyn $crate::plugin::Plugin>);
                let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    plugin.stop();
                }));
            }

            unsafe extern "C" fn destroy_trampoline(state: *mut $crate::plugin::abi::PluginState) {
                drop(Box::from_raw(
                    state as *mut Box<dyn $crate::plugin::Plugin>,
                ));
            }

            Box::into_raw(Box::new($crate::plugin::abi::RawPlugin {
                state,
                vtable: $crate::plugin::abi::PluginVTable {
                    name: name_trampoline,
                    init: init_trampoline,
                    execute: execute_trampoline,
                    stop: stop_trampoline,
                    destroy: destroy_trampoline,
                },
            }))
        }

        #[no_mangle]
        pub unsafe extern "C" fn destroy_plugin(plugin: *mut $crate::plugin::abi::RawPlugin) {
            if plugin.is_null() {
                return;
            }
            let boxed = Box::from_raw(plugin);
            ((boxed.vtable.destroy)(boxed.state));
        }
    };
}
