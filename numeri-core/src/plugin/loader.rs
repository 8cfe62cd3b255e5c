//! Dynamic loading of plugin shared objects.
//!
//! `dlopen` the file, `dlsym` the factory, call it, register the
//! instance, then `init` with the role-appropriate wiring. `libloading`
//! wraps the `dlopen`/`dlsym` pair portably; everything past that point is
//! safe Rust going through [`crate::plugin::abi::PluginHandle`].
//!
//! A failure at any step is fatal for that one plugin, never for the
//! Kernel: the loader logs and returns an error the caller skips past,
//! continuing on to the next config entry.

use std::path::Path;

use libloading::{Library, Symbol};

use crate::errors::NumeriError;
use crate::plugin::abi::{CreatePluginFn, DestroyPluginFn, PluginHandle};

/// A loaded shared object kept alive for as long as any plugin instance
/// created from it is in use. Dropping this unloads the library; the
/// Kernel holds one per plugin for the process lifetime.
pub struct LoadedLibrary {
    _library: Library,
}

/// Opens `file`, resolves `create_plugin`, and calls it.
///
/// # Safety posture
/// `dlopen`/`dlsym` are inherently unsafe — a malicious or malformed
/// shared object can do anything. This loader trusts the config file:
/// plugin files are operator-supplied, not untrusted input.
pub fn load_plugin(
    name: &str,
    file: impl AsRef<Path>,
) -> Result<(PluginHandle, LoadedLibrary), NumeriError> {
    let file = file.as_ref();
    let library = unsafe { Library::new(file) }.map_err(|e| NumeriError::PluginLoad {
        name: name.to_string(),
        file: file.display().to_string(),
        reason: format!("dlopen failed: {e}"),
    })?;

    let create: Symbol<CreatePluginFn> =
        unsafe { library.get(b"create_plugin\0") }.map_err(|e| NumeriError::PluginLoad {
            name: name.to_string(),
            file: file.display().to_string(),
            reason: format!("symbol 'create_plugin' not found: {e}"),
        })?;

    let destroy: Symbol<DestroyPluginFn> =
        unsafe { library.get(b"destroy_plugin\0") }.map_err(|e| NumeriError::PluginLoad {
            name: name.to_string(),
            file: file.display().to_string(),
            reason: format!("symbol 'destroy_plugin' not found: {e}"),
        })?;
    let destroy: DestroyPluginFn = *destroy;

    let raw = unsafe { create() };
    if raw.is_null() {
        return Err(NumeriError::PluginLoad {
            name: name.to_string(),
            file: file.display().to_string(),
            reason: "create_plugin returned a null pointer".to_string(),
        });
    }

    let handle = unsafe { PluginHandle::from_raw(raw, destroy) };
    Ok((handle, LoadedLibrary { _library: library }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_plugin_load_error() {
        let result = load_plugin("missing", "/nonexistent/path/to/plugin.so");
        assert!(matches!(result, Err(NumeriError::PluginLoad { .. })));
    }
}
