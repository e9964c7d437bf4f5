//! Symbol name demangling
//!
//! Produces short function names: parameter lists, return types and Rust
//! hashes are dropped. A name that is not mangled (plain C symbols) comes
//! back unchanged.

use cpp_demangle::{DemangleOptions, Symbol};
use std::borrow::Cow;

/// Demangle `raw`, falling back to the raw name
#[must_use]
pub fn demangle(raw: &str) -> Cow<'_, str> {
    // Rust legacy symbols are valid Itanium too; try the Rust demangler first
    // so the trailing hash is stripped.
    if let Ok(sym) = rustc_demangle::try_demangle(raw) {
        return Cow::Owned(format!("{sym:#}"));
    }

    demangle_itanium(raw).map_or(Cow::Borrowed(raw), Cow::Owned)
}

fn demangle_itanium(raw: &str) -> Option<String> {
    // cpp_demangle also accepts bare type encodings, which would turn a C
    // symbol named `f` into `float`.
    if !raw.starts_with("_Z") {
        return None;
    }
    let symbol = Symbol::new(raw).ok()?;
    let options = DemangleOptions::new().no_params().no_return_type();
    symbol.demangle(&options).ok()
}
