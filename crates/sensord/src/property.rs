//! Property-map parser: the construction-time option grammar from spec §6.
//!
//! Grounded on `original_source/core/parameterparser.cpp`'s
//! `ParameterParser::getPropertyMap`/`applyPropertyMap`: split on
//! `TYPE_SEPARATOR` to find the properties section, split that on
//! `PROP_STRING_SEPARATOR` into individual `name=value` pairs, split each pair
//! on `PROP_NAME_VALUE_SEPARATOR`. A pair with no separator is logged and
//! skipped rather than rejecting the whole string (matches the original's
//! `sensordLogW()` instead of propagating an error).

use std::collections::HashMap;
use tracing::warn;

/// Separates the base sensor id from its property list: `"accel;interval=50"`.
pub const TYPE_SEPARATOR: char = ';';
/// Separates individual `name=value` pairs within the property list.
pub const PROP_STRING_SEPARATOR: char = ',';
/// Separates a property name from its value within one pair.
pub const PROP_NAME_VALUE_SEPARATOR: char = '=';

/// Parses `base-id ';' prop1 '=' val1 ',' prop2 '=' val2 ...` into a
/// name→value map. A string with no `TYPE_SEPARATOR` has no properties and
/// returns an empty map; a malformed pair (missing `=`) is logged at
/// `Warning` and dropped, not treated as a parse failure for the whole
/// string.
pub fn get_property_map(id: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Some(pos) = id.find(TYPE_SEPARATOR) else {
        return map;
    };
    let properties_string = &id[pos + TYPE_SEPARATOR.len_utf8()..];
    for property in properties_string.split(PROP_STRING_SEPARATOR) {
        match property.find(PROP_NAME_VALUE_SEPARATOR) {
            Some(eq) => {
                let name = &property[..eq];
                let value = &property[eq + PROP_NAME_VALUE_SEPARATOR.len_utf8()..];
                map.insert(name.to_string(), value.to_string());
            }
            None => {
                warn!(property, "ignoring malformed property (missing '=')");
            }
        }
    }
    map
}

/// Implemented by any concrete type that can accept a dynamically-named
/// property at construction time. The original dispatches through
/// `QObject::setProperty` (stringly-typed, reflective); this is the typed,
/// closed-set equivalent a Rust target implements directly.
pub trait PropertySettable {
    /// Applies `name=value`. Returns `false` if `name` is not a property this
    /// target recognizes or `value` could not be parsed for it.
    fn set_property(&mut self, name: &str, value: &str) -> bool;
}

/// Applies every entry in `map` to `target` via `PropertySettable::set_property`.
/// Unknown or unsettable properties are silently ignored — the original's
/// `applyPropertyMap` swallows a failed `setProperty` without even logging
/// (its warning path is commented out in the retrieved source), and that
/// behavior is preserved verbatim here.
pub fn apply_property_map(target: &mut dyn PropertySettable, map: &HashMap<String, String>) {
    for (name, value) in map {
        let _ = target.set_property(name, value);
    }
}
