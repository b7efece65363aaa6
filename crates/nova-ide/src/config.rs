use serde::{Deserialize, Serialize};

/// User-facing settings for the add-type-cast quick fix.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastFixConfig {
    /// Spell classes by the shortest name visible at the insertion point instead of their fully
    /// qualified name. Never adds imports.
    #[serde(default = "default_true")]
    pub shorten_class_references: bool,
    /// `(String) value` rather than `(String)value`.
    #[serde(default = "default_true")]
    pub space_after_type_cast: bool,
    /// `Map<K, V>` rather than `Map<K,V>`.
    #[serde(default = "default_true")]
    pub space_after_comma_in_type_args: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CastFixConfig {
    fn default() -> Self {
        Self {
            shorten_class_references: default_true(),
            space_after_type_cast: default_true(),
            space_after_comma_in_type_args: default_true(),
        }
    }
}
