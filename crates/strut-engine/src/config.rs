//! Engine policy configuration
//!
//! The flags are fixed at engine construction and read-only afterwards.
//! Both polarities of the historically ambiguous flags are explicit here;
//! the chosen defaults are pinned by the config tests.

use serde::Serialize;

/// Policy flags governing coercion and record lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Require the runtime kind to already match the target type.
    /// A numeric string never satisfies `int` while this is on.
    pub strict_type_checking: bool,
    /// Promote a scalar to a single-element container when it coerces
    /// against the element type. Only consulted when strict checking is off.
    pub extended_container_conversion: bool,
    /// Treat the empty string as 0 / 0.0 / false in lenient primitive
    /// coercion.
    pub empty_string_is_zero: bool,
    /// At construction, store the type's zero value for attributes that
    /// have no supplied value and no default.
    pub materialize_defaults_when_missing: bool,
    /// Permit attributes to remain unset after construction instead of
    /// failing with a missing-attribute error.
    pub allow_uninitialized_state: bool,
    /// Reading an unset nullable attribute yields null instead of an
    /// uninitialized-access error.
    pub uninitialized_nullable_reads_as_null: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_type_checking: true,
            extended_container_conversion: false,
            empty_string_is_zero: true,
            materialize_defaults_when_missing: false,
            allow_uninitialized_state: true,
            uninitialized_nullable_reads_as_null: true,
        }
    }
}

impl EngineConfig {
    /// The default, strict configuration
    pub fn strict() -> Self {
        Self::default()
    }

    /// A lenient configuration: implicit conversions on, strictness off
    pub fn lenient() -> Self {
        Self::default().with_strict_type_checking(false)
    }

    /// Set `strict_type_checking`
    pub fn with_strict_type_checking(mut self, on: bool) -> Self {
        self.strict_type_checking = on;
        self
    }

    /// Set `extended_container_conversion`
    pub fn with_extended_container_conversion(mut self, on: bool) -> Self {
        self.extended_container_conversion = on;
        self
    }

    /// Set `empty_string_is_zero`
    pub fn with_empty_string_is_zero(mut self, on: bool) -> Self {
        self.empty_string_is_zero = on;
        self
    }

    /// Set `materialize_defaults_when_missing`
    pub fn with_materialize_defaults_when_missing(mut self, on: bool) -> Self {
        self.materialize_defaults_when_missing = on;
        self
    }

    /// Set `allow_uninitialized_state`
    pub fn with_allow_uninitialized_state(mut self, on: bool) -> Self {
        self.allow_uninitialized_state = on;
        self
    }

    /// Set `uninitialized_nullable_reads_as_null`
    pub fn with_uninitialized_nullable_reads_as_null(mut self, on: bool) -> Self {
        self.uninitialized_nullable_reads_as_null = on;
        self
    }

    /// True when scalar-to-container promotion is actually reachable
    pub(crate) fn container_promotion_enabled(&self) -> bool {
        !self.strict_type_checking && self.extended_container_conversion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_polarity_is_pinned() {
        let config = EngineConfig::default();
        assert!(config.strict_type_checking);
        assert!(!config.extended_container_conversion);
        assert!(config.empty_string_is_zero);
        assert!(!config.materialize_defaults_when_missing);
        assert!(config.allow_uninitialized_state);
        assert!(config.uninitialized_nullable_reads_as_null);
    }

    #[test]
    fn test_promotion_requires_lenient_mode() {
        let strict = EngineConfig::strict().with_extended_container_conversion(true);
        assert!(!strict.container_promotion_enabled());

        let lenient = EngineConfig::lenient().with_extended_container_conversion(true);
        assert!(lenient.container_promotion_enabled());
    }
}
