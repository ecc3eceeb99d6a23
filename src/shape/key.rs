//! Cache keys identifying generated rasters.

use std::fmt;

/// Separator between key fields. Canonical path text never contains it.
const FIELD_SEPARATOR: char = '_';

/// Opaque identifier for a generated raster.
///
/// Two keys are equal only if every input that influences pixel output is
/// equal, so a cache may hand back an earlier raster for an equal key instead
/// of rendering again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Starts a key scoped to the given generator tag.
    pub fn builder(tag: &str) -> CacheKeyBuilder {
        CacheKeyBuilder {
            key: tag.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Appends fields to a key in a fixed order.
#[derive(Debug)]
pub struct CacheKeyBuilder {
    key: String,
}

impl CacheKeyBuilder {
    pub fn field(mut self, value: impl fmt::Display) -> Self {
        use fmt::Write;
        self.key.push(FIELD_SEPARATOR);
        let _ = write!(self.key, "{}", value);
        self
    }

    pub fn build(self) -> CacheKey {
        CacheKey(self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_joins_fields_after_tag() {
        let key = CacheKey::builder("path_shape")
            .field("M0,0")
            .field(1.5)
            .field(42u32)
            .build();
        assert_eq!(key.as_str(), "path_shape_M0,0_1.5_42");
        assert_eq!(key.to_string(), key.as_str());
    }

    #[test]
    fn empty_fields_still_take_a_slot() {
        let a = CacheKey::builder("t").field("").field("x").build();
        let b = CacheKey::builder("t").field("x").field("").build();
        assert_ne!(a, b);
    }
}
