//! Shared test utilities for domain testing
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `TestDataBuilder`: deterministic test data generation (always available)
//! - `assertions`: custom assertion helpers (always available)
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore] // Requires Docker
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!
//!     let db = mongo.database(&builder.database_name());
//!     let login = builder.login("alice");
//! }
//! ```

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_movie");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic 24-character hex string, valid as a MongoDB ObjectId.
    pub fn object_id_hex(&self, salt: u32) -> String {
        let mixed = self.seed ^ (u64::from(salt).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        format!("{:016x}{:08x}", mixed, salt)
    }

    /// Unique name for a resource, e.g. `test-group-12345-main`.
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Unique login, so tests sharing a database never collide on the
    /// unique login index.
    pub fn login(&self, base: &str) -> String {
        format!("{}_{}", base, self.seed % 1_000_000)
    }

    /// Per-test database name.
    pub fn database_name(&self) -> String {
        format!("test_{}", self.seed)
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that a slice contains `item` exactly once
    pub fn assert_contains_once<T: PartialEq + std::fmt::Debug>(items: &[T], item: &T, context: &str) {
        let count = items.iter().filter(|i| *i == item).count();
        assert_eq!(
            count, 1,
            "{}: expected {:?} exactly once in {:?}",
            context, item, items
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.object_id_hex(1), builder2.object_id_hex(1));
        assert_eq!(builder1.name("group", "test"), builder2.name("group", "test"));
    }

    #[test]
    fn test_object_id_hex_shape() {
        let builder = TestDataBuilder::from_test_name("shape");
        let hex = builder.object_id_hex(7);

        assert_eq!(hex.len(), 24);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hex, builder.object_id_hex(8));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.login("alice"), builder2.login("alice"));
        assert_ne!(builder1.database_name(), builder2.database_name());
    }

    #[test]
    fn test_assert_contains_once() {
        assertions::assert_contains_once(&[1, 2, 3], &2, "middle");
    }

    #[test]
    #[should_panic(expected = "exactly once")]
    fn test_assert_contains_once_rejects_duplicates() {
        assertions::assert_contains_once(&[2, 2], &2, "dup");
    }
}
