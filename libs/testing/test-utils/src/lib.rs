//! Shared test utilities for domain testing
//!
//! - `TestDataBuilder`: deterministic test data generation (always available)
//! - `assertions`: custom assertion helpers (always available)
//! - `TestDatabase`: PostgreSQL container with migrations applied
//!   (feature: "postgres"; needs a Docker daemon, so the default test suites
//!   stick to the in-memory repositories and only opt in explicitly)
//!
//! # Usage
//!
//! ```rust
//! use test_utils::TestDataBuilder;
//!
//! let builder = TestDataBuilder::from_test_name("my_test");
//! let user_id = builder.user_id();
//! let email = builder.email("alice");
//! let name = builder.name("project", "main");
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// Seeded from the test name, so reruns produce identical data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with an explicit seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from the name's hash)
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a deterministic user ID for this seed
    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// let name = builder.name("project", "main");
    /// // e.g. "test-project-12345-main"
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Generate a unique email for testing
    pub fn email(&self, local_part: &str) -> String {
        format!("{}-{}@test.example.com", local_part, self.seed)
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    /// Assert that two UUIDs are equal with a contextual error message
    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some, returning the inner value
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.user_id(), builder2.user_id());
        assert_eq!(builder1.email("alice"), builder2.email("alice"));
        assert_eq!(
            builder1.name("project", "test"),
            builder2.name("project", "test")
        );
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.user_id(), builder2.user_id());
    }
}
