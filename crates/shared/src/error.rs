use thiserror::Error;

/// Synchronous input rejections. No state is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("page size must be positive, got {0}")]
    NonPositivePageSize(i64),
    #[error("Please fill all fields (missing: {})", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
    #[error("At least one image URL required")]
    NoImages,
}
