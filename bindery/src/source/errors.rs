//! Errors that can happen when converting raw values.
use crate::language::Ty;

/// The error returned by [`SourceValue::convert_to`] when a raw value cannot
/// be converted into the target type.
///
/// [`SourceValue::convert_to`]: super::SourceValue::convert_to
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConversionError {
    /// The raw value is not parseable as the expected scalar type.
    #[error("`{value}` cannot be parsed as a `{expected}`")]
    Parse {
        /// The raw value from the source.
        value: String,
        /// The expected scalar type.
        expected: &'static str,
    },
    /// The target is not a scalar type; raw-value conversion stops at
    /// scalars, anything richer goes through a binder.
    #[error("a raw value cannot be converted to `{ty:?}`")]
    UnsupportedTarget { ty: Ty },
}
