//! Stable error codes for machine consumption.

/// Every error type exposes a stable string code. Reporter layers key
/// on these rather than on display strings, which are free to change.
pub trait FacetErrorCode {
    fn error_code(&self) -> &'static str;
}
