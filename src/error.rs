/// Crate-level error types for linked-field failures.
///
/// Only genuinely exceptional paths become errors. A field that fails to
/// resolve in a scope is "feature absent", not an error; a response body in
/// an unrecognized shape is "no match", not an error. Both degrade silently
/// by design of the admin form this models.
#[allow(clippy::error_impl_error, reason = "single error type, std convention")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lookup endpoint answered with a non-success HTTP status.
    #[error("lookup returned HTTP {status}")]
    LookupStatus {
        /// The status code the endpoint answered with.
        status: u16,
    },

    /// Transport-level failure reaching the lookup endpoint.
    #[error("lookup transport: {0}")]
    LookupTransport(
        /// The wrapped HTTP client error.
        #[from]
        reqwest::Error,
    ),

    /// An enhancement-layer hook refused a value mutation. The caller falls
    /// back to a plain, non-notifying mutation so the field is never left
    /// in an ambiguous state.
    #[error("widget rejected mutation of `{field}`: {reason}")]
    MutationRejected {
        /// Identifier of the control whose mutation was refused (element id
        /// when present, element name otherwise).
        field: String,
        /// The hook's stated reason.
        reason: String,
    },
}
