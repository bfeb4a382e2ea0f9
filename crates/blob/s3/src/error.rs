use portrait_blob::BlobError;

/// Classify an S3 SDK error string into the appropriate [`BlobError`].
///
/// The SDK's error types differ per operation, so this inspects the rendered
/// message for common patterns (throttling, timeout, credentials, connection).
pub fn classify_sdk_error(error_str: &str) -> BlobError {
    let lower = error_str.to_lowercase();
    if lower.contains("throttl") || lower.contains("slowdown") || lower.contains("too many") {
        BlobError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        BlobError::Timeout
    } else if lower.contains("accessdenied")
        || lower.contains("access denied")
        || lower.contains("invalidaccesskeyid")
        || lower.contains("signaturedoesnotmatch")
        || lower.contains("credential")
    {
        BlobError::Credentials(error_str.to_owned())
    } else if lower.contains("dispatch failure")
        || lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
    {
        BlobError::Connection(error_str.to_owned())
    } else {
        BlobError::Storage(error_str.to_owned())
    }
}
