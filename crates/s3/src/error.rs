//! Mapping of SDK failures onto sm-core errors

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use sm_core::Error;

/// Service error codes meaning the key (or bucket) does not exist
const NOT_FOUND_CODES: &[&str] = &["NotFound", "NoSuchKey", "NoSuchBucket"];

/// Service error codes meaning the credentials were rejected
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
];

/// Convert an SDK failure for `key` into a core error
pub(crate) fn map_sdk_error<E>(err: SdkError<E>, key: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();

    tracing::debug!(key = %key, status = ?status, code = ?code, "S3 request failed");
    classify(status, code.as_deref(), key, message)
}

/// Pick an error variant from the HTTP status and S3 error code
pub(crate) fn classify(status: Option<u16>, code: Option<&str>, key: &str, message: String) -> Error {
    if status == Some(404) || code.is_some_and(|c| NOT_FOUND_CODES.contains(&c)) {
        return Error::NotFound(key.to_string());
    }

    if status == Some(403) || code.is_some_and(|c| AUTH_CODES.contains(&c)) {
        return Error::Auth(message);
    }

    Error::Service(message)
}
