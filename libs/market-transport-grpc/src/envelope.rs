//! Status envelope contract and the response normalizer.
//!
//! Every RPC response carries a `market.base.v1.Status`. Handlers return a
//! plain `Result`; [`respond`] is the only place that result is translated
//! into the wire envelope, so the RPC framework always sees a successful
//! call whose payload encodes the real outcome.

use std::fmt;

use crate::proto::Status;

/// Message returned to callers for every unclassified failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error, please try it later.";

pub const CODE_OK: i32 = 200;
pub const CODE_INTERNAL: i32 = 500;

impl Status {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            code: CODE_OK,
            error: String::new(),
        }
    }

    #[must_use]
    pub fn new(code: i32, error: impl Into<String>) -> Self {
        Self {
            code,
            error: error.into(),
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::new(CODE_INTERNAL, INTERNAL_ERROR_MESSAGE)
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

/// An error that knows which envelope code it maps to.
///
/// `None` marks the error as unclassified: the normalizer logs it and
/// replaces it with a generic internal error. The `Display` output of a
/// classified error is sent to the caller verbatim.
pub trait CodedError: std::error::Error {
    fn status_code(&self) -> Option<i32>;
}

/// A response message with a `status` envelope field.
///
/// Implemented for generated messages with [`impl_status_envelope!`](crate::impl_status_envelope).
pub trait StatusEnvelope: Default {
    fn status(&self) -> Option<&Status>;
    fn set_status(&mut self, status: Status);
}

/// Implements [`StatusEnvelope`] for prost messages whose status field is
/// `status: Option<market.base.v1.Status>`.
#[macro_export]
macro_rules! impl_status_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::envelope::StatusEnvelope for $ty {
                fn status(&self) -> ::core::option::Option<&$crate::proto::Status> {
                    self.status.as_ref()
                }

                fn set_status(&mut self, status: $crate::proto::Status) {
                    self.status = ::core::option::Option::Some(status);
                }
            }
        )+
    };
}

/// Turn a handler result into a response that always carries a status.
///
/// - `Ok` without a status is stamped `200`.
/// - A classified error (code `>= 300`) becomes `{code, message}` on an
///   otherwise empty response.
/// - Anything else is logged with the request payload and replaced with
///   [`INTERNAL_ERROR_MESSAGE`].
pub fn normalize<Req, Resp, E>(method: &'static str, request: &Req, result: Result<Resp, E>) -> Resp
where
    Req: fmt::Debug,
    Resp: StatusEnvelope,
    E: CodedError,
{
    match result {
        Ok(mut response) => {
            if response.status().is_none() {
                response.set_status(Status::ok());
            }
            response
        }
        Err(err) => {
            let status = match err.status_code() {
                Some(code) if code >= 300 => Status::new(code, err.to_string()),
                _ => {
                    tracing::error!(
                        method,
                        request = ?request,
                        error = %err,
                        "rpc failed with an unclassified error"
                    );
                    Status::internal()
                }
            };
            let mut response = Resp::default();
            response.set_status(status);
            response
        }
    }
}

/// [`normalize`] wrapped for direct use as a tonic handler return value.
///
/// # Errors
/// Never returns `Err`; the signature matches generated service traits.
#[allow(clippy::unnecessary_wraps)]
pub fn respond<Req, Resp, E>(
    method: &'static str,
    request: &Req,
    result: Result<Resp, E>,
) -> Result<tonic::Response<Resp>, tonic::Status>
where
    Req: fmt::Debug,
    Resp: StatusEnvelope,
    E: CodedError,
{
    Ok(tonic::Response::new(normalize(method, request, result)))
}

/// Non-success envelope observed by a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("upstream responded with {code}: {message}")]
pub struct EnvelopeError {
    pub code: i32,
    pub message: String,
}

/// Client-side check of a received envelope. A missing status is treated
/// as an internal error since every server stamps one.
///
/// # Errors
/// Returns [`EnvelopeError`] for a missing or non-200 status.
pub fn ensure_ok(status: Option<&Status>) -> Result<(), EnvelopeError> {
    match status {
        Some(status) if status.is_ok() => Ok(()),
        Some(status) => Err(EnvelopeError {
            code: status.code,
            message: status.error.clone(),
        }),
        None => Err(EnvelopeError {
            code: CODE_INTERNAL,
            message: "response is missing its status envelope".to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[derive(Debug, Default, PartialEq)]
    struct EchoResponse {
        status: Option<Status>,
        payload: String,
    }

    crate::impl_status_envelope!(EchoResponse);

    #[derive(Debug)]
    struct EchoRequest {
        needle: &'static str,
    }

    #[derive(Debug, thiserror::Error)]
    enum EchoError {
        #[error("The id field is required.")]
        Missing,
        #[error("socket closed while reading row 42")]
        Io,
        #[error("looks fine")]
        Misclassified,
    }

    impl CodedError for EchoError {
        fn status_code(&self) -> Option<i32> {
            match self {
                Self::Missing => Some(400),
                Self::Io => None,
                Self::Misclassified => Some(200),
            }
        }
    }

    const REQ: EchoRequest = EchoRequest {
        needle: "payload-marker",
    };

    #[test]
    fn success_is_stamped_ok() {
        let resp: EchoResponse = normalize(
            "Echo",
            &REQ,
            Ok::<_, EchoError>(EchoResponse {
                status: None,
                payload: "hi".to_owned(),
            }),
        );
        assert_eq!(resp.status, Some(Status::ok()));
        assert_eq!(resp.payload, "hi");
    }

    #[test]
    fn success_keeps_handler_status() {
        let resp: EchoResponse = normalize(
            "Echo",
            &REQ,
            Ok::<_, EchoError>(EchoResponse {
                status: Some(Status::new(200, "")),
                payload: String::new(),
            }),
        );
        assert_eq!(resp.status.unwrap().code, 200);
    }

    #[test]
    fn coded_error_becomes_envelope_value() {
        let out = respond::<_, EchoResponse, _>("Echo", &REQ, Err(EchoError::Missing)).unwrap();
        let resp = out.into_inner();
        assert_eq!(resp.status, Some(Status::new(400, "The id field is required.")));
        assert!(resp.payload.is_empty());
    }

    #[traced_test]
    #[test]
    fn uncoded_error_is_logged_and_sanitized() {
        let resp: EchoResponse = normalize("Echo", &REQ, Err(EchoError::Io));
        let status = resp.status.unwrap();
        assert_eq!(status.code, 500);
        assert_eq!(status.error, INTERNAL_ERROR_MESSAGE);
        assert!(!status.error.contains("socket"));
        assert!(logs_contain("payload-marker"));
        assert!(logs_contain("socket closed while reading row 42"));
    }

    #[traced_test]
    #[test]
    fn success_code_on_error_is_treated_as_internal() {
        let resp: EchoResponse = normalize("Echo", &REQ, Err(EchoError::Misclassified));
        assert_eq!(resp.status.unwrap().code, 500);
        assert!(logs_contain("unclassified"));
    }

    #[test]
    fn ensure_ok_reports_codes() {
        assert!(ensure_ok(Some(&Status::ok())).is_ok());

        let err = ensure_ok(Some(&Status::new(404, "The package does not exist."))).unwrap_err();
        assert_eq!(err.code, 404);
        assert_eq!(err.message, "The package does not exist.");

        assert_eq!(ensure_ok(None).unwrap_err().code, 500);
    }
}
