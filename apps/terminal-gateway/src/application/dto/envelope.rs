//! Result normalizer.
//!
//! Every outcome leaves the core as one of two shapes:
//!
//! ```json
//! { "success": true,  "data": { ... } }
//! { "success": false, "error": "OrderRejected", "message": "...", "code": 10019 }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, GatewayError};

/// Uniform success/failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error reason on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    /// Human-readable failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Terminal diagnostic code, when the failure carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl<T> Envelope<T> {
    /// Success envelope.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            code: None,
        }
    }

    /// Failure envelope.
    pub fn failure(error: &GatewayError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.code()),
            message: Some(error.to_string()),
            code: error.terminal_code(),
        }
    }

    /// Wrap a use case result.
    pub fn from_result(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(&e),
        }
    }

    /// Map the success payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            message: self.message,
            code: self.code,
        }
    }
}

/// Drive a use case to completion and normalize its outcome.
///
/// A panic inside the use case is caught here and reported as
/// `UnexpectedFailure` instead of unwinding into the transport.
pub async fn normalize<T, F>(operation: &'static str, call: F) -> Envelope<T>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(data)) => Envelope::ok(data),
        Ok(Err(e)) => {
            tracing::warn!(operation, error = %e, reason = e.code().reason(), "Operation failed");
            Envelope::failure(&e)
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(operation, %message, "Operation panicked");
            Envelope::failure(&GatewayError::unexpected(message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Ticket;

    #[test]
    fn ok_envelope_shape() {
        let json = serde_json::to_value(Envelope::ok(42)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 42}));
    }

    #[test]
    fn failure_envelope_shape() {
        let envelope: Envelope<()> = Envelope::failure(&GatewayError::OrderRejected {
            code: 10_019,
            comment: "No money".to_string(),
        });
        let json = serde_json::to_value(envelope).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "OrderRejected");
        assert_eq!(json["message"], "Order failed: 10019 - No money");
        assert_eq!(json["code"], 10_019);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn failure_without_terminal_code_omits_code() {
        let envelope: Envelope<()> = Envelope::failure(&GatewayError::PositionNotFound {
            ticket: Ticket::new(9),
        });
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["error"], "PositionNotFound");
        assert!(json.get("code").is_none());
    }

    #[tokio::test]
    async fn normalize_passes_results_through() {
        let envelope = normalize("test", async { Ok::<_, GatewayError>("done") }).await;
        assert!(envelope.success);
        assert_eq!(envelope.data, Some("done"));
    }

    #[tokio::test]
    async fn normalize_catches_panics() {
        let envelope: Envelope<u8> = normalize("test", async {
            if true {
                panic!("bridge exploded");
            }
            Ok(1)
        })
        .await;

        assert!(!envelope.success);
        assert_eq!(envelope.error, Some(ErrorCode::UnexpectedFailure));
        assert_eq!(envelope.message.as_deref(), Some("bridge exploded"));
    }

    #[test]
    fn map_keeps_failure() {
        let envelope: Envelope<u8> = Envelope::failure(&GatewayError::unexpected("x"));
        let mapped = envelope.map(|v| v.to_string());
        assert!(!mapped.success);
        assert!(mapped.data.is_none());
    }
}
