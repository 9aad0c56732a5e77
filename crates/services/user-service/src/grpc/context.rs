//! Request context extraction for inbound gRPC calls.

use std::time::Duration;

use domain::{CancellationToken, RequestContext};
use tonic::Request;

const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// Build the request context for an inbound call.
///
/// The context is cancelled with `shutdown`. The deadline comes from the
/// `grpc-timeout` header the client sent; a missing or malformed header means
/// no deadline.
pub fn request_context<T>(request: &Request<T>, shutdown: &CancellationToken) -> RequestContext {
    let timeout = request
        .metadata()
        .get(GRPC_TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_grpc_timeout);

    RequestContext::child_of(shutdown).timeout(timeout)
}

/// Parse a `grpc-timeout` value: at most 8 ASCII digits followed by a unit.
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    let duration = match unit {
        "H" => Duration::from_secs(amount * 60 * 60),
        "M" => Duration::from_secs(amount * 60),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(duration)
}
