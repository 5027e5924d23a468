/// Port used for OTLP/gRPC collectors when the configured host has none.
pub const DEFAULT_OTLP_GRPC_PORT: u16 = 4317;

/// Normalize a collector `host[:port]` into an insecure gRPC endpoint URL.
///
/// Returns `None` for blank input, which disables export for that signal.
pub fn normalize_collector_endpoint(host: &str) -> Option<String> {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let (scheme, authority) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", trimmed),
    };
    if authority.is_empty() {
        return None;
    }

    // `[::1]` style hosts carry colons inside the brackets.
    let has_port = !authority.ends_with(']')
        && authority
            .rsplit_once(':')
            .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()));

    if has_port {
        Some(format!("{scheme}://{authority}"))
    } else {
        Some(format!("{scheme}://{authority}:{DEFAULT_OTLP_GRPC_PORT}"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config_endpoint.rs"]
mod tests;
