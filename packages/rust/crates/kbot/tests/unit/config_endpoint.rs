use super::normalize_collector_endpoint;

#[test]
fn bare_host_gets_default_grpc_port_and_http_scheme() {
    assert_eq!(
        normalize_collector_endpoint("tempo-distributor.monitoring.svc.cluster.local"),
        Some("http://tempo-distributor.monitoring.svc.cluster.local:4317".to_string())
    );
}

#[test]
fn explicit_port_is_preserved() {
    assert_eq!(
        normalize_collector_endpoint("collector:4318"),
        Some("http://collector:4318".to_string())
    );
}

#[test]
fn explicit_scheme_is_preserved() {
    assert_eq!(
        normalize_collector_endpoint("https://collector.example/"),
        Some("https://collector.example:4317".to_string())
    );
}

#[test]
fn bracketed_ipv6_without_port_gets_default_port() {
    assert_eq!(
        normalize_collector_endpoint("[::1]"),
        Some("http://[::1]:4317".to_string())
    );
    assert_eq!(
        normalize_collector_endpoint("[::1]:9000"),
        Some("http://[::1]:9000".to_string())
    );
}

#[test]
fn blank_host_disables_export() {
    assert_eq!(normalize_collector_endpoint(""), None);
    assert_eq!(normalize_collector_endpoint("   "), None);
    assert_eq!(normalize_collector_endpoint("http://"), None);
}
