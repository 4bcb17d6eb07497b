use axum::http::HeaderValue;
use rvc_server::infrastructure::observability::CorrelationId;

#[test]
fn given_well_formed_header_when_resolved_then_it_is_kept() {
    let header = HeaderValue::from_static("trace-42");

    let id = CorrelationId::from_header(Some(&header));

    assert_eq!(id.as_str(), "trace-42");
}

#[test]
fn given_no_header_when_resolved_then_uuid_is_generated() {
    let id = CorrelationId::from_header(None);

    assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
}

#[test]
fn given_header_with_spaces_inside_when_resolved_then_it_is_replaced() {
    let header = HeaderValue::from_static("two words");

    let id = CorrelationId::from_header(Some(&header));

    assert_ne!(id.as_str(), "two words");
    assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
}

#[test]
fn given_overlong_header_when_resolved_then_it_is_replaced() {
    let long = "a".repeat(200);
    let header = HeaderValue::from_str(&long).unwrap();

    let id = CorrelationId::from_header(Some(&header));

    assert_eq!(id.as_str().len(), 36);
}
