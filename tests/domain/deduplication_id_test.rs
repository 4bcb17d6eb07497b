use rvc_server::domain::{DeduplicationStrategy, RequestId};

#[test]
fn given_request_id_strategy_when_deriving_twice_then_ids_match() {
    let request_id = RequestId::new("req-1");

    assert_eq!(
        DeduplicationStrategy::RequestId.derive(&request_id),
        DeduplicationStrategy::RequestId.derive(&request_id)
    );
}

#[test]
fn given_request_id_strategy_when_request_ids_differ_then_ids_differ() {
    assert_ne!(
        DeduplicationStrategy::RequestId.derive(&RequestId::new("req-1")),
        DeduplicationStrategy::RequestId.derive(&RequestId::new("req-2"))
    );
}

#[test]
fn given_random_strategy_when_deriving_twice_then_ids_differ() {
    let request_id = RequestId::new("req-1");

    assert_ne!(
        DeduplicationStrategy::Random.derive(&request_id),
        DeduplicationStrategy::Random.derive(&request_id)
    );
}
