use std::time::Duration;

use rvc_server::application::ports::{MessageQueue, QueueError, SendStatus};
use rvc_server::domain::{DeduplicationId, LeaseHandle, OutgoingMessage};
use rvc_server::infrastructure::queue::InMemoryQueue;

fn message(group: &str, body: &str) -> OutgoingMessage {
    OutgoingMessage {
        body: body.to_string(),
        group_id: group.to_string(),
        dedup_id: DeduplicationId::from_raw(body),
    }
}

fn queue() -> InMemoryQueue {
    InMemoryQueue::new(Duration::from_millis(200), Duration::from_secs(60))
}

#[tokio::test]
async fn given_messages_in_one_group_when_received_then_delivered_in_send_order() {
    let queue = queue();
    for body in ["first", "second", "third"] {
        queue.send(message("g", body)).await.unwrap();
    }

    let mut received = Vec::new();
    while let Some(msg) = queue.receive(Duration::from_millis(50)).await.unwrap() {
        received.push(msg.body.clone());
        queue.acknowledge(&msg.lease).await.unwrap();
    }

    assert_eq!(received, ["first", "second", "third"]);
}

#[tokio::test]
async fn given_empty_queue_when_receiving_then_returns_none_after_wait() {
    let queue = queue();
    let started = tokio::time::Instant::now();

    let received = queue.receive(Duration::from_millis(100)).await.unwrap();

    assert!(received.is_none());
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn given_waiting_receiver_when_message_sent_then_receiver_wakes() {
    let queue = std::sync::Arc::new(queue());
    let receiver = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.receive(Duration::from_secs(5)).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    queue.send(message("g", "late")).await.unwrap();

    let received = tokio::time::timeout(Duration::from_secs(1), receiver)
        .await
        .unwrap()
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(received.body, "late");
}

#[tokio::test]
async fn given_acknowledged_message_when_visibility_elapses_then_not_redelivered() {
    let queue = queue();
    queue.send(message("g", "once")).await.unwrap();

    let msg = queue.receive(Duration::from_millis(50)).await.unwrap().unwrap();
    queue.acknowledge(&msg.lease).await.unwrap();

    assert!(queue.receive(Duration::from_millis(400)).await.unwrap().is_none());
    assert!(queue.is_empty());
}

#[tokio::test]
async fn given_unacknowledged_message_when_visibility_elapses_then_redelivered_with_higher_count() {
    let queue = queue();
    queue.send(message("g", "retry")).await.unwrap();

    let first = queue.receive(Duration::from_millis(50)).await.unwrap().unwrap();
    let second = queue.receive(Duration::from_secs(1)).await.unwrap().unwrap();

    assert_eq!(first.receive_count, 1);
    assert_eq!(second.receive_count, 2);
    assert_eq!(second.body, "retry");
    assert_ne!(first.lease, second.lease);
}

#[tokio::test]
async fn given_expired_lease_when_acknowledging_then_unknown_lease() {
    let queue = queue();
    queue.send(message("g", "slow")).await.unwrap();

    let msg = queue.receive(Duration::from_millis(50)).await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(matches!(
        queue.acknowledge(&msg.lease).await,
        Err(QueueError::UnknownLease(_))
    ));
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn given_unknown_lease_when_acknowledging_then_error() {
    let queue = queue();

    let result = queue.acknowledge(&LeaseHandle::new("nope")).await;

    assert!(matches!(result, Err(QueueError::UnknownLease(_))));
}

#[tokio::test]
async fn given_same_dedup_id_within_window_when_sending_then_second_is_duplicate() {
    let queue = queue();

    let first = queue.send(message("g", "same")).await.unwrap();
    let second = queue.send(message("g", "same")).await.unwrap();

    assert_eq!(first, SendStatus::Enqueued);
    assert_eq!(second, SendStatus::Duplicate);
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn given_same_dedup_id_after_window_when_sending_then_enqueued_again() {
    let queue = InMemoryQueue::new(Duration::from_secs(5), Duration::from_millis(100));

    queue.send(message("g", "same")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    let again = queue.send(message("g", "same")).await.unwrap();

    assert_eq!(again, SendStatus::Enqueued);
    assert_eq!(queue.len(), 2);
}

#[tokio::test]
async fn given_acknowledged_message_within_window_when_resent_then_still_duplicate() {
    let queue = queue();
    queue.send(message("g", "done")).await.unwrap();
    let msg = queue.receive(Duration::from_millis(50)).await.unwrap().unwrap();
    queue.acknowledge(&msg.lease).await.unwrap();

    let status = queue.send(message("g", "done")).await.unwrap();

    assert_eq!(status, SendStatus::Duplicate);
}

#[tokio::test]
async fn given_in_flight_head_when_receiving_then_rest_of_group_is_blocked() {
    let queue = InMemoryQueue::new(Duration::from_secs(5), Duration::from_secs(60));
    queue.send(message("g", "head")).await.unwrap();
    queue.send(message("g", "next")).await.unwrap();
    queue.send(message("other", "independent")).await.unwrap();

    let head = queue.receive(Duration::from_millis(50)).await.unwrap().unwrap();
    let other = queue.receive(Duration::from_millis(50)).await.unwrap().unwrap();
    let blocked = queue.receive(Duration::from_millis(50)).await.unwrap();

    assert_eq!(head.body, "head");
    assert_eq!(other.body, "independent");
    assert!(blocked.is_none());

    queue.acknowledge(&head.lease).await.unwrap();
    let next = queue.receive(Duration::from_millis(50)).await.unwrap().unwrap();
    assert_eq!(next.body, "next");
}

#[tokio::test]
async fn given_dead_lettered_message_when_listing_then_reason_and_count_recorded() {
    let queue = queue();
    queue.send(message("g", "poison")).await.unwrap();
    let msg = queue.receive(Duration::from_millis(50)).await.unwrap().unwrap();

    queue.dead_letter(&msg, "malformed job").await.unwrap();

    let dead = queue.dead_letters();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].body, "poison");
    assert_eq!(dead[0].receive_count, 1);
    assert_eq!(dead[0].reason, "malformed job");
}
