use seqcheck::{
    effective_hwm, parse_endpoint, PublishTransport, RecordQueue, SubscribeTransport,
    TcpPublisher, TcpSubscriber, DEFAULT_HIGH_WATER_MARK,
};
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

const TEST_DEADLINE: Duration = Duration::from_secs(5);

fn wait_for<F: FnMut() -> bool>(mut ready: F, what: &str) {
    let deadline = Instant::now() + TEST_DEADLINE;
    while !ready() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn queue_hands_the_record_back_at_the_high_water_mark() {
    let queue = RecordQueue::new(2);
    assert_eq!(queue.capacity(), 2);
    assert!(queue.offer(vec![1]).is_ok());
    assert!(queue.offer(vec![2]).is_ok());
    let back = queue.offer(vec![3]).expect_err("third record exceeds the hwm");
    assert_eq!(back, vec![3]);
    assert_eq!(queue.depth(), 2);
    assert_eq!(queue.take(), Some(vec![1]));
    assert_eq!(queue.take(), Some(vec![2]));
    assert!(queue.take().is_none());
}

#[test]
fn endpoints_must_be_tcp_uris() {
    parse_endpoint("tcp://127.0.0.1:16199").expect("canonical endpoint");
    assert!(parse_endpoint("udp://127.0.0.1:16199").is_err());
    assert!(parse_endpoint("127.0.0.1:16199").is_err());
    assert!(parse_endpoint("tcp://not an authority").is_err());
}

#[test]
fn unset_hwm_selects_the_default_capacity() {
    assert_eq!(effective_hwm(-1), DEFAULT_HIGH_WATER_MARK);
    assert_eq!(effective_hwm(0), DEFAULT_HIGH_WATER_MARK);
    assert_eq!(effective_hwm(64), 64);
}

#[test]
fn records_flow_in_order_from_publisher_to_subscriber() {
    let mut publisher = TcpPublisher::bind("tcp://127.0.0.1:0", -1).expect("bind");
    let endpoint = format!("tcp://{}", publisher.local_addr());
    let mut subscriber = TcpSubscriber::connect(&endpoint, 8, -1).expect("connect");

    wait_for(|| publisher.subscriber_count() == 1, "subscriber registration");

    for value in 0u64..100 {
        publisher.publish(&value.to_ne_bytes()).expect("publish");
    }

    let mut received = Vec::new();
    let deadline = Instant::now() + TEST_DEADLINE;
    while received.len() < 100 {
        assert!(
            Instant::now() < deadline,
            "timed out after {} records",
            received.len()
        );
        if let Some(record) = subscriber.subscribe().expect("subscribe") {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&record);
            received.push(u64::from_ne_bytes(raw));
        }
    }
    assert_eq!(received, (0u64..100).collect::<Vec<_>>());
    assert_eq!(publisher.dropped_records(), 0);

    subscriber.close();
    publisher.close();
}

#[test]
fn publishing_with_no_subscribers_is_a_no_op() {
    let mut publisher = TcpPublisher::bind("tcp://127.0.0.1:0", -1).expect("bind");
    for value in 0u64..10 {
        publisher.publish(&value.to_ne_bytes()).expect("publish");
    }
    assert_eq!(publisher.subscriber_count(), 0);
    assert_eq!(publisher.dropped_records(), 0);
    publisher.close();
}

#[test]
fn subscriber_retries_until_the_publisher_appears() {
    // reserve a port, then release it for the publisher to claim later
    let probe = TcpListener::bind("127.0.0.1:0").expect("probe bind");
    let endpoint = format!("tcp://{}", probe.local_addr().expect("probe addr"));
    drop(probe);

    let mut subscriber = TcpSubscriber::connect(&endpoint, 8, -1).expect("connect");
    thread::sleep(Duration::from_millis(300));

    let mut publisher = TcpPublisher::bind(&endpoint, -1).expect("late bind");
    wait_for(|| publisher.subscriber_count() == 1, "late subscriber registration");

    publisher.publish(&7u64.to_ne_bytes()).expect("publish");

    let deadline = Instant::now() + TEST_DEADLINE;
    let record = loop {
        assert!(Instant::now() < deadline, "timed out waiting for record");
        if let Some(record) = subscriber.subscribe().expect("subscribe") {
            break record;
        }
    };
    assert_eq!(record, 7u64.to_ne_bytes().to_vec());

    subscriber.close();
    publisher.close();
}
