use futures::channel::mpsc;
use futures::StreamExt;
use munakas_broadcaster::{
    sanitize_json, BroadcastEnvelope, BroadcastHub, BroadcasterError, Client, PayloadShape,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn map_name(name: &str) -> BroadcastEnvelope {
    BroadcastEnvelope::MapName { map_name: name.to_string() }
}

/// Next frame on a viewer, or None if nothing arrives in time
async fn next_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<Value> {
    match tokio::time::timeout(Duration::from_millis(500), rx.next()).await {
        Ok(Some(frame)) => Some(serde_json::from_str(&frame).unwrap()),
        _ => None,
    }
}

#[tokio::test]
async fn test_hub_lifecycle() {
    let hub = BroadcastHub::default();

    assert_ok!(hub.start().await);
    assert!(hub.is_running().await);

    assert_ok!(hub.stop().await);
    assert!(!hub.is_running().await);
}

#[tokio::test]
async fn test_fanout_to_multiple_clients() {
    let hub = BroadcastHub::default();
    hub.start().await.unwrap();

    let mut receivers = Vec::new();
    for _ in 0..3 {
        let (tx, rx) = mpsc::unbounded();
        hub.register(Client::new(tx)).await;
        receivers.push(rx);
    }

    hub.publish(map_name("de_dust2")).await.unwrap();

    for rx in receivers.iter_mut() {
        let frame = next_frame(rx).await.expect("client should receive map_name");
        assert_eq!(frame["type"], "map_name");
        assert_eq!(frame["map_name"], "de_dust2");
    }

    // Exactly once
    for rx in receivers.iter_mut() {
        assert!(next_frame(rx).await.is_none());
    }

    hub.stop().await.unwrap();
}

#[tokio::test]
async fn test_messages_arrive_in_enqueue_order() {
    let hub = BroadcastHub::default();
    let (tx1, mut rx1) = mpsc::unbounded();
    let (tx2, mut rx2) = mpsc::unbounded();
    hub.register(Client::new(tx1)).await;
    hub.register(Client::new(tx2)).await;

    // Queue before the loop runs, then let it drain
    for i in 0..20 {
        hub.publish(map_name(&format!("map_{}", i))).await.unwrap();
    }
    hub.start().await.unwrap();

    for rx in [&mut rx1, &mut rx2] {
        for i in 0..20 {
            let frame = next_frame(rx).await.expect("missing frame");
            assert_eq!(frame["map_name"], format!("map_{}", i));
        }
    }

    hub.stop().await.unwrap();
}

#[tokio::test]
async fn test_failed_client_gets_nothing_further() {
    let hub = BroadcastHub::default();
    hub.start().await.unwrap();

    let (dead_tx, dead_rx) = mpsc::unbounded::<String>();
    let (live_tx, mut live_rx) = mpsc::unbounded();
    hub.register(Client::new(dead_tx)).await;
    hub.register(Client::new(live_tx)).await;
    drop(dead_rx);

    hub.publish(map_name("first")).await.unwrap();
    assert_eq!(next_frame(&mut live_rx).await.unwrap()["map_name"], "first");
    assert_eq!(hub.client_count().await, 1);

    hub.publish(map_name("second")).await.unwrap();
    assert_eq!(next_frame(&mut live_rx).await.unwrap()["map_name"], "second");
    assert_eq!(hub.client_count().await, 1);

    hub.stop().await.unwrap();
}

#[tokio::test]
async fn test_deregistered_client_receives_nothing() {
    let hub = BroadcastHub::default();
    hub.start().await.unwrap();

    let (tx, mut rx) = mpsc::unbounded();
    let id = hub.register(Client::new(tx)).await;
    hub.deregister(id).await;

    hub.publish(map_name("de_inferno")).await.unwrap();

    // Closed on deregister, so the stream ends without a frame
    assert!(rx.next().await.is_none());

    hub.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_closes_clients() {
    let hub = BroadcastHub::default();
    hub.start().await.unwrap();

    let (tx, mut rx) = mpsc::unbounded::<String>();
    hub.register(Client::new(tx)).await;

    hub.stop().await.unwrap();

    assert_eq!(hub.client_count().await, 0);
    assert!(rx.next().await.is_none());
}

#[tokio::test]
async fn test_sanitized_player_data_broadcast() {
    let hub = BroadcastHub::default();
    hub.start().await.unwrap();

    let (tx, mut rx) = mpsc::unbounded();
    hub.register(Client::new(tx)).await;

    let mut raw = br#"[{"name":"a"#.to_vec();
    raw.push(0xff);
    raw.extend_from_slice(br#"b","health":87}]"#);
    let payload = sanitize_json(&raw, PayloadShape::Array);
    hub.publish(BroadcastEnvelope::player_data(payload).unwrap())
        .await
        .unwrap();

    let frame = next_frame(&mut rx).await.unwrap();
    assert_eq!(frame["type"], "player_data");
    assert_eq!(frame["data"][0]["name"], "ab");
    assert_eq!(frame["data"][0]["health"], 87);

    hub.stop().await.unwrap();
}

#[tokio::test]
async fn test_publisher_handle_feeds_same_queue() {
    let hub = BroadcastHub::default();
    hub.start().await.unwrap();

    let (tx, mut rx) = mpsc::unbounded();
    hub.register(Client::new(tx)).await;

    let publisher = hub.publisher();
    publisher.send(map_name("de_anubis")).await.unwrap();

    assert_eq!(next_frame(&mut rx).await.unwrap()["map_name"], "de_anubis");

    hub.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_twice_is_error() {
    let hub = BroadcastHub::default();
    hub.start().await.unwrap();
    hub.stop().await.unwrap();

    assert!(matches!(hub.stop().await, Err(BroadcasterError::NotStarted)));
}

#[tokio::test]
async fn test_default_hub_evicts_stalled_viewer() {
    let hub = BroadcastHub::default();
    hub.start().await.unwrap();

    // Zero-buffer channel nobody reads: the first write never completes
    let (stalled_tx, _stalled_rx) = mpsc::channel::<String>(0);
    let (live_tx, mut live_rx) = mpsc::unbounded();
    let stalled = hub.register(Client::new(stalled_tx)).await;
    hub.register(Client::new(live_tx)).await;

    hub.publish(map_name("first")).await.unwrap();
    hub.publish(map_name("second")).await.unwrap();

    for expected in ["first", "second"] {
        let frame = tokio::time::timeout(Duration::from_secs(5), live_rx.next())
            .await
            .expect("fan-out stalled behind a viewer that stopped reading")
            .unwrap();
        assert!(frame.contains(expected));
    }

    assert_eq!(hub.client_count().await, 1);
    assert!(!hub.deregister(stalled).await);

    hub.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_registry_churn_during_fanout() {
    const MESSAGES: usize = 200;

    let hub = Arc::new(BroadcastHub::default());
    hub.start().await.unwrap();

    let mut stable = Vec::new();
    for _ in 0..3 {
        let (tx, rx) = mpsc::unbounded();
        hub.register(Client::new(tx)).await;
        stable.push(rx);
    }

    let publisher = {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            for i in 0..MESSAGES {
                hub.publish(map_name(&format!("map_{}", i))).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let churn: Vec<_> = (0..8)
        .map(|_| {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for _ in 0..25 {
                    let (tx, _rx) = mpsc::unbounded::<String>();
                    let id = hub.register(Client::new(tx)).await;
                    tokio::task::yield_now().await;
                    assert!(hub.deregister(id).await);
                }
            })
        })
        .collect();

    publisher.await.unwrap();
    for task in churn {
        task.await.unwrap();
    }

    assert_eq!(hub.client_count().await, 3);

    // Every long-lived viewer sees each message once, in order
    for rx in stable.iter_mut() {
        for i in 0..MESSAGES {
            let frame = next_frame(rx).await.expect("missing frame");
            assert_eq!(frame["map_name"], format!("map_{}", i));
        }
        assert!(next_frame(rx).await.is_none());
    }

    hub.stop().await.unwrap();
}
