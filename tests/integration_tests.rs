//! End-to-end scenarios S1-S6 from SPEC_FULL.md §8.

use fanout_buffer::{Buffer, BufferError, CancellationToken, Event, EventKind, Watch};

fn keys(events: &[Event]) -> Vec<Vec<u8>> {
    events.iter().map(|e| e.item.key.clone()).collect()
}

#[test]
fn s1_capacity_3_overwrite() {
    let buffer = Buffer::new(3).unwrap();
    for k in ["a", "b", "c", "d", "e"] {
        buffer.push(Event::put(k, Vec::new()));
    }
    assert_eq!(buffer.size(), 3);
    assert_eq!(
        keys(&buffer.events()),
        vec![b"c".to_vec(), b"d".to_vec(), b"e".to_vec()]
    );
}

#[tokio::test]
async fn s2_prefix_filter() {
    let buffer = Buffer::new(8).unwrap();
    let ctx = CancellationToken::new();

    let mut w1 = buffer.new_watcher(&ctx, Watch::new("w1")).unwrap();
    let mut w2 = buffer
        .new_watcher(&ctx, Watch::new("w2").with_prefixes(vec![b"/users/".to_vec()]))
        .unwrap();
    let mut w3 = buffer
        .new_watcher(
            &ctx,
            Watch::new("w3").with_prefixes(vec![b"/nodes/".to_vec(), b"/users/alice".to_vec()]),
        )
        .unwrap();

    for w in [&mut w1, &mut w2, &mut w3] {
        assert_eq!(w.events().recv().await.unwrap().kind, EventKind::Init);
    }

    buffer.push_batch([
        Event::put("/users/alice", "1"),
        Event::put("/users/bob", "2"),
        Event::put("/nodes/n1", "3"),
        Event::put("/roles/admin", "4"),
    ]);

    let mut seen1 = Vec::new();
    while let Ok(e) = w1.events().try_recv() {
        seen1.push(e.item.key);
    }
    assert_eq!(
        seen1,
        vec![
            b"/users/alice".to_vec(),
            b"/users/bob".to_vec(),
            b"/nodes/n1".to_vec(),
            b"/roles/admin".to_vec(),
        ]
    );

    let mut seen2 = Vec::new();
    while let Ok(e) = w2.events().try_recv() {
        seen2.push(e.item.key);
    }
    assert_eq!(seen2, vec![b"/users/alice".to_vec(), b"/users/bob".to_vec()]);

    let mut seen3 = Vec::new();
    while let Ok(e) = w3.events().try_recv() {
        seen3.push(e.item.key);
    }
    assert_eq!(seen3, vec![b"/users/alice".to_vec(), b"/nodes/n1".to_vec()]);
}

#[tokio::test]
async fn s3_slow_watcher_eviction() {
    let buffer = Buffer::new(2).unwrap();
    let ctx = CancellationToken::new();

    let w = buffer
        .new_watcher(&ctx, Watch::new("slow").with_queue_size(1))
        .unwrap();

    // Never drained: the queue already holds Init, so the next push finds
    // it full.
    buffer.push(Event::put("a", "1"));

    assert!(w.is_closed());

    // Subsequent pushes do not attempt delivery to the evicted watcher and
    // complete normally.
    buffer.push(Event::put("b", "2"));
    assert_eq!(buffer.size(), 2);
}

#[tokio::test]
async fn s4_reset_restores_service() {
    let buffer = Buffer::new(4).unwrap();
    let ctx = CancellationToken::new();

    let w1 = buffer.new_watcher(&ctx, Watch::new("w1")).unwrap();
    let w2 = buffer.new_watcher(&ctx, Watch::new("w2")).unwrap();

    buffer.push_batch((0..5).map(|i| Event::put(format!("k{i}"), Vec::new())));

    buffer.reset();

    assert_eq!(buffer.size(), 0);
    assert!(w1.is_closed());
    assert!(w2.is_closed());

    let mut w3 = buffer.new_watcher(&ctx, Watch::new("w3")).unwrap();
    buffer.push(Event::put("fresh", Vec::new()));

    assert_eq!(w3.events().recv().await.unwrap().kind, EventKind::Init);
    let next = w3.events().recv().await.unwrap();
    assert_eq!(next.item.key, b"fresh");
}

#[test]
fn s5_close_is_terminal() {
    let buffer = Buffer::new(4).unwrap();
    let ctx = CancellationToken::new();
    let w = buffer.new_watcher(&ctx, Watch::new("w1")).unwrap();

    buffer.close();

    let err = buffer.new_watcher(&ctx, Watch::new("w2")).unwrap_err();
    assert_eq!(err, BufferError::BufferClosed);
    assert!(w.is_closed());
    assert_eq!(buffer.size(), 0);
}

#[tokio::test]
async fn s6_batch_atomicity() {
    use std::sync::Arc;
    use std::thread;

    let buffer = Arc::new(Buffer::new(16).unwrap());
    let ctx = CancellationToken::new();

    let mut w1 = buffer.new_watcher(&ctx, Watch::new("w1")).unwrap();
    let mut w2 = buffer.new_watcher(&ctx, Watch::new("w2")).unwrap();

    assert_eq!(w1.events().recv().await.unwrap().kind, EventKind::Init);
    assert_eq!(w2.events().recv().await.unwrap().kind, EventKind::Init);

    let b1 = Arc::clone(&buffer);
    let batch = thread::spawn(move || {
        b1.push_batch([
            Event::put("e1", "1"),
            Event::put("e2", "2"),
            Event::put("e3", "3"),
        ]);
    });
    let b2 = Arc::clone(&buffer);
    let single = thread::spawn(move || {
        b2.push(Event::put("e4", "4"));
    });

    batch.join().unwrap();
    single.join().unwrap();

    for w in [&mut w1, &mut w2] {
        let mut seen = Vec::new();
        while let Ok(e) = w.events().try_recv() {
            seen.push(String::from_utf8(e.item.key).unwrap());
        }
        let as_batch_first = seen == vec!["e1", "e2", "e3", "e4"];
        let as_single_first = seen == vec!["e4", "e1", "e2", "e3"];
        assert!(
            as_batch_first || as_single_first,
            "interleaved delivery observed: {seen:?}"
        );
    }
}
