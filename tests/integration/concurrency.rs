use std::collections::HashSet;
use std::sync::Arc;

use sink_core::Transport;

use crate::*;

// ══════════════════════════════════════════════════════════════════════════════
//  Concurrent publishes on a shared transport
// ══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_concurrent_publishes_keep_their_own_ids() {
    let recorder = Arc::new(Recorder::interleaving());
    let publisher = Arc::new(publisher(recorder.clone(), 100));
    let a = payload(1000);
    let b = Bytes::from(vec![0xab; 550]);

    let (ra, rb) = tokio::join!(publisher.publish(a.clone()), publisher.publish(b.clone()));
    let (ra, rb) = (ra.unwrap(), rb.unwrap());
    assert_ne!(ra.message_id, rb.message_id);

    let sent = recorder.sent();
    assert_eq!(sent.len(), 10 + 6);
    for s in &sent {
        assert_eq!(s.key, s.decode().message_id, "routing key must match frame id");
    }

    // Per id, frames arrive in index order and reassemble.
    assert_eq!(reassemble(&frames_for(&sent, &ra.message_id)), a);
    assert_eq!(reassemble(&frames_for(&sent, &rb.message_id)), b);
}

#[tokio::test]
async fn test_many_tasks_share_dyn_transport() {
    let recorder = Arc::new(Recorder::interleaving());
    let transport: Arc<dyn Transport> = recorder.clone();
    let publisher = Arc::new(publisher(transport, 64));

    let mut handles = Vec::new();
    for n in 0..8usize {
        let publisher = publisher.clone();
        handles.push(tokio::spawn(async move {
            // Distinct content per task so a cross-task mix-up shows in the bytes.
            let data: Bytes = (0..100 + n * 37).map(|i| (i * 7 + n) as u8).collect::<Vec<u8>>().into();
            let receipt = publisher.publish(data.clone()).await;
            (receipt, data)
        }));
    }

    let mut published = Vec::new();
    for handle in handles {
        let (receipt, data) = handle.await.unwrap();
        published.push((receipt.unwrap().message_id, data));
    }

    let ids: HashSet<&str> = published.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids.len(), 8);

    let sent = recorder.sent();
    let keys: HashSet<&str> = sent.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, ids);
    for (id, data) in &published {
        let frames = frames_for(&sent, id);
        assert_eq!(frames.len(), data.len().div_ceil(64));
        assert_eq!(&reassemble(&frames), data, "payload for {id} was mixed up");
    }
}
