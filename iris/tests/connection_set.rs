use bytes::Bytes;
use iris::framecast::{BroadcastReport, ConnectionId, ConnectionInfo, ConnectionSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use tokio::sync::mpsc;

fn test_info(port: u16) -> ConnectionInfo {
    ConnectionInfo {
        request_uri: "/ws".to_string(),
        remote_addr: SocketAddr::from(([127, 0, 0, 1], port)),
        credentials: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_assigns_distinct_ids() {
        let connections = ConnectionSet::new(2);
        let (a, _frames_a) = connections.connect(test_info(5000)).await.unwrap();
        let (b, _frames_b) = connections.connect(test_info(5001)).await.unwrap();
        assert_ne!(a, b);

        let members = connections.snapshot().await.unwrap();
        assert_eq!(members, vec![(a, test_info(5000)), (b, test_info(5001))]);
    }

    #[tokio::test]
    async fn len_tracks_membership() {
        let connections = ConnectionSet::new(2);
        assert_eq!(connections.len().await.unwrap(), 0);

        let (a, _frames_a) = connections.connect(test_info(5000)).await.unwrap();
        let (_, _frames_b) = connections.connect(test_info(5001)).await.unwrap();
        assert_eq!(connections.len().await.unwrap(), 2);
        assert_eq!(connections.len().await.unwrap(), connections.snapshot().await.unwrap().len());

        connections.disconnect(a).await.unwrap();
        connections.disconnect(a).await.unwrap();
        assert_eq!(connections.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn double_disconnect_is_harmless() {
        let connections = ConnectionSet::new(2);
        let (id, _frames) = connections.connect(test_info(5000)).await.unwrap();

        assert_eq!(connections.disconnect(id).await.unwrap(), Some(test_info(5000)));
        assert_eq!(connections.disconnect(id).await.unwrap(), None);
        assert_eq!(connections.disconnect(id + 100).await.unwrap(), None);
        assert_eq!(connections.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_member() {
        let connections = ConnectionSet::new(2);
        let (_, mut frames_a) = connections.connect(test_info(5000)).await.unwrap();
        let (_, mut frames_b) = connections.connect(test_info(5001)).await.unwrap();

        let frame = Bytes::from_static(b"\xff\xd8frame\xff\xd9");
        let report = connections.broadcast(frame.clone()).await.unwrap();
        assert_eq!(report, BroadcastReport { delivered: 2, dropped: 0 });

        assert_eq!(frames_a.recv().await.unwrap(), frame);
        assert_eq!(frames_b.recv().await.unwrap(), frame);
    }

    #[tokio::test]
    async fn broadcast_to_empty_set_is_noop() {
        let connections = ConnectionSet::new(2);
        let report = connections.broadcast(Bytes::from_static(b"frame")).await.unwrap();
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn slow_client_drops_frames_without_blocking_others() {
        let connections = ConnectionSet::new(2);
        let (_, _stalled) = connections.connect(test_info(5000)).await.unwrap();
        let (_, mut active) = connections.connect(test_info(5001)).await.unwrap();

        let mut reports = Vec::new();
        for n in 0..5u8 {
            reports.push(connections.broadcast(Bytes::from(vec![n])).await.unwrap());
            assert_eq!(active.recv().await.unwrap(), Bytes::from(vec![n]));
        }

        // The stalled queue holds two frames, the other three are dropped for it alone
        assert_eq!(reports[0], BroadcastReport { delivered: 2, dropped: 0 });
        assert_eq!(reports[1], BroadcastReport { delivered: 2, dropped: 0 });
        for report in &reports[2..] {
            assert_eq!(*report, BroadcastReport { delivered: 1, dropped: 1 });
        }
    }

    #[tokio::test]
    async fn closed_receiver_counts_as_dropped() {
        let connections = ConnectionSet::new(2);
        let (_, frames) = connections.connect(test_info(5000)).await.unwrap();
        drop(frames);

        let report = connections.broadcast(Bytes::from_static(b"frame")).await.unwrap();
        assert_eq!(report, BroadcastReport { delivered: 0, dropped: 1 });
        // Still a member until its handler disconnects it
        assert_eq!(connections.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn random_membership_matches_model() {
        let mut rng = StdRng::seed_from_u64(7);
        let connections = ConnectionSet::new(4);
        let mut model: BTreeMap<ConnectionId, mpsc::Receiver<Bytes>> = BTreeMap::new();
        let mut removed: BTreeSet<ConnectionId> = BTreeSet::new();

        for step in 0..500u32 {
            match rng.random_range(0..4) {
                0 | 1 => {
                    let (id, frames) = connections.connect(test_info(6000 + (step % 1000) as u16)).await.unwrap();
                    assert!(!model.contains_key(&id) && !removed.contains(&id), "id {} reused", id);
                    model.insert(id, frames);
                }
                2 if !model.is_empty() => {
                    let index = rng.random_range(0..model.len());
                    let id = *model.keys().nth(index).unwrap();
                    assert!(connections.disconnect(id).await.unwrap().is_some());
                    model.remove(&id);
                    removed.insert(id);
                }
                2 => {}
                _ => {
                    let frame = Bytes::from(step.to_le_bytes().to_vec());
                    let report = connections.broadcast(frame.clone()).await.unwrap();
                    assert_eq!(report.delivered + report.dropped, model.len());
                    // Drain every member so queues never fill
                    for frames in model.values_mut() {
                        assert_eq!(frames.recv().await.unwrap(), frame);
                    }
                    assert_eq!(report.dropped, 0);
                }
            }

            if let Some(&gone) = removed.iter().next_back() {
                assert_eq!(connections.disconnect(gone).await.unwrap(), None);
            }
            let ids: Vec<ConnectionId> = connections
                .snapshot()
                .await
                .unwrap()
                .into_iter()
                .map(|(id, _)| id)
                .collect();
            assert_eq!(ids, model.keys().copied().collect::<Vec<_>>());
        }
        println!("✅ {} members, {} removed after 500 steps", model.len(), removed.len());
    }

    #[tokio::test]
    async fn concurrent_membership_and_broadcast() {
        let connections = ConnectionSet::new(8);
        let mut tasks = Vec::new();
        for n in 0..16u16 {
            let connections = connections.clone();
            tasks.push(tokio::spawn(async move {
                let (id, _frames) = connections.connect(test_info(7000 + n)).await.unwrap();
                tokio::task::yield_now().await;
                connections.disconnect(id).await.unwrap()
            }));
        }
        let broadcaster = {
            let connections = connections.clone();
            tokio::spawn(async move {
                for _ in 0..32 {
                    connections.broadcast(Bytes::from_static(b"frame")).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }
        broadcaster.await.unwrap();
        assert_eq!(connections.len().await.unwrap(), 0);
    }
}
