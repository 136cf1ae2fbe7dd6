// THEORY:
// The frame bus is the hand-off point between the generator and whatever
// transport sits downstream. Every tick that has an audience renders once and
// broadcasts the raster behind an `Arc`, so subscribers share one buffer.
// Nothing waits on a slow subscriber; it lags and resumes from the newest
// frame still in the channel.

use image::RgbImage;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;

/// One rendered frame, ready for whatever transport sits downstream.
#[derive(Debug, Clone)]
pub struct FramePacket {
    pub generation: u64,
    pub ts_millis: u64,
    pub width: u32,
    pub height: u32,
    pub raster: Arc<RgbImage>,
}

impl FramePacket {
    pub fn new(generation: u64, generated_at: SystemTime, raster: RgbImage) -> Self {
        let ts_millis = generated_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            generation,
            ts_millis,
            width: raster.width(),
            height: raster.height(),
            raster: Arc::new(raster),
        }
    }
}

/// Fan-out of rendered frames. Slow subscribers lag and skip frames instead of
/// holding the ticker back.
#[derive(Clone)]
pub struct FrameBus {
    frames_tx: broadcast::Sender<FramePacket>,
}

impl FrameBus {
    pub fn new(capacity: usize) -> Self {
        let (frames_tx, _) = broadcast::channel::<FramePacket>(capacity.max(1));
        Self { frames_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FramePacket> {
        self.frames_tx.subscribe()
    }

    pub fn has_subscribers(&self) -> bool {
        self.frames_tx.receiver_count() > 0
    }

    /// Returns how many subscribers received the packet.
    pub fn publish(&self, packet: FramePacket) -> usize {
        self.frames_tx.send(packet).unwrap_or(0)
    }
}

impl Default for FrameBus {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn packet(generation: u64) -> FramePacket {
        FramePacket::new(
            generation,
            UNIX_EPOCH + Duration::from_millis(1_500),
            RgbImage::new(4, 2),
        )
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bus = FrameBus::default();
        assert!(!bus.has_subscribers());
        assert_eq!(bus.publish(packet(1)), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_packets() {
        let bus = FrameBus::new(4);
        let mut rx = bus.subscribe();
        assert_eq!(bus.publish(packet(3)), 1);
        let received = rx.recv().await.unwrap();
        assert_eq!(received.generation, 3);
        assert_eq!(received.ts_millis, 1_500);
        assert_eq!((received.width, received.height), (4, 2));
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_old_frames() {
        let bus = FrameBus::new(1);
        let mut rx = bus.subscribe();
        bus.publish(packet(1));
        bus.publish(packet(2));
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().generation, 2);
    }
}
