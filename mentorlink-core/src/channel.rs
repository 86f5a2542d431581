//! Push channel write side

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::ChannelError;
use crate::sse::Frame;

/// Something a frame can be pushed into.
///
/// `send` must not block: the registry calls it for every matching
/// connection in turn.
pub trait Channel: Send + Sync + 'static {
    fn send(&self, frame: Frame) -> Result<(), ChannelError>;
}

impl<T: Channel + ?Sized> Channel for Arc<T> {
    fn send(&self, frame: Frame) -> Result<(), ChannelError> {
        (**self).send(frame)
    }
}

impl<T: Channel + ?Sized> Channel for Box<T> {
    fn send(&self, frame: Frame) -> Result<(), ChannelError> {
        (**self).send(frame)
    }
}

/// Bounded mpsc sender feeding one streaming response.
pub struct MpscChannel {
    tx: mpsc::Sender<Frame>,
    dropped: AtomicU64,
}

impl MpscChannel {
    /// Create a channel and the receiver its response stream reads from.
    ///
    /// Capacity is clamped to at least one frame.
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// Frames dropped because the consumer fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Channel for MpscChannel {
    fn send(&self, frame: Frame) -> Result<(), ChannelError> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(ChannelError::Full)
            }
            Err(TrySendError::Closed(_)) => Err(ChannelError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_receiver() {
        let (chan, mut rx) = MpscChannel::pair(4);
        chan.send(Frame::text("one")).unwrap();
        assert_eq!(rx.recv().await.unwrap().data(), "one");
    }

    #[test]
    fn full_channel_counts_dropped() {
        let (chan, _rx) = MpscChannel::pair(1);
        chan.send(Frame::text("a")).unwrap();
        assert_eq!(chan.send(Frame::text("b")), Err(ChannelError::Full));
        assert_eq!(chan.dropped(), 1);
    }

    #[test]
    fn dropped_receiver_is_closed() {
        let (chan, rx) = MpscChannel::pair(4);
        drop(rx);
        assert!(chan.is_closed());
        assert_eq!(chan.send(Frame::text("a")), Err(ChannelError::Closed));
        assert_eq!(chan.dropped(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (chan, _rx) = MpscChannel::pair(0);
        assert!(chan.send(Frame::text("a")).is_ok());
    }
}
