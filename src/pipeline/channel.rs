//! Bounded channels connecting pipeline stages.
//!
//! Thin wrappers over `std::sync::mpsc::sync_channel` with the semantics
//! the executor relies on: a full channel blocks the producer
//! (backpressure), and a closed channel is the cancellation signal, not an
//! error condition.

use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

use crate::object::Object;

/// Default bounded capacity of a stage channel.
pub const DEFAULT_CAPACITY: usize = 64;

/// The peer end of the channel is gone; the stage should wind down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelClosed;

/// Sending half of a stage channel. Cloned for stream merges.
#[derive(Clone)]
pub struct StageSender(SyncSender<Object>);

/// Receiving half of a stage channel, owned exclusively by one stage.
pub struct StageReceiver(Receiver<Object>);

/// Create a bounded stage channel.
#[must_use]
pub fn stage_channel(capacity: usize) -> (StageSender, StageReceiver) {
    let (tx, rx) = sync_channel(capacity);
    (StageSender(tx), StageReceiver(rx))
}

impl StageSender {
    /// Blocking send; returns [`ChannelClosed`] when the consumer is gone.
    pub fn send(&self, object: Object) -> Result<(), ChannelClosed> {
        self.0.send(object).map_err(|_| ChannelClosed)
    }
}

impl StageReceiver {
    /// Blocking receive; `None` when the producer closed the channel.
    #[must_use]
    pub fn recv(&self) -> Option<Object> {
        self.0.recv().ok()
    }

    /// Discard everything still buffered or in flight.
    pub fn drain(&self) {
        while self.recv().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fifo_order_is_preserved() {
        let (tx, rx) = stage_channel(4);
        for i in 0..4 {
            tx.send(Object::text(i.to_string())).expect("send");
        }
        drop(tx);
        let got: Vec<String> = std::iter::from_fn(|| rx.recv())
            .map(|o| o.to_display_string())
            .collect();
        assert_eq!(got, vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn send_after_receiver_drop_reports_closed() {
        let (tx, rx) = stage_channel(1);
        drop(rx);
        assert_eq!(tx.send(Object::text("x")), Err(ChannelClosed));
    }

    #[test]
    fn bounded_capacity_blocks_until_consumed() {
        let (tx, rx) = stage_channel(1);
        tx.send(Object::text("first")).expect("send");
        let producer = thread::spawn(move || {
            // Blocks until the consumer makes room.
            tx.send(Object::text("second")).expect("send");
        });
        assert_eq!(rx.recv().map(|o| o.to_display_string()), Some("first".into()));
        assert_eq!(rx.recv().map(|o| o.to_display_string()), Some("second".into()));
        producer.join().expect("producer join");
        assert_eq!(rx.recv(), None);
    }
}
