//! Shared frame source
//!
//! The capture resource (one camera, one screen grabber) must have exactly
//! one owner. A single producer task pulls frames from the [`FrameSource`]
//! and publishes each into a latest-frame cell (`tokio::sync::watch`);
//! subscriber workers only ever read the cell, never the device.
//!
//! The cell gives the backpressure policy for free: it holds one value and
//! replaces it on publish, so a subscriber slower than the producer cadence
//! observes a suffix of the publish sequence ending at the newest frame.
//! Nothing is queued, nothing is reordered, and no subscriber can stall the
//! producer.

pub mod frame;

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::Result;
use crate::stats::RelayStats;

pub use frame::VideoFrame;

/// Receive side of the latest-frame cell
pub type FrameReceiver = watch::Receiver<Option<VideoFrame>>;

/// Publish side of the latest-frame cell
pub type FrameSender = watch::Sender<Option<VideoFrame>>;

/// Producer of raw video frames (the capture collaborator).
///
/// Called once per relay iteration by the single producer task. An `Err`
/// (`Error::SourceUnavailable` for a busy or failed device) is fatal to the
/// producer task; the relay itself keeps running.
pub trait FrameSource: Send + 'static {
    /// Produce the next frame at the source's own cadence
    fn next_frame(&mut self) -> impl std::future::Future<Output = Result<VideoFrame>> + Send;
}

/// Create an empty latest-frame cell
pub fn frame_cell() -> (Arc<FrameSender>, FrameReceiver) {
    let (tx, rx) = watch::channel(None);
    (Arc::new(tx), rx)
}

/// Drive a frame source until it fails.
///
/// Publishes every produced frame into the cell. On source failure the
/// task logs and exits; the cell (owned by the relay) stays alive, so
/// subscribers simply see no further frames until another source is
/// attached.
pub async fn run_producer<S>(mut source: S, cell: Arc<FrameSender>, stats: Arc<RelayStats>)
where
    S: FrameSource,
{
    loop {
        match source.next_frame().await {
            Ok(frame) => {
                stats.record_frame_published();
                cell.send_replace(Some(frame));
            }
            Err(e) => {
                tracing::error!(error = %e, "Frame source stopped producing");
                break;
            }
        }
    }
}
