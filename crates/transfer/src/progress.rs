use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::UploadReceipt;

/// Upper bound for byte-accounted and synthetic progress.
///
/// The last 10% is reserved for finalization on the node side: the body
/// can be fully streamed while the node is still hashing and pinning.
pub const PROGRESS_CAP: u8 = 90;

/// Buffered progress events per upload.
const CHANNEL_CAPACITY: usize = 64;

/// Tick interval of the synthetic ramp.
const RAMP_INTERVAL: Duration = Duration::from_millis(200);

/// Percentage points the ramp advances per tick.
const RAMP_STEP: u8 = 3;

/// One event on an upload's progress channel.
///
/// `Progress` events are strictly increasing; the stream ends with exactly
/// one `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Progress { upload_id: Uuid, pct: u8 },
    Completed { upload_id: Uuid, receipt: UploadReceipt },
    Failed { upload_id: Uuid, message: String },
}

impl TransferEvent {
    /// Whether this event terminates the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferEvent::Progress { .. })
    }

    /// The upload this event belongs to.
    pub fn upload_id(&self) -> Uuid {
        match self {
            TransferEvent::Progress { upload_id, .. }
            | TransferEvent::Completed { upload_id, .. }
            | TransferEvent::Failed { upload_id, .. } => *upload_id,
        }
    }
}

struct Shared {
    last_pct: AtomicU8,
    terminal: AtomicBool,
}

/// Producer handle for an upload's progress channel.
///
/// Clones share the same channel and monotonic state, so multiple
/// producers (byte counter + ramp) cannot emit out-of-order or duplicate
/// percentages, and only the first terminal event wins.
#[derive(Clone)]
pub struct ProgressSender {
    upload_id: Uuid,
    tx: mpsc::Sender<TransferEvent>,
    shared: Arc<Shared>,
}

/// Creates the progress channel for one upload.
pub fn progress_channel(upload_id: Uuid) -> (ProgressSender, mpsc::Receiver<TransferEvent>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let sender = ProgressSender {
        upload_id,
        tx,
        shared: Arc::new(Shared {
            last_pct: AtomicU8::new(0),
            terminal: AtomicBool::new(false),
        }),
    };
    (sender, rx)
}

impl ProgressSender {
    pub fn upload_id(&self) -> Uuid {
        self.upload_id
    }

    /// Highest percentage emitted so far.
    pub fn last_pct(&self) -> u8 {
        self.shared.last_pct.load(Ordering::Relaxed)
    }

    /// Whether a terminal event has already been sent.
    pub fn is_terminal(&self) -> bool {
        self.shared.terminal.load(Ordering::Relaxed)
    }

    /// Emits a progress percentage.
    ///
    /// Capped at [`PROGRESS_CAP`]; values that do not advance past the
    /// previous emission are dropped, as is everything after a terminal
    /// event. Lossy under backpressure — progress is cosmetic, the
    /// terminal event is not.
    pub fn send_pct(&self, pct: u8) {
        if self.is_terminal() {
            return;
        }
        let pct = pct.min(PROGRESS_CAP);
        let prev = self.shared.last_pct.fetch_max(pct, Ordering::Relaxed);
        if pct <= prev {
            return;
        }
        let _ = self.tx.try_send(TransferEvent::Progress {
            upload_id: self.upload_id,
            pct,
        });
    }

    /// Terminates the stream with a success event.
    ///
    /// No-op if the stream is already terminal.
    pub async fn complete(&self, receipt: UploadReceipt) {
        if self.shared.terminal.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self
            .tx
            .send(TransferEvent::Completed {
                upload_id: self.upload_id,
                receipt,
            })
            .await;
    }

    /// Terminates the stream with a failure event.
    ///
    /// No-op if the stream is already terminal.
    pub async fn fail(&self, message: impl Into<String>) {
        if self.shared.terminal.swap(true, Ordering::SeqCst) {
            return;
        }
        let message = message.into();
        tracing::debug!(upload = %self.upload_id, error = %message, "transfer failed");
        let _ = self
            .tx
            .send(TransferEvent::Failed {
                upload_id: self.upload_id,
                message,
            })
            .await;
    }
}

/// Spawns the synthetic progress ramp for an upload.
///
/// While the transfer is active the ramp walks the percentage toward
/// [`PROGRESS_CAP`] on a fixed tick, covering endpoints that deliver no
/// byte-accounted signal. The shared monotonic state in
/// [`ProgressSender`] keeps it from ever stepping backwards relative to
/// the real signal. The task exits when the stream turns terminal.
pub fn spawn_ramp(sender: ProgressSender) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(RAMP_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick fires immediately; skip it so the ramp starts at
        // one step above zero, not at zero.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if sender.is_terminal() {
                break;
            }
            let next = sender.last_pct().saturating_add(RAMP_STEP);
            sender.send_pct(next);
        }
    })
}
