use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use crate::progress::{PROGRESS_CAP, ProgressSender};

/// Body stream wrapper that feeds byte counts into a progress channel.
///
/// Each chunk that passes through advances the upload's percentage,
/// scaled into `[0, PROGRESS_CAP]` against the expected total. The
/// wrapper is transparent otherwise: chunks and errors pass through
/// untouched.
pub struct CountingStream<S> {
    inner: S,
    total: u64,
    transferred: u64,
    sender: ProgressSender,
}

impl<S> CountingStream<S> {
    /// Wraps `inner`, expecting `total` bytes overall.
    pub fn new(inner: S, total: u64, sender: ProgressSender) -> Self {
        Self {
            inner,
            total,
            transferred: 0,
            sender,
        }
    }

    /// Bytes observed so far.
    pub fn transferred(&self) -> u64 {
        self.transferred
    }
}

impl<S, E> Stream for CountingStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let me = self.get_mut();
        match Pin::new(&mut me.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                me.transferred += chunk.len() as u64;
                let pct = if me.total == 0 {
                    PROGRESS_CAP
                } else {
                    (me.transferred.min(me.total) * u64::from(PROGRESS_CAP) / me.total) as u8
                };
                me.sender.send_pct(pct);
                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }
}
