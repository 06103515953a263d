use bytes::{Bytes, BytesMut};

/// Outbound byte queue for one bridge direction.
///
/// Writes follow a single-writer discipline: everything queued since the
/// last completed write is claimed as one in-flight snapshot, and no new
/// claim is possible until that snapshot is marked complete. Data arriving
/// while a write is outstanding lands in `pending` only; it is never
/// spliced into the in-flight buffer.
#[derive(Debug, Default)]
pub(crate) struct SendQueue {
    pending: BytesMut,
    in_flight: Option<Bytes>,
}

impl SendQueue {
    /// Append data behind any in-flight write.
    pub(crate) fn push(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    /// Claim the entire pending queue as the next in-flight write.
    ///
    /// Returns `None` while a write is outstanding or when nothing is
    /// pending. The caller that owns the outstanding write picks up the
    /// rest after completing it, so a `None` here never strands data.
    pub(crate) fn begin_write(&mut self) -> Option<Bytes> {
        if self.in_flight.is_some() || self.pending.is_empty() {
            return None;
        }
        let batch = self.pending.split().freeze();
        self.in_flight = Some(batch.clone());
        Some(batch)
    }

    /// Mark the in-flight write finished, allowing the next claim.
    pub(crate) fn complete_write(&mut self) {
        self.in_flight = None;
    }
}
