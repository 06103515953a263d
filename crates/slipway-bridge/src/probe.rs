use bytes::Bytes;

use crate::error::{BridgeError, Result};

/// Liveness-probe responder configuration.
///
/// Three opaque byte blobs, fixed at construction: a request pattern that
/// is matched against incoming datagrams by verbatim sub-sequence
/// containment, and the canned responses for the serial channel being up
/// or down. The bridge answers matching datagrams directly on the UDP side
/// without involving the serial device.
#[derive(Debug, Clone)]
pub struct StatusProbe {
    request: Bytes,
    up_response: Bytes,
    down_response: Bytes,
}

impl StatusProbe {
    /// Build a probe responder. The request pattern must be non-empty;
    /// an empty pattern would match every datagram.
    pub fn new(
        request: impl Into<Bytes>,
        up_response: impl Into<Bytes>,
        down_response: impl Into<Bytes>,
    ) -> Result<Self> {
        let request = request.into();
        if request.is_empty() {
            return Err(BridgeError::EmptyProbePattern);
        }
        Ok(Self {
            request,
            up_response: up_response.into(),
            down_response: down_response.into(),
        })
    }

    /// True when the datagram contains the request pattern anywhere.
    pub(crate) fn matches(&self, datagram: &[u8]) -> bool {
        contains(datagram, &self.request)
    }

    /// The canned response for the given serial state.
    pub(crate) fn response(&self, serial_open: bool) -> Bytes {
        if serial_open {
            self.up_response.clone()
        } else {
            self.down_response.clone()
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|window| window == needle)
}
