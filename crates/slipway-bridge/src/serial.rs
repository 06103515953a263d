use std::io::{self, Read, Write};
use std::time::Duration;

/// Byte-stream side of the bridge.
///
/// Implementations are blocking and are driven from the runtime's blocking
/// pool. Reads must return within a bounded interval so that channel
/// teardown is observed promptly; [`io::ErrorKind::TimedOut`] means
/// "no data yet" and re-arms the read loop.
pub trait SerialLink: Send {
    /// Read up to `buf.len()` bytes. `Ok(0)` signals end-of-stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write the whole buffer, flushing through to the device.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Opens a [`SerialLink`] by device name/path.
pub trait SerialConnector: Send + Sync {
    fn connect(&self, name: &str) -> io::Result<Box<dyn SerialLink>>;
}

/// [`SerialConnector`] for real serial devices at a fixed baud rate.
#[derive(Debug, Clone)]
pub struct SerialportConnector {
    pub baud_rate: u32,
    /// Poll interval for blocking reads; bounds how long `close` can lag
    /// behind an outstanding read.
    pub read_timeout: Duration,
}

impl SerialportConnector {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }
}

impl Default for SerialportConnector {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(20),
        }
    }
}

impl SerialConnector for SerialportConnector {
    fn connect(&self, name: &str) -> io::Result<Box<dyn SerialLink>> {
        let port = serialport::new(name, self.baud_rate)
            .timeout(self.read_timeout)
            .open()
            .map_err(io::Error::from)?;
        Ok(Box::new(PortLink { port }))
    }
}

struct PortLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialLink for PortLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }
}
