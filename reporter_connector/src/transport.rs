// Std.
use std::io::prelude::*;
use std::net::*;
use std::time::Duration;

/// Socket operations that the reporter service needs to deliver a report.
pub trait ReportTransport {
    type Stream: Read + Write;

    /// Resolves host and port to addresses to connect to.
    fn resolve(&mut self, host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>>;

    /// Makes a single connection attempt (tries all addresses in order).
    ///
    /// ## Return
    /// Error of the last address that failed.
    fn connect(&mut self, addrs: &[SocketAddr]) -> std::io::Result<Self::Stream>;

    /// Prepares a connected stream for small writes, errors are ignored.
    fn tune(&mut self, stream: &Self::Stream);

    /// Signals that nothing else will be sent and closes the stream.
    fn close(&mut self, stream: Self::Stream);
}

/// Plain TCP transport.
pub struct TcpTransport {
    connect_timeout: Duration,
    io_timeout: Option<Duration>,
}

impl TcpTransport {
    /// ## Arguments
    /// * `connect_timeout`: timeout of a connection to a single address, zero to use
    /// the system's default timeout.
    /// * `io_timeout`: read/write timeout of the connected socket, `None` to block forever.
    pub fn new(connect_timeout: Duration, io_timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout,
            io_timeout,
        }
    }
}

impl ReportTransport for TcpTransport {
    type Stream = TcpStream;

    fn resolve(&mut self, host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();

        if addrs.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no addresses found",
            ));
        }

        Ok(addrs)
    }

    fn connect(&mut self, addrs: &[SocketAddr]) -> std::io::Result<TcpStream> {
        let mut last_error = std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no addresses to connect to",
        );

        for addr in addrs {
            let result = if self.connect_timeout.is_zero() {
                TcpStream::connect(addr)
            } else {
                TcpStream::connect_timeout(addr, self.connect_timeout)
            };

            match result {
                Ok(socket) => return Ok(socket),
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }

    fn tune(&mut self, stream: &TcpStream) {
        // Disable Nagle algorithm.
        let _ = stream.set_nodelay(true);

        if self.io_timeout.is_some() {
            let _ = stream.set_read_timeout(self.io_timeout);
            let _ = stream.set_write_timeout(self.io_timeout);
        }
    }

    fn close(&mut self, stream: TcpStream) {
        let _ = stream.shutdown(Shutdown::Write);
    }
}
