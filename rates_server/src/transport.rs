use crate::model::sink::UpdateSink;
use log::debug;
use rates_common::{RateUpdate, RatesError, Result};
use std::io::{ErrorKind, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

/// Outbound half of a subscriber's TCP connection.
///
/// Updates are written as newline-delimited JSON frames. Any write error, including a
/// write that stalls past the configured timeout, is reported as `RatesError::Transport`.
pub struct TcpSink {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpSink {
    /// Wrap an accepted connection.
    pub fn new(stream: TcpStream, write_timeout: Duration) -> Result<Self> {
        let peer = stream.peer_addr()?;
        stream.set_write_timeout(Some(write_timeout))?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, peer })
    }

    /// Address of the subscriber.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl UpdateSink for TcpSink {
    fn push(&mut self, update: &RateUpdate) -> Result<()> {
        let frame = update.to_json_line()?;
        self.stream
            .write_all(&frame)
            .and_then(|()| self.stream.flush())
            .map_err(|e| RatesError::Transport(format!("{}: {}", self.peer, e)))?;
        debug!("Sent {} bytes to {}", frame.len(), self.peer);
        Ok(())
    }

    /// Peeks the socket without blocking. End of stream or a socket error means the
    /// subscriber is gone; pending bytes or `WouldBlock` mean it is still there.
    fn is_closed(&mut self) -> bool {
        if let Err(e) = self.stream.set_nonblocking(true) {
            debug!("Cannot poll {}: {}", self.peer, e);
            return true;
        }
        let closed = match self.stream.peek(&mut [0u8; 1]) {
            Ok(0) => true,
            Ok(_) => false,
            Err(e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(e) => {
                debug!("Poll of {} failed: {}", self.peer, e);
                true
            }
        };
        if let Err(e) = self.stream.set_nonblocking(false) {
            debug!("Cannot restore blocking mode for {}: {}", self.peer, e);
            return true;
        }
        closed
    }
}
