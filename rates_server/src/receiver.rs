use crate::transport::TcpSink;
use crossbeam_channel::Sender;
use log::{error, info, warn};
use rates_common::{RatesError, Result, SubscribeRequest};
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

/// Longest subscription request line accepted, newline included.
pub const MAX_REQUEST_BYTES: u64 = 4096;

/// Subscription handshake decoded from a fresh connection.
pub type Subscription = (SubscribeRequest, TcpSink);

/// TCP receiver that accepts subscription requests.
///
/// Each accepted connection is expected to send one JSON `SubscribeRequest` line. The
/// decoded request is forwarded together with the connection, wrapped as a `TcpSink`,
/// so that the event loop can stream updates back on the same socket.
pub struct SubscriptionReceiver {
    /// The underlying TCP listening socket.
    pub(crate) socket: TcpListener,
    handshake_timeout: Duration,
    write_timeout: Duration,
}

impl SubscriptionReceiver {
    /// Bind a new receiver to the provided `bind_addr` (e.g., `0.0.0.0:50051`).
    pub fn new(bind_addr: &str, handshake_timeout: Duration, write_timeout: Duration) -> Result<Self> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self {
            socket,
            handshake_timeout,
            write_timeout,
        })
    }

    /// Address the receiver is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Blocking loop that accepts connections and forwards each decoded subscription
    /// to `tx`.
    ///
    /// Handshakes run on their own short-lived threads; a client that sends garbage,
    /// stalls, or trickles its request past the handshake timeout only loses its own
    /// connection.
    pub fn receive_loop_with_channel(self, tx: Sender<Subscription>) -> Result<()> {
        info!("Subscription TCP server is started on {}", self.socket.local_addr()?);

        for stream in self.socket.incoming() {
            match stream {
                Ok(stream) => {
                    let tx = tx.clone();
                    let handshake_timeout = self.handshake_timeout;
                    let write_timeout = self.write_timeout;
                    let deadline = Instant::now() + handshake_timeout;
                    thread::spawn(move || {
                        let peer = stream.peer_addr().ok();
                        if let Err(e) = handshake(stream, deadline, write_timeout, &tx) {
                            warn!("Rejected connection from {:?}: {}", peer, e);
                        }
                    });
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        Ok(())
    }
}

/// Complete one handshake and hand the subscription to the event loop.
fn handshake(
    stream: TcpStream,
    deadline: Instant,
    write_timeout: Duration,
    tx: &Sender<Subscription>,
) -> Result<()> {
    let subscription = accept_subscription(stream, deadline, write_timeout)?;
    let peer = subscription.1.peer();
    tx.send(subscription)
        .map_err(|e| RatesError::ChannelSend(format!("subscription from {}: {}", peer, e)))?;
    Ok(())
}

/// Read the subscription line from `stream` and wrap the connection as a sink.
///
/// The whole request must arrive before `deadline` and fit in `MAX_REQUEST_BYTES`.
fn accept_subscription(
    stream: TcpStream,
    deadline: Instant,
    write_timeout: Duration,
) -> Result<Subscription> {
    let line = read_request_line(&stream, deadline)?;
    let request = SubscribeRequest::from_json_line(&line)?;
    let sink = TcpSink::new(stream, write_timeout)?;
    info!("Received subscription request {:?} from {}", request, sink.peer());
    Ok((request, sink))
}

fn read_request_line(stream: &TcpStream, deadline: Instant) -> Result<String> {
    let mut reader = BufReader::new(stream.take(MAX_REQUEST_BYTES));
    let mut line = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(handshake_timed_out());
        }
        stream.set_read_timeout(Some(remaining))?;

        let (consumed, complete) = {
            let available = match reader.fill_buf() {
                Ok(available) => available,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(handshake_timed_out());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                let reason = if line.len() as u64 >= MAX_REQUEST_BYTES {
                    format!("subscription request exceeds {} bytes", MAX_REQUEST_BYTES)
                } else {
                    String::from("connection closed before subscription request")
                };
                return Err(RatesError::Format(reason));
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    line.extend_from_slice(&available[..=end]);
                    (end + 1, true)
                }
                None => {
                    line.extend_from_slice(available);
                    (available.len(), false)
                }
            }
        };
        reader.consume(consumed);
        if complete {
            break;
        }
    }
    stream.set_read_timeout(None)?;
    String::from_utf8(line).map_err(|e| RatesError::Format(e.to_string()))
}

fn handshake_timed_out() -> RatesError {
    RatesError::Format(String::from("subscription request not completed in time"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::Write;

    fn start_receiver() -> (SocketAddr, crossbeam_channel::Receiver<Subscription>) {
        start_receiver_with_timeout(Duration::from_secs(2))
    }

    fn start_receiver_with_timeout(
        handshake_timeout: Duration,
    ) -> (SocketAddr, crossbeam_channel::Receiver<Subscription>) {
        let receiver =
            SubscriptionReceiver::new("127.0.0.1:0", handshake_timeout, Duration::from_secs(1))
                .unwrap();
        let addr = receiver.local_addr().unwrap();
        let (tx, rx) = unbounded();
        thread::spawn(move || receiver.receive_loop_with_channel(tx));
        (addr, rx)
    }

    #[test]
    fn test_forwards_decoded_request() {
        let (addr, rx) = start_receiver();
        let mut client = TcpStream::connect(addr).unwrap();
        let request = SubscribeRequest::new("EUR", &["USD"]);
        client.write_all(&request.to_json_line().unwrap()).unwrap();

        let (received, sink) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received, request);
        assert_eq!(sink.peer(), client.local_addr().unwrap());
    }

    #[test]
    fn test_malformed_request_does_not_stop_receiver() {
        let (addr, rx) = start_receiver();
        let mut bad = TcpStream::connect(addr).unwrap();
        bad.write_all(b"not json\n").unwrap();

        let mut good = TcpStream::connect(addr).unwrap();
        good.write_all(&SubscribeRequest::new("GBP", &["PLN"]).to_json_line().unwrap())
            .unwrap();

        let (received, _) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received.base_currency, "GBP");
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_trickling_client_is_rejected_at_deadline() {
        let (addr, rx) = start_receiver_with_timeout(Duration::from_millis(300));
        let mut slow = TcpStream::connect(addr).unwrap();
        let request = SubscribeRequest::new("EUR", &["USD"]).to_json_line().unwrap();
        let started = Instant::now();
        let writer = thread::spawn(move || {
            for byte in request {
                if slow.write_all(&[byte]).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(100));
            }
        });

        assert!(rx.recv_timeout(Duration::from_secs(3)).is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
        writer.join().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_oversized_request_is_rejected() {
        let (addr, rx) = start_receiver();
        let mut flood = TcpStream::connect(addr).unwrap();
        let garbage = vec![b'x'; (MAX_REQUEST_BYTES * 2) as usize];
        let _ = flood.write_all(&garbage);

        assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());

        let mut good = TcpStream::connect(addr).unwrap();
        good.write_all(&SubscribeRequest::new("EUR", &["PLN"]).to_json_line().unwrap())
            .unwrap();
        let (received, _) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received.requested_currencies, vec![String::from("PLN")]);
    }

    #[test]
    fn test_request_split_across_writes_is_accepted() {
        let (addr, rx) = start_receiver();
        let mut client = TcpStream::connect(addr).unwrap();
        let request = SubscribeRequest::new("USD", &["GBP"]);
        let frame = request.to_json_line().unwrap();
        let (head, tail) = frame.split_at(frame.len() / 2);
        client.write_all(head).unwrap();
        thread::sleep(Duration::from_millis(50));
        client.write_all(tail).unwrap();

        let (received, _) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received, request);
    }

    #[test]
    fn test_closed_event_loop_reports_channel_send() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server_side, _) = listener.accept().unwrap();
        client
            .write_all(&SubscribeRequest::new("EUR", &["USD"]).to_json_line().unwrap())
            .unwrap();

        let (tx, rx) = unbounded();
        drop(rx);
        let deadline = Instant::now() + Duration::from_secs(2);
        let result = handshake(server_side, deadline, Duration::from_secs(1), &tx);
        assert!(matches!(result, Err(RatesError::ChannelSend(_))));
    }
}
