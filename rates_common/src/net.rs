//! Shared networking constants and helpers used by client and server.

/// TCP port on which the server accepts subscriptions and streams updates back.
pub const SUBSCRIBE_PORT: u16 = 50051;

/// Helper to format an IP address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_joins_ip_and_port() {
        assert_eq!(addr("127.0.0.1", SUBSCRIBE_PORT), "127.0.0.1:50051");
    }
}
