// Listener setup
// Builds the TCP listener through socket2 so socket options are explicit.

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create a non-blocking `TcpListener` with `SO_REUSEADDR` enabled, so the
/// process can rebind quickly after a restart while old sockets sit in
/// TIME_WAIT.
pub fn create_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_an_ephemeral_port() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }
}
