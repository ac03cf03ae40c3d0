//! Background datagram listener
//!
//! Owns one UDP socket on a dedicated thread. Each datagram is decoded and
//! applied to the shared [`ControlStore`]; bad packets are dropped. The
//! simulation never waits on this thread.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::control::ControlStore;
use crate::error::ListenerError;

use super::protocol;

/// Largest possible UDP payload, so no datagram is ever truncated
const MAX_DATAGRAM: usize = 64 * 1024;
/// How often a blocked receive wakes up to check for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Handle to a running listener
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl ListenerHandle {
    /// Address the socket is bound to (useful when binding port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the thread and wait for it. Returns the number of packets applied.
    pub fn shutdown(mut self) -> u64 {
        self.stop.store(true, Ordering::Relaxed);
        let applied = self
            .thread
            .take()
            .and_then(|thread| thread.join().ok())
            .unwrap_or(0);
        log::info!("Listener on {} stopped after {} packets", self.local_addr, applied);
        applied
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Bind the port and start the listener thread.
///
/// Binding happens on the caller's thread so a taken port is reported at
/// startup instead of silently ending the listener.
pub fn spawn(port: u16, store: ControlStore) -> Result<ListenerHandle, ListenerError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))
        .map_err(|source| ListenerError::Bind { port, source })?;
    spawn_on(socket, store)
}

/// Start a listener on an already-bound socket
pub fn spawn_on(socket: UdpSocket, store: ControlStore) -> Result<ListenerHandle, ListenerError> {
    socket
        .set_read_timeout(Some(POLL_INTERVAL))
        .map_err(ListenerError::Socket)?;
    let local_addr = socket.local_addr().map_err(ListenerError::Socket)?;

    let stop = Arc::new(AtomicBool::new(false));
    let thread = {
        let stop = Arc::clone(&stop);
        thread::Builder::new()
            .name("swarm-listener".to_owned())
            .spawn(move || receive_loop(&socket, &store, &stop))
            .map_err(ListenerError::Spawn)?
    };

    log::info!("Listening for control datagrams on {}", local_addr);
    Ok(ListenerHandle {
        local_addr,
        stop,
        thread: Some(thread),
    })
}

fn receive_loop(socket: &UdpSocket, store: &ControlStore, stop: &AtomicBool) -> u64 {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut applied = 0u64;

    while !stop.load(Ordering::Relaxed) {
        let len = match socket.recv_from(&mut buf) {
            Ok((len, _peer)) => len,
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(err) => {
                // e.g. ICMP port-unreachable surfacing on some platforms
                log::warn!("receive error: {}", err);
                thread::sleep(POLL_INTERVAL);
                continue;
            }
        };

        if let Some(command) = protocol::decode(&buf[..len]) {
            store.apply(command);
            applied += 1;
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{Behavior, Subject};
    use glam::Vec2;
    use std::time::Instant;

    fn wait_for(store: &ControlStore, revision: u64) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if store.snapshot().revision >= revision {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_loopback_updates_store() {
        let store = ControlStore::new();
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let handle = spawn_on(socket, store.clone()).unwrap();
        let target = handle.local_addr();

        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        sender.send_to(b"SUB:History", target).unwrap();
        assert!(wait_for(&store, 1));
        sender.send_to(b"HAND_R:0.5,0.25", target).unwrap();
        assert!(wait_for(&store, 2));
        sender.send_to(b"HAND_R:oops", target).unwrap();
        sender.send_to(b"CONFUSED", target).unwrap();
        assert!(wait_for(&store, 3));

        let state = store.snapshot();
        assert_eq!(state.subject, Subject::History);
        assert!(!state.manual_override);
        assert_eq!(state.right, Some(Vec2::new(0.5, 0.25)));
        assert_eq!(*state.active_behavior(), Behavior::Confused);

        assert_eq!(handle.shutdown(), 3);
    }

    #[test]
    fn test_long_datagram_arrives_whole() {
        let store = ControlStore::new();
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let handle = spawn_on(socket, store.clone()).unwrap();

        let behavior = "x".repeat(4000);
        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        sender.send_to(behavior.as_bytes(), handle.local_addr()).unwrap();
        assert!(wait_for(&store, 1));

        let state = store.snapshot();
        assert_eq!(state.external_behavior, Behavior::Other(behavior));
        assert_eq!(handle.shutdown(), 1);
    }

    #[test]
    fn test_port_in_use_is_reported() {
        let taken = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();
        let err = spawn(port, ControlStore::new()).unwrap_err();
        assert!(matches!(err, ListenerError::Bind { port: p, .. } if p == port));
    }
}
