//! TCP acceptor for console sessions

use std::{
    io::{self, BufReader, BufWriter, Write},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crate::{
    error::{RingLogError, Result},
    state::LogStore,
};

use super::{config::ConsoleConfig, session::Session};

/// Running console server
///
/// Dropping the handle leaves the server running for the rest of the
/// process; call [`shutdown`](Self::shutdown) to stop it.
#[derive(Debug)]
pub struct ConsoleHandle {
    local_addr: SocketAddr,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ConsoleHandle {
    /// Address the server is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the acceptor thread to exit
    pub fn join(mut self) -> Result<()> {
        self.wait()
    }

    /// Stop accepting sessions and wait for the acceptor to exit
    ///
    /// A session in progress is served to completion first.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop.store(true, Ordering::SeqCst);
        // Wake the blocking accept
        if let Err(err) = TcpStream::connect(wake_addr(self.local_addr)) {
            log::debug!("Console wake-up connection failed: {}", err);
        }
        self.wait()
    }

    fn wait(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| RingLogError::concurrency("Console acceptor thread panicked")),
            None => Ok(()),
        }
    }
}

fn wake_addr(addr: SocketAddr) -> SocketAddr {
    match addr {
        SocketAddr::V4(v4) if v4.ip().is_unspecified() => {
            SocketAddr::new(Ipv4Addr::LOCALHOST.into(), v4.port())
        }
        SocketAddr::V6(v6) if v6.ip().is_unspecified() => {
            SocketAddr::new(Ipv6Addr::LOCALHOST.into(), v6.port())
        }
        other => other,
    }
}

/// Bind the console and serve sessions on a background thread
///
/// Sessions are served one at a time; the next connection is accepted
/// once the current session ends.
pub fn start<S>(store: S, config: ConsoleConfig) -> Result<ConsoleHandle>
where
    S: AsRef<LogStore> + Send + 'static,
{
    config.validate()?;
    let listener = TcpListener::bind(config.socket_addr())
        .map_err(|e| RingLogError::from_io(e, "Failed to bind console listener"))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| RingLogError::from_io(e, "Failed to read console address"))?;

    let stop = Arc::new(AtomicBool::new(false));
    let thread = {
        let stop = Arc::clone(&stop);
        thread::Builder::new()
            .name("ringlog-console".to_string())
            .spawn(move || accept_loop(listener, store.as_ref(), &config.banner, &stop))
            .map_err(|e| RingLogError::from_io(e, "Failed to spawn console thread"))?
    };

    log::info!("Console server listening on {}", local_addr);
    Ok(ConsoleHandle {
        local_addr,
        stop,
        thread: Some(thread),
    })
}

fn accept_loop(listener: TcpListener, store: &LogStore, banner: &str, stop: &AtomicBool) {
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                log::info!("Console session opened from {}", peer);
                // A panicking renderer ends its session, not the server
                let outcome = thread::scope(|scope| {
                    scope
                        .spawn(|| serve_connection(store, stream, banner))
                        .join()
                });
                match outcome {
                    Ok(Ok(())) => log::info!("Console session from {} closed", peer),
                    Ok(Err(err)) => log::warn!("Console session from {} failed: {}", peer, err),
                    Err(_) => log::error!("Console session from {} panicked", peer),
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                log::error!("Console accept failed: {}", err);
                break;
            }
        }
    }
    log::info!("Console server stopped");
}

/// Run one session over a connected socket
pub fn serve_connection(store: &LogStore, stream: TcpStream, banner: &str) -> io::Result<()> {
    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);
    writer.write_all(banner.as_bytes())?;
    Session::new(store, reader, writer).run()
}
