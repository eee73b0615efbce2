//! Loopback listener that accepts connections and never answers, so every
//! request ends in a client-side timeout.

#![allow(dead_code)]

use std::net::TcpListener;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

pub struct SilentAgent {
    port: u16,
    held: Arc<Mutex<Vec<TcpStream>>>,
}

impl SilentAgent {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind silent agent");
        let port = listener.local_addr().expect("local addr").port();
        let held = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&held);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                sink.lock().unwrap().push(stream);
            }
        });

        Self { port, held }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Connections accepted so far. Each timed-out request leaves one behind.
    pub fn connections(&self) -> usize {
        self.held.lock().unwrap().len()
    }
}
