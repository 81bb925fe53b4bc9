//! Line-oriented terminal input.
//!
//! Keyboard-wedge QR scanners type the decoded payload followed by Enter,
//! into the same terminal the kiosk prompts read from. A single reader thread
//! owns stdin and forwards lines; the frame source and the prompts share
//! one [`LineInput`] handle and take turns draining it.

use std::io::{self, BufRead};
use std::rc::Rc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 64;

/// Shared receiving end of the terminal line stream.
#[derive(Debug, Clone)]
pub struct LineInput {
    rx: Rc<Mutex<mpsc::Receiver<String>>>,
}

impl LineInput {
    /// Create an input fed by the returned sender.
    pub fn channel() -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (
            tx,
            Self {
                rx: Rc::new(Mutex::new(rx)),
            },
        )
    }

    /// Start the stdin reader on a dedicated OS thread, outside the runtime's
    /// blocking pool.
    pub fn stdin() -> Self {
        let (tx, input) = Self::channel();
        let spawned = std::thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            let line = line.trim_end_matches('\r').to_string();
                            if tx.blocking_send(line).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "stdin read failed");
                            return;
                        }
                    }
                }
                debug!("stdin closed");
            });
        if let Err(e) = spawned {
            warn!(error = %e, "could not start stdin reader");
        }
        input
    }

    /// Next buffered line without waiting. `None` if nothing is buffered or
    /// another reader currently holds the stream.
    pub fn try_next(&self) -> Option<String> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }

    /// Wait for the next line. `None` once the stream is closed.
    pub async fn next_line(&self) -> Option<String> {
        self.rx.lock().await.recv().await
    }

    /// Discard everything currently buffered. Returns how many lines were dropped.
    pub fn drain(&self) -> usize {
        let Ok(mut rx) = self.rx.try_lock() else {
            return 0;
        };
        let mut dropped = 0;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Whether the writer side is gone and nothing is left to read.
    pub fn is_closed(&self) -> bool {
        self.rx
            .try_lock()
            .is_ok_and(|rx| rx.is_closed() && rx.is_empty())
    }
}
