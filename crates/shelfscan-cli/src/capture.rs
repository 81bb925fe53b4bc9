//! Capture session: owns the frame source and gates detection.
//!
//! State machine:
//!
//! ```text
//! Idle -> Starting -> Ready -> Scanning -> Dispatched
//!            |          ^         |
//!            v          +-------- Rejected
//!       CameraError --(retry)--> Starting
//! ```
//!
//! While `Scanning`, [`CaptureSession::sample`] never touches the source,
//! so at most one dispatch runs per physical scan.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::input::LineInput;

/// Frame source acquisition errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Cannot access camera: {0}")]
    Unavailable(String),
}

/// A device producing frames (camera, keyboard-wedge scanner, ...).
#[async_trait(?Send)]
pub trait FrameSource {
    type Frame;

    /// Acquire the device. Rear-facing/preferred device selection is the
    /// source's own configuration.
    async fn open(&mut self) -> Result<(), CaptureError>;

    /// Latest frame, if one is available right now.
    fn grab(&mut self) -> Option<Self::Frame>;

    /// Stop producing frames; anything captured while paused is discarded.
    fn pause(&mut self);

    fn resume(&mut self);

    /// Release the device.
    fn close(&mut self);

    /// Whether the source can never produce another frame.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Finds a QR payload in a frame.
pub trait QrDetector<F> {
    fn detect(&self, frame: &F) -> Option<String>;
}

/// Observable state of a [`CaptureSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Starting,
    Ready,
    Scanning,
    Dispatched,
    Rejected,
    CameraError(String),
}

/// Exclusive owner of one frame source.
pub struct CaptureSession<S: FrameSource, D> {
    source: S,
    detector: D,
    state: CaptureState,
    scanning: bool,
    opened: bool,
}

impl<S, D> CaptureSession<S, D>
where
    S: FrameSource,
    D: QrDetector<S::Frame>,
{
    pub const fn new(source: S, detector: D) -> Self {
        Self {
            source,
            detector,
            state: CaptureState::Idle,
            scanning: false,
            opened: false,
        }
    }

    pub const fn state(&self) -> &CaptureState {
        &self.state
    }

    pub const fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Acquire the source. A session that is already running is left alone.
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if matches!(
            self.state,
            CaptureState::Ready | CaptureState::Scanning | CaptureState::Starting
        ) {
            return Ok(());
        }

        self.state = CaptureState::Starting;
        match self.source.open().await {
            Ok(()) => {
                self.opened = true;
                self.scanning = false;
                self.state = CaptureState::Ready;
                info!("capture ready");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "capture source unavailable");
                self.state = CaptureState::CameraError(e.to_string());
                Err(e)
            }
        }
    }

    /// Release and re-acquire the source.
    pub async fn retry(&mut self) -> Result<(), CaptureError> {
        self.stop();
        self.start().await
    }

    /// One sampling tick. Returns the decoded payload and enters `Scanning`
    /// (source paused) on a non-empty detection; frames without a code are
    /// ignored.
    pub fn sample(&mut self) -> Option<String> {
        if self.scanning || self.state != CaptureState::Ready {
            return None;
        }

        let frame = self.source.grab()?;
        let code = self
            .detector
            .detect(&frame)
            .filter(|code| !code.is_empty())?;

        self.scanning = true;
        self.source.pause();
        self.state = CaptureState::Scanning;
        debug!(len = code.len(), "code detected, capture paused");
        Some(code)
    }

    /// The scanned code was refused; go back to `Ready`.
    pub fn reject(&mut self) {
        self.state = CaptureState::Rejected;
        self.resume();
    }

    /// Resume sampling after a completed or cancelled flow.
    pub fn resume(&mut self) {
        if !self.opened {
            return;
        }
        self.scanning = false;
        self.source.resume();
        self.state = CaptureState::Ready;
    }

    /// The scan led away from this view; capture stays paused.
    pub fn dispatched(&mut self) {
        self.state = CaptureState::Dispatched;
    }

    /// Release the source and return to `Idle`.
    pub fn stop(&mut self) {
        if self.opened {
            self.source.close();
            self.opened = false;
            debug!("capture source released");
        }
        self.scanning = false;
        self.state = CaptureState::Idle;
    }
}

impl<S: FrameSource, D> Drop for CaptureSession<S, D> {
    fn drop(&mut self) {
        if self.opened {
            self.source.close();
        }
    }
}

// =============================================================================
// Terminal line source
// =============================================================================

/// Frame source over terminal lines: each line typed by a keyboard-wedge
/// scanner is one frame.
#[derive(Debug)]
pub struct LineSource {
    input: LineInput,
    paused: bool,
}

impl LineSource {
    pub const fn new(input: LineInput) -> Self {
        Self {
            input,
            paused: true,
        }
    }
}

#[async_trait(?Send)]
impl FrameSource for LineSource {
    type Frame = String;

    async fn open(&mut self) -> Result<(), CaptureError> {
        if self.input.is_closed() {
            return Err(CaptureError::Unavailable("scanner input is closed".into()));
        }
        let stale = self.input.drain();
        if stale > 0 {
            debug!(stale, "dropped input buffered before start");
        }
        self.paused = false;
        Ok(())
    }

    fn grab(&mut self) -> Option<String> {
        if self.paused {
            return None;
        }
        self.input.try_next()
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.input.drain();
        self.paused = false;
    }

    fn close(&mut self) {
        self.paused = true;
    }

    fn is_exhausted(&self) -> bool {
        self.input.is_closed()
    }
}

/// Treats a text frame as already decoded: the payload is the trimmed line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextDetector;

impl QrDetector<String> for TextDetector {
    fn detect(&self, frame: &String) -> Option<String> {
        let code = frame.trim();
        (!code.is_empty()).then(|| code.to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;

    /// Counters shared between a [`ScriptedSource`] and the test.
    #[derive(Debug, Default)]
    pub(crate) struct SourceLog {
        pub opens: usize,
        pub grabs: usize,
        pub pauses: usize,
        pub resumes: usize,
        pub closes: usize,
    }

    /// Replays a fixed list of frames; `None` entries are frames without a code.
    pub(crate) struct ScriptedSource {
        frames: VecDeque<Option<String>>,
        open_failures: usize,
        paused: bool,
        pub log: Rc<RefCell<SourceLog>>,
    }

    impl ScriptedSource {
        pub(crate) fn new<I, T>(frames: I) -> Self
        where
            I: IntoIterator<Item = Option<T>>,
            T: Into<String>,
        {
            Self {
                frames: frames.into_iter().map(|f| f.map(Into::into)).collect(),
                open_failures: 0,
                paused: false,
                log: Rc::default(),
            }
        }

        pub(crate) const fn failing_opens(mut self, n: usize) -> Self {
            self.open_failures = n;
            self
        }
    }

    #[async_trait(?Send)]
    impl FrameSource for ScriptedSource {
        type Frame = Option<String>;

        async fn open(&mut self) -> Result<(), CaptureError> {
            self.log.borrow_mut().opens += 1;
            if self.open_failures > 0 {
                self.open_failures -= 1;
                return Err(CaptureError::Unavailable("Permission denied".into()));
            }
            self.paused = false;
            Ok(())
        }

        fn grab(&mut self) -> Option<Self::Frame> {
            self.log.borrow_mut().grabs += 1;
            if self.paused {
                return None;
            }
            self.frames.pop_front()
        }

        fn pause(&mut self) {
            self.log.borrow_mut().pauses += 1;
            self.paused = true;
        }

        fn resume(&mut self) {
            self.log.borrow_mut().resumes += 1;
            self.paused = false;
        }

        fn close(&mut self) {
            self.log.borrow_mut().closes += 1;
        }

        fn is_exhausted(&self) -> bool {
            self.frames.is_empty()
        }
    }

    /// Frames are pre-decoded payloads.
    pub(crate) struct PassthroughDetector;

    impl QrDetector<Option<String>> for PassthroughDetector {
        fn detect(&self, frame: &Option<String>) -> Option<String> {
            frame.clone()
        }
    }
}
