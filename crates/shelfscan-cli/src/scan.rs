//! The kiosk scan loop.
//!
//! Samples the capture session on a fixed interval, validates whatever it
//! detects and routes the holder. The interval is dropped while a code is
//! being handled and a fresh one starts when sampling resumes, so two
//! dispatches can never overlap.

use std::time::Duration;

use chrono::NaiveTime;
use shelfscan_core::OpeningHours;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::attendance::{AttendanceApi, AttendanceSubmitter, run_attendance};
use crate::capture::{CaptureError, CaptureSession, FrameSource, QrDetector};
use crate::dispatch::{Dispatch, Route, StudentChoice, rejection_notice};
use crate::feedback::Notifier;
use crate::prompt::{Prompt, PromptError};

/// Why the scan loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanExit {
    /// A scan navigated away from the scanner.
    Route(Route),
    /// Shutdown was requested or the input ended.
    Stopped,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("prompt failed: {0}")]
    Prompt(#[from] PromptError),
}

/// What to do with the session after one detected code.
enum Step {
    Rejected,
    Resume,
    Exit(Route),
    Stop,
}

fn ticker(period: Duration) -> Interval {
    let mut timer = tokio::time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

/// Start the session, retrying up to `attempts` times with `delay` between.
pub async fn start_with_retry<S, D, N>(
    session: &mut CaptureSession<S, D>,
    notifier: &N,
    attempts: u32,
    delay: Duration,
) -> Result<(), CaptureError>
where
    S: FrameSource,
    D: QrDetector<S::Frame>,
    N: Notifier + ?Sized,
{
    let mut attempt = 1;
    let mut result = session.start().await;
    while let Err(e) = &result {
        notifier.error(&e.to_string());
        if attempt >= attempts.max(1) {
            break;
        }
        attempt += 1;
        tokio::time::sleep(delay).await;
        debug!(attempt, "retrying capture start");
        result = session.retry().await;
    }
    result
}

/// Whether scanning may start at `time`; warns the user when it may not.
pub fn library_open<N: Notifier + ?Sized>(
    hours: &OpeningHours,
    time: NaiveTime,
    notifier: &N,
) -> bool {
    let status = hours.status(time);
    if !status.is_open() {
        notifier.warning(status.message());
    }
    status.is_open()
}

/// One scan loop over borrowed collaborators.
pub struct ScanLoop<'a, A: ?Sized, N: ?Sized, P: ?Sized> {
    api: &'a A,
    notifier: &'a N,
    prompt: &'a P,
    interval: Duration,
}

impl<'a, A, N, P> ScanLoop<'a, A, N, P>
where
    A: AttendanceApi + ?Sized,
    N: Notifier + ?Sized,
    P: Prompt + ?Sized,
{
    pub const fn new(api: &'a A, notifier: &'a N, prompt: &'a P, interval: Duration) -> Self {
        Self {
            api,
            notifier,
            prompt,
            interval,
        }
    }

    /// Run until a scan routes away or shutdown is signalled. The session
    /// must already be started; it is stopped on every exit.
    pub async fn run<S, D>(
        &self,
        session: &mut CaptureSession<S, D>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<ScanExit, ScanError>
    where
        S: FrameSource,
        D: QrDetector<S::Frame>,
    {
        let mut timer = ticker(self.interval);
        info!(interval = ?self.interval, "scanning");

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = shutdown.changed() => {
                    info!("scan loop shutting down");
                    session.stop();
                    return Ok(ScanExit::Stopped);
                }
            }

            let Some(code) = session.sample() else {
                if session.source().is_exhausted() {
                    info!("scanner input ended");
                    session.stop();
                    return Ok(ScanExit::Stopped);
                }
                continue;
            };

            let step = tokio::select! {
                step = self.handle(&code) => step,
                _ = shutdown.changed() => Ok(Step::Stop),
            };

            match step {
                Ok(Step::Rejected) => {
                    session.reject();
                    timer = ticker(self.interval);
                }
                Ok(Step::Resume) => {
                    session.resume();
                    timer = ticker(self.interval);
                }
                Ok(Step::Exit(route)) => {
                    info!(%route, "leaving scanner");
                    session.dispatched();
                    session.stop();
                    return Ok(ScanExit::Route(route));
                }
                Ok(Step::Stop) => {
                    session.stop();
                    return Ok(ScanExit::Stopped);
                }
                Err(e) => {
                    session.stop();
                    return Err(e);
                }
            }
        }
    }

    async fn handle(&self, code: &str) -> Result<Step, ScanError> {
        match Dispatch::from_payload(code) {
            Dispatch::Rejected(e) => {
                let (level, message) = rejection_notice(e);
                self.notifier.notify(level, message);
                Ok(Step::Rejected)
            }
            Dispatch::Teacher { token, claims } => {
                self.notifier
                    .success(&format!("Greetings {}", claims.fullname));
                Ok(Step::Exit(Route::Admin(token)))
            }
            Dispatch::Student(scan) => {
                let choice = match self.prompt.choose_action(&scan.user_name).await {
                    Ok(choice) => choice,
                    Err(PromptError::Closed) => return Ok(Step::Stop),
                    Err(e) => return Err(e.into()),
                };
                debug!(?choice, "student choice");
                match choice {
                    StudentChoice::Attendance => {
                        let submitter = AttendanceSubmitter::new(self.api, self.notifier);
                        match run_attendance(&submitter, self.prompt, scan.token.as_str()).await {
                            Ok(outcome) => debug!(?outcome, "attendance flow finished"),
                            Err(PromptError::Closed) => return Ok(Step::Stop),
                            Err(e) => warn!(error = %e, "attendance prompt failed"),
                        }
                        Ok(Step::Resume)
                    }
                    StudentChoice::Borrow => Ok(Step::Exit(Route::Borrow(scan.token))),
                    StudentChoice::Return => Ok(Step::Exit(Route::Return(scan.token))),
                    StudentChoice::Cancel => Ok(Step::Resume),
                }
            }
        }
    }
}
