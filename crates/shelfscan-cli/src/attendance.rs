//! Attendance submission and the hours sub-flow.

use async_trait::async_trait;
use shelfscan_client::{ApiClient, ApiError, MessageResponse};
use shelfscan_core::Hours;
use tracing::{debug, info};

use crate::feedback::Notifier;
use crate::flows::FlowOutcome;
use crate::prompt::{Prompt, PromptError};

pub const RECORDED: &str = "Attendance recorded successfully.";
pub const MISSING_TOKEN: &str = "Missing QR token.";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Backend call behind [`AttendanceSubmitter`].
#[async_trait(?Send)]
pub trait AttendanceApi {
    async fn post_attendance(&self, token: &str, hours: Hours)
    -> Result<MessageResponse, ApiError>;
}

#[async_trait(?Send)]
impl AttendanceApi for ApiClient {
    async fn post_attendance(
        &self,
        token: &str,
        hours: Hours,
    ) -> Result<MessageResponse, ApiError> {
        ApiClient::post_attendance(self, token, hours).await
    }
}

/// Posts one attendance record and tells the user how it went.
///
/// Every call produces exactly one notice, except HTTP 429 which is only
/// logged. Nothing is retried.
pub struct AttendanceSubmitter<'a, A: ?Sized, N: ?Sized> {
    api: &'a A,
    notifier: &'a N,
}

impl<'a, A, N> AttendanceSubmitter<'a, A, N>
where
    A: AttendanceApi + ?Sized,
    N: Notifier + ?Sized,
{
    pub const fn new(api: &'a A, notifier: &'a N) -> Self {
        Self { api, notifier }
    }

    pub async fn submit(&self, token: &str, hours: Hours) -> Result<MessageResponse, ApiError> {
        if token.trim().is_empty() {
            self.notifier.warning(MISSING_TOKEN);
            return Err(ApiError::MissingField("token"));
        }

        match self.api.post_attendance(token, hours).await {
            Ok(resp) => {
                info!(hours = hours.get(), "attendance recorded");
                self.notifier
                    .success(resp.message.as_deref().unwrap_or(RECORDED));
                Ok(resp)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    fn report(&self, error: &ApiError) {
        match error {
            ApiError::RateLimited => debug!("attendance throttled, not notifying"),
            ApiError::MissingField(_) => self.notifier.warning(MISSING_TOKEN),
            ApiError::Api {
                detail: Some(detail),
                ..
            } => self.notifier.warning(detail),
            _ => self.notifier.error(GENERIC_FAILURE),
        }
    }
}

/// Ask for hours and submit until it succeeds or the user cancels.
pub async fn run_attendance<A, N, P>(
    submitter: &AttendanceSubmitter<'_, A, N>,
    prompt: &P,
    token: &str,
) -> Result<FlowOutcome, PromptError>
where
    A: AttendanceApi + ?Sized,
    N: Notifier + ?Sized,
    P: Prompt + ?Sized,
{
    loop {
        let Some(hours) = prompt.choose_hours().await? else {
            return Ok(FlowOutcome::Cancelled);
        };
        match submitter.submit(token, hours).await {
            Ok(_) => return Ok(FlowOutcome::Completed),
            Err(ApiError::MissingField(_)) => return Ok(FlowOutcome::Failed),
            Err(e) => debug!(error = %e, "attendance failed, asking again"),
        }
    }
}
