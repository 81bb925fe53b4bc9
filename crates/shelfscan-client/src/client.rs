//! Attendance backend client.
//!
//! Every call is a single request: nothing is retried, and a 429 surfaces
//! as [`ApiError::RateLimited`] so callers can stay quiet about throttling.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shelfscan_core::Hours;
use shelfscan_core::config::ApiConfig;
use tracing::{debug, warn};

use crate::error::{ApiError, detail_message};
use crate::types::{
    AttendanceEnvelope, AttendanceRecord, AttendanceRequest, BorrowRequest, BorrowedResponse,
    MessageResponse, ReturnRequest, StudentBorrows, StudentHours, StudentsEnvelope, TokenRequest,
};

/// Attendance backend REST client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("base_url is empty".into()));
        }

        // reqwest is built with `rustls-no-provider`; `Err` means a provider
        // is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-success statuses to [`ApiError`], reading the `detail` body.
    pub(crate) async fn check_status(
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            debug!(url = %resp.url(), "request throttled");
            return Err(ApiError::RateLimited);
        }

        let url = resp.url().clone();
        let body = resp.text().await.unwrap_or_default();
        let detail = detail_message(&body);
        warn!(%url, status = status.as_u16(), detail = ?detail, "API request rejected");
        Err(ApiError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        let resp = Self::check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let resp = self.http.get(self.url(path)).send().await?;
        let resp = Self::check_status(resp).await?;
        Ok(resp.json().await?)
    }

    // =========================================================================
    // Student actions
    // =========================================================================

    /// Record attendance for the token holder.
    pub async fn post_attendance(
        &self,
        token: &str,
        hours: Hours,
    ) -> Result<MessageResponse, ApiError> {
        require(token, "token")?;
        self.post("/attendance", &AttendanceRequest { token, hours })
            .await
    }

    /// Borrow a book.
    pub async fn borrow(&self, request: &BorrowRequest) -> Result<MessageResponse, ApiError> {
        require(&request.token, "token")?;
        require(&request.isbn, "isbn")?;
        self.post("/borrow", request).await
    }

    /// Check whether the token holder currently has a book out.
    pub async fn borrowed(&self, token: &str) -> Result<BorrowedResponse, ApiError> {
        require(token, "token")?;
        self.post("/borrowed", &TokenRequest { token }).await
    }

    /// Return a borrowed book.
    pub async fn return_book(&self, token: &str, isbn: &str) -> Result<MessageResponse, ApiError> {
        require(token, "token")?;
        require(isbn, "isbn")?;
        self.post("/returnbook", &ReturnRequest { token, isbn })
            .await
    }

    // =========================================================================
    // Admin reports
    // =========================================================================

    /// Students ranked by total attended hours.
    pub async fn top_attendance(&self) -> Result<Vec<StudentHours>, ApiError> {
        let envelope: StudentsEnvelope<StudentHours> =
            self.get("/admin/top-attendance").await?;
        Ok(envelope.students)
    }

    /// Students ranked by number of books borrowed.
    pub async fn most_borrowed(&self) -> Result<Vec<StudentBorrows>, ApiError> {
        let envelope: StudentsEnvelope<StudentBorrows> =
            self.get("/admin/most-borrowed-books").await?;
        Ok(envelope.students)
    }

    /// Attendance recorded today, newest first.
    pub async fn today_attendance(&self) -> Result<Vec<AttendanceRecord>, ApiError> {
        let envelope: AttendanceEnvelope = self.get("/admin/today-attendance").await?;
        Ok(envelope.attendance)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::MissingField(field))
    } else {
        Ok(())
    }
}
