//! Librarian dashboard: attendance and borrowing reports.

use shelfscan_client::{ApiClient, ApiError, AttendanceRecord, StudentBorrows, StudentHours};
use shelfscan_core::RawToken;
use tracing::{info, warn};

use super::{FlowOutcome, recheck};
use crate::feedback::Notifier;
use crate::prompt::{Prompt, PromptError};

pub const INVALID_TOKEN: &str = "Invalid token";
pub const NOT_A_LIBRARIAN: &str = "You are not a Librarian";

const EMPTY: &str = "No records yet.";

pub struct AdminFlow<'a, N: ?Sized, P: ?Sized> {
    api: &'a ApiClient,
    notifier: &'a N,
    prompt: &'a P,
}

impl<'a, N, P> AdminFlow<'a, N, P>
where
    N: Notifier + ?Sized,
    P: Prompt + ?Sized,
{
    pub const fn new(api: &'a ApiClient, notifier: &'a N, prompt: &'a P) -> Self {
        Self {
            api,
            notifier,
            prompt,
        }
    }

    /// Show the three reports. A report that fails to load is skipped with
    /// a warning; the flow fails only when none could be loaded.
    pub async fn run(&self, token: &RawToken) -> Result<FlowOutcome, PromptError> {
        let claims = match recheck(token) {
            Some(scanned) if scanned.claims.is_teacher() => scanned.claims,
            _ => {
                self.notifier.error(NOT_A_LIBRARIAN);
                return Ok(FlowOutcome::Rejected);
            }
        };
        info!(srcode = %claims.srcode, "admin view opened");
        self.prompt
            .present(&format!("Librarian: {}", claims.fullname), &[])?;

        let mut shown = 0;
        shown += self.report(
            "Top attendance",
            self.api.top_attendance().await,
            top_attendance_lines,
        )?;
        shown += self.report(
            "Most borrowed books",
            self.api.most_borrowed().await,
            most_borrowed_lines,
        )?;
        shown += self.report(
            "Today's attendance",
            self.api.today_attendance().await,
            today_lines,
        )?;

        Ok(if shown == 0 {
            FlowOutcome::Failed
        } else {
            FlowOutcome::Completed
        })
    }

    fn report<T>(
        &self,
        title: &str,
        rows: Result<Vec<T>, ApiError>,
        render: fn(&[T]) -> Vec<String>,
    ) -> Result<usize, PromptError> {
        match rows {
            Ok(rows) => {
                let lines = if rows.is_empty() {
                    vec![EMPTY.to_string()]
                } else {
                    render(&rows)
                };
                self.prompt.present(title, &lines)?;
                Ok(1)
            }
            Err(e) => {
                warn!(report = title, error = %e, "report failed");
                self.notifier.warning(&format!("Failed to load {title}."));
                Ok(0)
            }
        }
    }
}

fn top_attendance_lines(rows: &[StudentHours]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| format!("{:>2}. {:<28} {:>4} h", i + 1, row.name, row.total_hours))
        .collect()
}

fn most_borrowed_lines(rows: &[StudentBorrows]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let unit = if row.books_borrowed == 1 { "book" } else { "books" };
            format!("{:>2}. {:<28} {:>4} {unit}", i + 1, row.name, row.books_borrowed)
        })
        .collect()
}

fn today_lines(rows: &[AttendanceRecord]) -> Vec<String> {
    rows.iter()
        .map(|row| format!("{:<8} {:<28} {:>2} h", row.time, row.name, row.hours))
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use mockito::Server;
    use serde_json::json;
    use shelfscan_core::config::ApiConfig;
    use shelfscan_core::token::testing::{student_token, teacher_token};

    use super::*;
    use crate::feedback::{Level, RecordingNotifier};
    use crate::prompt::testing::ScriptedPrompt;

    fn api(server: &Server) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: server.url(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    async fn json_mock(server: &mut Server, path: &str, body: serde_json::Value) -> mockito::Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn shows_all_three_reports() {
        let mut server = Server::new_async().await;
        let _top = json_mock(
            &mut server,
            "/admin/top-attendance",
            json!({"students": [{"name": "Ana Cruz", "total_hours": 42}]}),
        )
        .await;
        let _borrowed = json_mock(
            &mut server,
            "/admin/most-borrowed-books",
            json!({"students": [{"name": "Ben Reyes", "books_borrowed": 1}]}),
        )
        .await;
        let _today = json_mock(&mut server, "/admin/today-attendance", json!({"attendance": []})).await;

        let api = api(&server);
        let notes = RecordingNotifier::default();
        let prompt = ScriptedPrompt::default();
        let token = RawToken::parse(&teacher_token("T-01", "Maria Santos")).unwrap();

        let outcome = AdminFlow::new(&api, &notes, &prompt).run(&token).await.unwrap();

        assert_eq!(outcome, FlowOutcome::Completed);
        assert!(notes.notices().is_empty());
        let presented = prompt.presented();
        let titles: Vec<&str> = presented.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Librarian: Maria Santos",
                "Top attendance",
                "Most borrowed books",
                "Today's attendance",
            ]
        );
        assert!(presented[1].1[0].contains("Ana Cruz"));
        assert!(presented[1].1[0].ends_with("42 h"));
        assert!(presented[2].1[0].ends_with("1 book"));
        assert_eq!(presented[3].1, vec![EMPTY.to_string()]);
    }

    #[tokio::test]
    async fn failed_report_is_skipped_with_warning() {
        let mut server = Server::new_async().await;
        let _top = server
            .mock("GET", "/admin/top-attendance")
            .with_status(500)
            .create_async()
            .await;
        let _borrowed =
            json_mock(&mut server, "/admin/most-borrowed-books", json!({"students": []})).await;
        let _today = json_mock(&mut server, "/admin/today-attendance", json!({"attendance": []})).await;

        let api = api(&server);
        let notes = RecordingNotifier::default();
        let prompt = ScriptedPrompt::default();
        let token = RawToken::parse(&teacher_token("T-01", "Maria Santos")).unwrap();

        let outcome = AdminFlow::new(&api, &notes, &prompt).run(&token).await.unwrap();

        assert_eq!(outcome, FlowOutcome::Completed);
        assert_eq!(
            notes.notices(),
            vec![(Level::Warning, "Failed to load Top attendance.".to_string())]
        );
        assert_eq!(prompt.presented().len(), 3);
    }

    #[tokio::test]
    async fn student_is_not_a_librarian() {
        let server = Server::new_async().await;
        let api = api(&server);
        let notes = RecordingNotifier::default();
        let prompt = ScriptedPrompt::default();
        let token = RawToken::parse(&student_token("21-00001", "Ana Cruz")).unwrap();

        let outcome = AdminFlow::new(&api, &notes, &prompt).run(&token).await.unwrap();

        assert_eq!(outcome, FlowOutcome::Rejected);
        assert_eq!(notes.messages(), vec![NOT_A_LIBRARIAN.to_string()]);
        assert!(prompt.presented().is_empty());
    }

    #[test]
    fn today_lines_lead_with_time() {
        let rows = vec![AttendanceRecord {
            name: "Ana Cruz".into(),
            hours: 3,
            time: "09:15".into(),
        }];
        assert!(today_lines(&rows)[0].starts_with("09:15    Ana Cruz"));
    }
}
