//! Request and response bodies.
//!
//! Field names follow the backend's JSON exactly (`bookname`, `returndays`, ...).

use serde::{Deserialize, Serialize};
use shelfscan_core::{Hours, ReturnDays};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AttendanceRequest<'a> {
    pub token: &'a str,
    pub hours: Hours,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub token: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReturnRequest<'a> {
    pub token: &'a str,
    pub isbn: &'a str,
}

/// `POST /borrow` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowRequest {
    pub token: String,
    pub isbn: String,
    pub bookname: String,
    /// Authors joined with `", "`, or `"Unknown"`.
    pub bookauthor: String,
    pub returndays: ReturnDays,
}

impl BorrowRequest {
    pub fn new(token: &str, book: &BookInfo, returndays: ReturnDays) -> Self {
        Self {
            token: token.to_string(),
            isbn: book.isbn.clone(),
            bookname: book.title.clone(),
            bookauthor: book.author_line(),
            returndays,
        }
    }
}

/// Generic `{message}` success body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /borrowed` response.
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowedResponse {
    pub borrowed: bool,
    #[serde(default)]
    pub books: Option<BorrowedBook>,
}

/// A book currently borrowed by the token holder.
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowedBook {
    pub bookname: String,
    #[serde(default)]
    pub bookauthor: Option<String>,
    pub isbn: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub borrowed_date: Option<String>,
}

impl BorrowedBook {
    pub fn authors(&self) -> Vec<&str> {
        self.bookauthor
            .as_deref()
            .map(|a| a.split(", ").filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Row of `GET /admin/top-attendance`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentHours {
    pub name: String,
    pub total_hours: u32,
}

/// Row of `GET /admin/most-borrowed-books`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentBorrows {
    pub name: String,
    pub books_borrowed: u32,
}

/// Row of `GET /admin/today-attendance`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceRecord {
    pub name: String,
    pub hours: u32,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub students: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttendanceEnvelope {
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

// =============================================================================
// Google Books
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct VolumesResponse {
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Volume {
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub industry_identifiers: Vec<IndustryIdentifier>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Book metadata picked from the first matching volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInfo {
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: String,
    pub thumbnail: Option<String>,
}

impl BookInfo {
    /// `fallback_isbn` is used when the volume lists no ISBN-13/ISBN-10.
    pub(crate) fn from_volume(info: VolumeInfo, fallback_isbn: &str) -> Self {
        let isbn = info
            .industry_identifiers
            .into_iter()
            .find(|id| id.kind == "ISBN_13" || id.kind == "ISBN_10")
            .map_or_else(|| fallback_isbn.to_string(), |id| id.identifier);
        Self {
            title: info.title.unwrap_or_default(),
            authors: info.authors,
            isbn,
            thumbnail: info.image_links.and_then(|l| l.thumbnail),
        }
    }

    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors.join(", ")
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn attendance_request_shape() {
        let body = AttendanceRequest {
            token: "a.b.c",
            hours: Hours::new(3).unwrap(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"token": "a.b.c", "hours": 3}));
    }

    #[test]
    fn borrow_request_uses_backend_field_names() {
        let book = BookInfo {
            title: "Dune".into(),
            authors: vec!["Frank Herbert".into()],
            isbn: "9780441013593".into(),
            thumbnail: None,
        };
        let req = BorrowRequest::new("tok", &book, ReturnDays::new(2).unwrap());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "token": "tok",
                "isbn": "9780441013593",
                "bookname": "Dune",
                "bookauthor": "Frank Herbert",
                "returndays": 2
            })
        );
    }

    #[test]
    fn author_line_falls_back_to_unknown() {
        let book = BookInfo {
            title: "Anon".into(),
            authors: Vec::new(),
            isbn: "1".into(),
            thumbnail: None,
        };
        assert_eq!(book.author_line(), "Unknown");
    }

    #[test]
    fn borrowed_response_without_books() {
        let resp: BorrowedResponse = serde_json::from_str(r#"{"borrowed": false}"#).unwrap();
        assert!(!resp.borrowed);
        assert!(resp.books.is_none());
    }

    #[test]
    fn borrowed_book_ignores_extra_columns() {
        let json = r#"{"borrowed": true, "books": {
            "id": 7, "srcode": "21-1", "bookname": "Dune",
            "bookauthor": "Frank Herbert, Brian Herbert", "isbn": "9780441013593",
            "thumbnail": null, "borrowed_date": "2026-10-16T09:30:00"
        }}"#;
        let resp: BorrowedResponse = serde_json::from_str(json).unwrap();
        let book = resp.books.unwrap();
        assert_eq!(book.authors(), ["Frank Herbert", "Brian Herbert"]);
        assert!(book.thumbnail.is_none());
        assert_eq!(book.borrowed_date.as_deref(), Some("2026-10-16T09:30:00"));
    }

    #[test]
    fn volume_prefers_listed_isbn() {
        let json = r#"{"items": [{"volumeInfo": {
            "title": "Dune",
            "authors": ["Frank Herbert"],
            "industryIdentifiers": [
                {"type": "OTHER", "identifier": "OCLC:1"},
                {"type": "ISBN_13", "identifier": "9780441013593"}
            ],
            "imageLinks": {"thumbnail": "http://img/1"}
        }}]}"#;
        let resp: VolumesResponse = serde_json::from_str(json).unwrap();
        let info = resp.items.into_iter().next().unwrap().volume_info;
        let book = BookInfo::from_volume(info, "0441013597");
        assert_eq!(book.isbn, "9780441013593");
        assert_eq!(book.thumbnail.as_deref(), Some("http://img/1"));
    }

    #[test]
    fn volume_without_identifiers_uses_fallback() {
        let json = r#"{"items": [{"volumeInfo": {"title": "Zine"}}]}"#;
        let resp: VolumesResponse = serde_json::from_str(json).unwrap();
        let info = resp.items.into_iter().next().unwrap().volume_info;
        let book = BookInfo::from_volume(info, "0441013597");
        assert_eq!(book.isbn, "0441013597");
        assert!(book.authors.is_empty());
    }

    #[test]
    fn empty_volume_search() {
        let resp: VolumesResponse = serde_json::from_str(r#"{"totalItems": 0}"#).unwrap();
        assert!(resp.items.is_empty());
    }
}
