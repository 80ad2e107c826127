//! BookInstance model: a specific physical copy of a book that can be borrowed

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Availability of a copy. Any status may be changed to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    /// Single character code stored in the database
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "d",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl From<&str> for LoanStatus {
    fn from(code: &str) -> Self {
        match code {
            "o" => LoanStatus::OnLoan,
            "a" => LoanStatus::Available,
            "r" => LoanStatus::Reserved,
            _ => LoanStatus::Maintenance,
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Book referenced by a copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookRef {
    pub id: i32,
    pub title: String,
}

/// User currently holding a copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BorrowerRef {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookInstance {
    /// Unique across the whole library
    pub id: Uuid,
    pub book: Option<BookRef>,
    /// Version details (specific release) of the book
    pub imprint: String,
    /// Date at which the copy is expected back
    pub due_back: Option<NaiveDate>,
    pub borrower: Option<BorrowerRef>,
    pub status: LoanStatus,
}

impl BookInstance {
    /// True when a due date is set and lies strictly before `today`
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        matches!(self.due_back, Some(due) if due < today)
    }

    /// [`BookInstance::is_overdue_on`] against the local current date
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Local::now().date_naive())
    }
}

impl std::fmt::Display for BookInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.book {
            Some(ref book) => write!(f, "{} ({})", self.id, book.title),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Listing order for copies: earliest due date first, copies without a due
/// date last, then by id.
pub fn listing_order(a: &BookInstance, b: &BookInstance) -> Ordering {
    match (a.due_back, b.due_back) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

/// Copy row joined with the book title and borrower username
#[derive(Debug, Clone, FromRow)]
pub struct BookInstanceRow {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub status: String,
}

impl From<BookInstanceRow> for BookInstance {
    fn from(row: BookInstanceRow) -> Self {
        let book = match (row.book_id, row.book_title) {
            (Some(id), Some(title)) => Some(BookRef { id, title }),
            _ => None,
        };
        let borrower = match (row.borrower_id, row.borrower_username) {
            (Some(id), Some(username)) => Some(BorrowerRef { id, username }),
            _ => None,
        };
        BookInstance {
            id: row.id,
            book,
            imprint: row.imprint,
            due_back: row.due_back,
            borrower,
            status: LoanStatus::from(row.status.as_str()),
        }
    }
}

/// Create copy request. The id is generated by the server.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    pub book_id: Option<i32>,
    #[validate(length(max = 200))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    /// Defaults to maintenance
    pub status: Option<LoanStatus>,
}

/// Update copy request. `null` clears an optional reference or date.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub book_id: Option<Option<i32>>,
    #[validate(length(max = 200))]
    pub imprint: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_back: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub borrower_id: Option<Option<i32>>,
    pub status: Option<LoanStatus>,
}

/// Filters of the copies changelist
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookInstanceFilter {
    pub book_id: Option<i32>,
    pub status: Option<LoanStatus>,
    /// Exact due date (YYYY-MM-DD)
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceFilter {
    pub fn matches(&self, instance: &BookInstance) -> bool {
        if let Some(book_id) = self.book_id {
            if instance.book.as_ref().map(|b| b.id) != Some(book_id) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if instance.status != status {
                return false;
            }
        }
        if let Some(due_back) = self.due_back {
            if instance.due_back != Some(due_back) {
                return false;
            }
        }
        true
    }
}

/// Copy as shown on the book detail page and in the admin listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceView {
    pub id: Uuid,
    pub display: String,
    pub book: Option<BookRef>,
    pub imprint: String,
    pub status: LoanStatus,
    pub status_label: String,
    pub due_back: Option<NaiveDate>,
    pub is_overdue: bool,
    pub borrower: Option<BorrowerRef>,
}

impl BookInstanceView {
    pub fn new(instance: &BookInstance, today: NaiveDate) -> Self {
        Self {
            id: instance.id,
            display: instance.to_string(),
            book: instance.book.clone(),
            imprint: instance.imprint.clone(),
            status: instance.status,
            status_label: instance.status.label().to_string(),
            due_back: instance.due_back,
            is_overdue: instance.is_overdue_on(today),
            borrower: instance.borrower.clone(),
        }
    }
}

impl From<&BookInstance> for BookInstanceView {
    fn from(instance: &BookInstance) -> Self {
        Self::new(instance, Local::now().date_naive())
    }
}
