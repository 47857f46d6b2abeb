/// All database primary keys are PostgreSQL BIGSERIAL.
///
/// `0` is never assigned by the database and marks a record that has not
/// been persisted yet.
pub type DbId = i64;

/// Pagination window for listings.
///
/// `limit: None` means "every row after `offset`".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: Option<u32>, offset: u32) -> Self {
        Self { limit, offset }
    }
}
