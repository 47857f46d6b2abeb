//! Transactional repository contract for persons.
//!
//! A repository value is bound to exactly one open transaction. It is
//! consumed by [`PersonRepository::commit`] or
//! [`PersonRepository::rollback`], so no call can be issued on a
//! transaction that has already ended.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::RepositoryError;
use crate::person::Person;
use crate::types::{DbId, Page};

/// Conjunctive equality filter for listings.
///
/// A field left at its sentinel (`0` or empty string) places no constraint
/// on that column, so there is no way to filter for an empty value or id 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub id: DbId,
    pub name: String,
    pub surname: String,
    pub age: u32,
    pub gender: String,
    pub nationality: String,
}

impl PersonFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// One page of a filtered listing.
///
/// `total` counts every row matching the filter, ignoring the page window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonPage {
    pub persons: Vec<Person>,
    pub total: i64,
}

#[async_trait]
pub trait PersonRepository: Send {
    /// Write every attribute column and return the assigned id.
    async fn insert_person(&mut self, person: &Person) -> Result<DbId, RepositoryError>;

    /// Overwrite every attribute column of `person.id`. Must affect exactly
    /// one row, anything else is [`RepositoryError::Integrity`].
    async fn update_person(&mut self, person: &Person) -> Result<(), RepositoryError>;

    /// Remove the row `id`. Same single-row contract as `update_person`.
    async fn delete_person(&mut self, id: DbId) -> Result<(), RepositoryError>;

    /// Read one row and hold an exclusive lock on it until the transaction
    /// ends. `Ok(None)` when the row does not exist.
    async fn find_person_for_update(
        &mut self,
        id: DbId,
    ) -> Result<Option<Person>, RepositoryError>;

    /// Filtered listing ordered by id ascending.
    async fn list_persons(
        &mut self,
        filter: &PersonFilter,
        page: Page,
    ) -> Result<PersonPage, RepositoryError>;

    async fn commit(self) -> Result<(), RepositoryError>
    where
        Self: Sized;

    async fn rollback(self) -> Result<(), RepositoryError>
    where
        Self: Sized;
}
