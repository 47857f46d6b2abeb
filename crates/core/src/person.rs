//! The person entity and its operations against injected collaborators.

use serde::{Deserialize, Serialize};

use crate::enrich::{resolve_attributes, Enricher};
use crate::error::{EnrichmentError, RepositoryError, ValidationError, Violation};
use crate::repository::{PersonFilter, PersonPage, PersonRepository};
use crate::types::{DbId, Page};

/// A person row from the `persons` table.
///
/// Sentinels: `id == 0` means never persisted, `age == 0` and empty
/// `gender`/`nationality` mean not yet determined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: DbId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub nationality: String,
}

impl Person {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Check every rule and report all violations at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        if self.name.is_empty() {
            violations.push(Violation::EmptyName);
        }
        if self.surname.is_empty() {
            violations.push(Violation::EmptySurname);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// Fill in age, gender and nationality from the name.
    ///
    /// All-or-nothing: on error the record is left exactly as it was.
    pub async fn enrich<E>(&mut self, enricher: &E) -> Result<(), EnrichmentError>
    where
        E: Enricher + ?Sized,
    {
        let attrs = resolve_attributes(enricher, &self.name).await?;

        self.age = attrs.age;
        self.gender = attrs.gender;
        self.nationality = attrs.nationality;
        Ok(())
    }

    /// Insert when not yet persisted (adopting the new id), update otherwise.
    ///
    /// Never commits; the caller owns the transaction.
    pub async fn save<R>(&mut self, repo: &mut R) -> Result<(), RepositoryError>
    where
        R: PersonRepository + ?Sized,
    {
        if self.is_persisted() {
            repo.update_person(self).await
        } else {
            self.id = repo.insert_person(self).await?;
            Ok(())
        }
    }

    pub async fn delete<R>(&self, repo: &mut R) -> Result<(), RepositoryError>
    where
        R: PersonRepository + ?Sized,
    {
        repo.delete_person(self.id).await
    }
}

/// Load `id` under an exclusive row lock held until the transaction ends.
///
/// A missing row is [`RepositoryError::NotFound`]; driver failures pass
/// through as [`RepositoryError::Storage`].
pub async fn get_person_with_lock<R>(repo: &mut R, id: DbId) -> Result<Person, RepositoryError>
where
    R: PersonRepository + ?Sized,
{
    repo.find_person_for_update(id)
        .await?
        .ok_or(RepositoryError::NotFound { id })
}

/// Load `id` without locking.
///
/// Ids below 1 are never assigned, so they are [`RepositoryError::NotFound`]
/// without a query; `0` would otherwise act as the "any id" filter.
pub async fn get_person<R>(repo: &mut R, id: DbId) -> Result<Person, RepositoryError>
where
    R: PersonRepository + ?Sized,
{
    if id <= 0 {
        return Err(RepositoryError::NotFound { id });
    }
    repo.list_persons(&PersonFilter::by_id(id), Page::new(Some(1), 0))
        .await?
        .persons
        .into_iter()
        .next()
        .ok_or(RepositoryError::NotFound { id })
}

pub async fn get_all_persons<R>(
    repo: &mut R,
    filter: &PersonFilter,
    page: Page,
) -> Result<PersonPage, RepositoryError>
where
    R: PersonRepository + ?Sized,
{
    repo.list_persons(filter, page).await
}
