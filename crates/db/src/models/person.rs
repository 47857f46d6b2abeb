//! Row mapping for the `persons` table.

use enricher_core::error::RepositoryError;
use enricher_core::person::Person;
use enricher_core::types::DbId;
use sqlx::FromRow;

/// A person row as stored. Postgres has no unsigned types, so `age` is
/// widened here and checked on the way into the domain type.
#[derive(Debug, Clone, FromRow)]
pub struct PersonRow {
    pub id: DbId,
    pub name: String,
    pub surname: String,
    pub patronymic: Option<String>,
    pub age: i32,
    pub gender: String,
    pub nationality: String,
}

impl TryFrom<PersonRow> for Person {
    type Error = RepositoryError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        Ok(Person {
            id: row.id,
            name: row.name,
            surname: row.surname,
            patronymic: row.patronymic,
            age: u32::try_from(row.age).map_err(RepositoryError::storage)?,
            gender: row.gender,
            nationality: row.nationality,
        })
    }
}
