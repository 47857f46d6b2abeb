//! Repository for the `persons` table, scoped to one transaction.

use async_trait::async_trait;
use enricher_core::error::{RepositoryError, WriteOperation};
use enricher_core::person::Person;
use enricher_core::repository::{PersonFilter, PersonPage, PersonRepository};
use enricher_core::types::{DbId, Page};
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::person::PersonRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, surname, patronymic, age, gender, nationality";

/// Provides person persistence inside a single open transaction.
///
/// Dropping the repository without calling `commit` rolls the transaction
/// back, but request code is expected to end it explicitly.
pub struct PgPersonRepository {
    tx: Transaction<'static, Postgres>,
}

impl PgPersonRepository {
    /// Open a transaction on `pool` and bind a repository to it.
    pub async fn begin(pool: &PgPool) -> Result<Self, RepositoryError> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| storage_error("begin", e))?;
        Ok(Self { tx })
    }
}

#[async_trait]
impl PersonRepository for PgPersonRepository {
    async fn insert_person(&mut self, person: &Person) -> Result<DbId, RepositoryError> {
        let age = column_age(person.age)?;
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO persons (name, surname, patronymic, age, gender, nationality)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| storage_error("insert", e))
    }

    async fn update_person(&mut self, person: &Person) -> Result<(), RepositoryError> {
        let age = column_age(person.age)?;
        let result = sqlx::query(
            "UPDATE persons SET
                name = $2,
                surname = $3,
                patronymic = $4,
                age = $5,
                gender = $6,
                nationality = $7
             WHERE id = $1",
        )
        .bind(person.id)
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| storage_error("update", e))?;

        expect_single_row(WriteOperation::Update, person.id, result.rows_affected())
    }

    async fn delete_person(&mut self, id: DbId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| storage_error("delete", e))?;

        expect_single_row(WriteOperation::Delete, id, result.rows_affected())
    }

    /// Uses `SELECT ... FOR UPDATE`, so a second transaction locking or
    /// writing the same row blocks until this one ends.
    async fn find_person_for_update(
        &mut self,
        id: DbId,
    ) -> Result<Option<Person>, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM persons WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, PersonRow>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| storage_error("select for update", e))?;

        row.map(Person::try_from).transpose()
    }

    async fn list_persons(
        &mut self,
        filter: &PersonFilter,
        page: Page,
    ) -> Result<PersonPage, RepositoryError> {
        let (where_clause, bind_values, bind_idx) = build_person_filter(filter);

        let count_query = format!("SELECT COUNT(*)::BIGINT FROM persons {where_clause}");
        let total =
            bind_person_values_scalar(sqlx::query_scalar::<_, i64>(&count_query), &bind_values)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(|e| storage_error("count", e))?;

        let window = match page.limit {
            Some(_) => format!("LIMIT ${bind_idx} OFFSET ${}", bind_idx + 1),
            None => format!("OFFSET ${bind_idx}"),
        };
        let query = format!(
            "SELECT {COLUMNS} FROM persons {where_clause} \
             ORDER BY id ASC \
             {window}"
        );

        let mut q = bind_person_values(sqlx::query_as::<_, PersonRow>(&query), &bind_values);
        if let Some(limit) = page.limit {
            q = q.bind(i64::from(limit));
        }
        let rows = q
            .bind(i64::from(page.offset))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| storage_error("select", e))?;

        let persons = rows
            .into_iter()
            .map(Person::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PersonPage { persons, total })
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx
            .commit()
            .await
            .map_err(|e| storage_error("commit", e))
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| storage_error("rollback", e))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn storage_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    tracing::error!(operation, error = %err, "Person repository query failed");
    RepositoryError::storage(err)
}

fn expect_single_row(
    operation: WriteOperation,
    id: DbId,
    affected: u64,
) -> Result<(), RepositoryError> {
    if affected == 1 {
        return Ok(());
    }
    let err = RepositoryError::Integrity {
        operation,
        id,
        affected,
    };
    tracing::error!(%operation, id, affected, "Single-row write affected an unexpected row count");
    Err(err)
}

/// The `age` column is a signed INTEGER.
fn column_age(age: u32) -> Result<i32, RepositoryError> {
    i32::try_from(age).map_err(RepositoryError::storage)
}

/// Typed bind value for dynamically-built filter queries.
enum BindValue {
    BigInt(i64),
    Text(String),
}

/// Build a WHERE clause and bind values from the set fields of `filter`.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
/// The `where_clause` is empty if no filters are active, or starts with `WHERE `.
fn build_person_filter(filter: &PersonFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    let mut push = |column: &str, value: BindValue| {
        conditions.push(format!("{column} = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(value);
    };

    if filter.id != 0 {
        push("id", BindValue::BigInt(filter.id));
    }
    if !filter.name.is_empty() {
        push("name", BindValue::Text(filter.name.clone()));
    }
    if !filter.surname.is_empty() {
        push("surname", BindValue::Text(filter.surname.clone()));
    }
    if filter.age != 0 {
        push("age", BindValue::BigInt(i64::from(filter.age)));
    }
    if !filter.gender.is_empty() {
        push("gender", BindValue::Text(filter.gender.clone()));
    }
    if !filter.nationality.is_empty() {
        push("nationality", BindValue::Text(filter.nationality.clone()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_person_values<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_person_values_scalar<'q>(
    mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}
