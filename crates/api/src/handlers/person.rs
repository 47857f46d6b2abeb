//! Handlers for the `/persons` resource.
//!
//! Every handler owns exactly one transaction. Input is validated before the
//! transaction opens; once open, the transaction is committed only when all
//! steps succeed and rolled back on every other path.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use enricher_core::person::{get_all_persons, get_person, get_person_with_lock, Person};
use enricher_core::repository::{PersonFilter, PersonPage, PersonRepository};
use enricher_core::types::{DbId, Page};
use enricher_db::PgPersonRepository;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Query parameters for `GET /persons`.
///
/// Omitted filter fields (and `0`/empty values) match every row.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListPersonsParams {
    pub id: DbId,
    pub name: String,
    pub surname: String,
    pub age: u32,
    pub gender: String,
    pub nationality: String,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ListPersonsParams {
    fn into_parts(self) -> (PersonFilter, Page) {
        let filter = PersonFilter {
            id: self.id,
            name: self.name,
            surname: self.surname,
            age: self.age,
            gender: self.gender,
            nationality: self.nationality,
        };
        (filter, Page::new(self.limit, self.offset))
    }
}

/// GET /persons
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListPersonsParams>,
) -> AppResult<Json<PersonPage>> {
    let (filter, page) = params.into_parts();

    let mut repo = PgPersonRepository::begin(&state.pool).await?;
    let outcome = get_all_persons(&mut repo, &filter, page)
        .await
        .map_err(AppError::from);
    let page = finish(repo, outcome).await?;

    tracing::debug!(returned = page.persons.len(), total = page.total, "Listed persons");
    Ok(Json(page))
}

/// GET /persons/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<Person>> {
    let mut repo = PgPersonRepository::begin(&state.pool).await?;
    let outcome = get_person(&mut repo, id).await.map_err(AppError::from);
    let person = finish(repo, outcome).await?;
    Ok(Json(person))
}

/// POST /persons
///
/// Always inserts: any `id` in the body is discarded.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(mut person): ApiJson<Person>,
) -> AppResult<(StatusCode, Json<Person>)> {
    person.id = 0;
    person.validate()?;
    person.enrich(state.enricher.as_ref()).await?;

    let mut repo = PgPersonRepository::begin(&state.pool).await?;
    let outcome = person.save(&mut repo).await.map_err(AppError::from);
    finish(repo, outcome).await?;

    tracing::info!(id = person.id, name = %person.name, surname = %person.surname, "Created person");
    Ok((StatusCode::CREATED, Json(person)))
}

/// PUT /persons/{id}
///
/// Locks the existing row for the rest of the request, re-enriches from the
/// submitted name and overwrites every column.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(mut person): ApiJson<Person>,
) -> AppResult<Json<Person>> {
    if person.id != 0 && person.id != id {
        return Err(AppError::BadRequest(format!(
            "body id {} does not match path id {id}",
            person.id
        )));
    }
    person.validate()?;

    let mut repo = PgPersonRepository::begin(&state.pool).await?;
    let outcome = async {
        let existing = get_person_with_lock(&mut repo, id).await?;
        person.id = existing.id;
        person.enrich(state.enricher.as_ref()).await?;
        person.save(&mut repo).await?;
        Ok::<_, AppError>(())
    }
    .await;
    finish(repo, outcome).await?;

    tracing::info!(id, "Updated person");
    Ok(Json(person))
}

/// DELETE /persons/{id}
///
/// Responds with the row as it was before deletion.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<Person>> {
    let mut repo = PgPersonRepository::begin(&state.pool).await?;
    let outcome = async {
        let person = get_person_with_lock(&mut repo, id).await?;
        person.delete(&mut repo).await?;
        Ok::<_, AppError>(person)
    }
    .await;
    let person = finish(repo, outcome).await?;

    tracing::info!(id, "Deleted person");
    Ok(Json(person))
}

/// End the request's transaction: commit on success, roll back otherwise.
///
/// A failed rollback is logged and the original error is returned.
async fn finish<R, T>(repo: R, outcome: AppResult<T>) -> AppResult<T>
where
    R: PersonRepository,
{
    match outcome {
        Ok(value) => {
            repo.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = repo.rollback().await {
                tracing::error!(error = %rollback_err, "Failed to roll back transaction");
            }
            Err(err)
        }
    }
}
