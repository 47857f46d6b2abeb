//! Integration tests for the transactional person repository.
//!
//! Exercises the repository against a real database:
//! - Insert / update / delete with the single-row contract
//! - Locked reads and lock contention between transactions
//! - Filtered listing with pagination and totals
//! - Commit and rollback visibility

use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use enricher_core::enrich::Enricher;
use enricher_core::error::{RepositoryError, ResolverError, WriteOperation};
use enricher_core::person::{get_all_persons, get_person_with_lock, Person};
use enricher_core::repository::{PersonFilter, PersonRepository};
use enricher_core::types::Page;
use enricher_db::PgPersonRepository;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct AdaEnricher;

#[async_trait]
impl Enricher for AdaEnricher {
    async fn age_by_name(&self, _name: &str) -> Result<u32, ResolverError> {
        Ok(36)
    }

    async fn gender_by_name(&self, _name: &str) -> Result<String, ResolverError> {
        Ok("female".into())
    }

    async fn nationality_by_name(&self, _name: &str) -> Result<String, ResolverError> {
        Ok("GB".into())
    }
}

/// Insert `name surname` in its own committed transaction.
async fn seed(pool: &PgPool, name: &str, surname: &str) -> Person {
    let mut repo = PgPersonRepository::begin(pool).await.unwrap();
    let mut person = Person::new(name, surname);
    person.save(&mut repo).await.unwrap();
    repo.commit().await.unwrap();
    person
}

async fn count_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM persons")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Insert / update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enriched_insert_persists_all_fields(pool: PgPool) {
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let mut person = Person::new("Ada", "Lovelace");
    person.enrich(&AdaEnricher).await.unwrap();
    person.save(&mut repo).await.unwrap();
    repo.commit().await.unwrap();

    assert!(person.id > 0);

    let (age, gender, nationality): (i32, String, String) =
        sqlx::query_as("SELECT age, gender, nationality FROM persons WHERE id = $1")
            .bind(person.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(age, 36);
    assert_eq!(gender, "female");
    assert_eq!(nationality, "GB");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patronymic_round_trips_as_null_or_text(pool: PgPool) {
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let mut with = Person::new("Dmitriy", "Ushakov");
    with.patronymic = Some("Vasilevich".into());
    with.save(&mut repo).await.unwrap();
    let mut without = Person::new("Elon", "Musk");
    without.save(&mut repo).await.unwrap();

    let loaded = get_person_with_lock(&mut repo, with.id).await.unwrap();
    assert_eq!(loaded.patronymic.as_deref(), Some("Vasilevich"));
    let loaded = get_person_with_lock(&mut repo, without.id).await.unwrap();
    assert_eq!(loaded.patronymic, None);
    repo.rollback().await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_overwrites_all_columns(pool: PgPool) {
    let seeded = seed(&pool, "Ada", "Lovelace").await;

    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let mut person = get_person_with_lock(&mut repo, seeded.id).await.unwrap();
    person.surname = "King".into();
    person.enrich(&AdaEnricher).await.unwrap();
    person.save(&mut repo).await.unwrap();
    repo.commit().await.unwrap();

    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let reloaded = get_person_with_lock(&mut repo, seeded.id).await.unwrap();
    repo.rollback().await.unwrap();
    assert_eq!(reloaded, person);
    assert_eq!(count_rows(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_nonexistent_is_integrity_error(pool: PgPool) {
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let mut ghost = Person::new("Ghost", "Row");
    ghost.id = 999_999;

    let err = ghost.save(&mut repo).await.unwrap_err();
    repo.rollback().await.unwrap();

    assert_matches!(
        err,
        RepositoryError::Integrity {
            operation: WriteOperation::Update,
            id: 999_999,
            affected: 0
        }
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_nonexistent_is_integrity_error(pool: PgPool) {
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();

    let err = repo.delete_person(999_999).await.unwrap_err();
    repo.rollback().await.unwrap();

    assert_matches!(
        err,
        RepositoryError::Integrity {
            operation: WriteOperation::Delete,
            affected: 0,
            ..
        }
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_exactly_one_row(pool: PgPool) {
    let doomed = seed(&pool, "Ada", "Lovelace").await;
    seed(&pool, "Alan", "Turing").await;

    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let person = get_person_with_lock(&mut repo, doomed.id).await.unwrap();
    person.delete(&mut repo).await.unwrap();
    repo.commit().await.unwrap();

    assert_eq!(count_rows(&pool).await, 1);
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let err = get_person_with_lock(&mut repo, doomed.id).await.unwrap_err();
    repo.rollback().await.unwrap();
    assert_matches!(err, RepositoryError::NotFound { .. });
}

// ---------------------------------------------------------------------------
// Locked reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_locked_read_of_missing_row_is_not_found(pool: PgPool) {
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();

    let err = get_person_with_lock(&mut repo, 424_242).await.unwrap_err();
    repo.rollback().await.unwrap();

    assert_matches!(err, RepositoryError::NotFound { id: 424_242 });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_locked_read_blocks_second_locker_until_commit(pool: PgPool) {
    let seeded = seed(&pool, "Ada", "Lovelace").await;

    let mut first = PgPersonRepository::begin(&pool).await.unwrap();
    get_person_with_lock(&mut first, seeded.id).await.unwrap();

    let contender_pool = pool.clone();
    let id = seeded.id;
    let contender = tokio::spawn(async move {
        let mut second = PgPersonRepository::begin(&contender_pool).await.unwrap();
        let person = get_person_with_lock(&mut second, id).await.unwrap();
        second.rollback().await.unwrap();
        person
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!contender.is_finished(), "second locker should be blocked");

    let mut person = Person {
        surname: "King".into(),
        ..seeded.clone()
    };
    person.save(&mut first).await.unwrap();
    first.commit().await.unwrap();

    let seen = tokio::time::timeout(Duration::from_secs(5), contender)
        .await
        .expect("second locker should proceed after commit")
        .unwrap();
    assert_eq!(seen.surname, "King");
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_default_filter_lists_every_row(pool: PgPool) {
    for (name, surname) in [("Ada", "Lovelace"), ("Alan", "Turing"), ("Grace", "Hopper")] {
        seed(&pool, name, surname).await;
    }

    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let page = get_all_persons(&mut repo, &PersonFilter::default(), Page::default())
        .await
        .unwrap();
    repo.commit().await.unwrap();

    assert_eq!(page.persons.len(), 3);
    assert_eq!(page.total, 3);
    let ids: Vec<_> = page.persons.iter().map(|p| p.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted, "rows must be ordered by id ascending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_limit_pages_while_total_counts_all_matches(pool: PgPool) {
    let first = seed(&pool, "Ada", "Lovelace").await;
    let second = seed(&pool, "Byron", "Lovelace").await;
    seed(&pool, "Alan", "Turing").await;

    let filter = PersonFilter {
        surname: "Lovelace".into(),
        ..PersonFilter::default()
    };
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();

    let page = get_all_persons(&mut repo, &filter, Page::new(Some(1), 0))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.persons.len(), 1);
    assert_eq!(page.persons[0].id, first.id);

    let page = get_all_persons(&mut repo, &filter, Page::new(None, 1))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.persons.len(), 1);
    assert_eq!(page.persons[0].id, second.id);

    repo.commit().await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filters_are_conjunctive(pool: PgPool) {
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    let mut ada = Person::new("Ada", "Lovelace");
    ada.enrich(&AdaEnricher).await.unwrap();
    ada.save(&mut repo).await.unwrap();
    let mut byron = Person::new("Byron", "Lovelace");
    byron.save(&mut repo).await.unwrap();

    let filter = PersonFilter {
        surname: "Lovelace".into(),
        age: 36,
        nationality: "GB".into(),
        ..PersonFilter::default()
    };
    let page = get_all_persons(&mut repo, &filter, Page::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.persons, vec![ada.clone()]);

    let page = get_all_persons(&mut repo, &PersonFilter::by_id(byron.id), Page::default())
        .await
        .unwrap();
    assert_eq!(page.persons, vec![byron]);

    let filter = PersonFilter {
        name: "Ada".into(),
        gender: "male".into(),
        ..PersonFilter::default()
    };
    let page = get_all_persons(&mut repo, &filter, Page::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.persons.is_empty());

    repo.rollback().await.unwrap();
}

// ---------------------------------------------------------------------------
// Transaction boundaries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_discards_writes(pool: PgPool) {
    let mut repo = PgPersonRepository::begin(&pool).await.unwrap();
    Person::new("Ada", "Lovelace")
        .save(&mut repo)
        .await
        .unwrap();
    repo.rollback().await.unwrap();

    assert_eq!(count_rows(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_uncommitted_insert_is_invisible_to_other_transactions(pool: PgPool) {
    let mut writer = PgPersonRepository::begin(&pool).await.unwrap();
    let mut person = Person::new("Ada", "Lovelace");
    person.save(&mut writer).await.unwrap();

    assert_eq!(count_rows(&pool).await, 0);

    writer.commit().await.unwrap();
    assert_eq!(count_rows(&pool).await, 1);
}
