//! Repository layer.
//!
//! Unlike pool-level helpers, each repository here owns one open
//! transaction and is consumed by `commit` or `rollback`.

pub mod person_repo;

pub use person_repo::PgPersonRepository;
