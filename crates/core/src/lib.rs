//! Domain core for the person enricher.
//!
//! Holds the [`Person`](person::Person) entity, the enrichment coordinator
//! that fans out to the three demographic lookups, and the transactional
//! repository contract. Nothing here performs I/O directly; lookups and
//! storage are injected through the [`Enricher`](enrich::Enricher) and
//! [`PersonRepository`](repository::PersonRepository) traits.

pub mod enrich;
pub mod error;
pub mod person;
pub mod repository;
pub mod types;
