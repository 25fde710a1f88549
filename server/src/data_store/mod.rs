//! The backend part of the backend: the database interface
//!
//! The primary entry point to this module is the function [get_store_from_env], which returns an
//! object implementing the [DiaryStore] trait. This object can be shared between threads in a
//! global application state and be used to create [DiaryStoreFacade] instances for interaction
//! with the database. These provide a CRUD-like interface, using the data models from the [models]
//! module.
//!
//! The primary implementation of [DiaryStore] ([postgres::PgDataStore]) wraps a PostgreSQL
//! connection pool and its corresponding [DiaryStoreFacade] objects
//! ([postgres::PgDataStoreFacade]) hold a reference to one pooled connection each, using the
//! Diesel query DSL for implementing the database interaction.
//!
//! There is also a mock implementation for unittests.

use crate::cli_error::CliError;
use crate::cli_error::CliError::UnexpectedStoreError;
use crate::setup;
use chrono::naive::NaiveDate;

pub mod models;
mod postgres;
mod schema;
#[cfg(test)]
pub mod store_mock;
pub mod util;

/// Get a [DiaryStore] instance, according to the "DATABASE_URL" environment variable.
///
/// The DATABASE_URL must be a PostgreSQL connection url, following the schema
/// "postgres://{user}:{password}@{host}/{database}".
pub fn get_store_from_env() -> Result<impl DiaryStore, CliError> {
    postgres::PgDataStore::new(&setup::get_database_url_from_env()?)
        .map_err(|err| UnexpectedStoreError(err.to_string()))
}

pub type EventId = i32;
pub type ShowingId = i32;
pub type RotaEntryId = i32;
pub type RoleId = i32;
pub type TagId = i32;
pub type TemplateId = i32;
pub type MediaItemId = i32;

pub trait DiaryStoreFacade {
    fn get_event(&mut self, event_id: EventId) -> Result<models::FullEvent, StoreError>;
    /// Update an event's scalar fields, its tag set and its media item set in one transaction.
    fn update_event(
        &mut self,
        event_id: EventId,
        event: models::FullNewEvent,
    ) -> Result<(), StoreError>;
    /// Create a new event together with its initial tag set and a run of showings, each seeded
    /// with one rota entry per given role (rank 1, required), in one transaction.
    fn create_event_with_showings(
        &mut self,
        event: models::FullNewEvent,
        showings: Vec<models::NewShowing>,
        rota_role_ids: Vec<RoleId>,
    ) -> Result<EventId, StoreError>;

    /// Get a filtered list of showings with their events and rota entries.
    ///
    /// Showings are returned in chronological order, i.e. sorted by (start, id). Rota entries of
    /// each showing are sorted by (role_id, rank).
    fn get_showings_filtered(
        &mut self,
        filter: ShowingFilter,
    ) -> Result<Vec<models::FullShowing>, StoreError>;
    fn get_showing(&mut self, showing_id: ShowingId) -> Result<models::FullShowing, StoreError>;
    /// Create a showing together with its initial rota entries in one transaction.
    fn create_showing_with_rota(
        &mut self,
        showing: models::NewShowing,
        rota: Vec<models::NewRotaEntry>,
    ) -> Result<ShowingId, StoreError>;
    /// Update a showing's scalar fields and apply a precomputed rota diff in one transaction.
    fn update_showing_and_rota(
        &mut self,
        showing_id: ShowingId,
        showing: models::ShowingUpdate,
        new_rota_entries: Vec<models::NewRotaEntry>,
        deleted_rota_entries: Vec<RotaEntryId>,
    ) -> Result<(), StoreError>;
    /// Delete a showing together with all its rota entries.
    fn delete_showing(&mut self, showing_id: ShowingId) -> Result<(), StoreError>;

    fn get_roles(&mut self) -> Result<Vec<models::Role>, StoreError>;
    fn create_role(&mut self, name: &str) -> Result<RoleId, StoreError>;
    fn rename_role(&mut self, role_id: RoleId, name: &str) -> Result<(), StoreError>;
    fn delete_role(&mut self, role_id: RoleId) -> Result<(), StoreError>;

    fn get_event_tags(&mut self) -> Result<Vec<models::EventTag>, StoreError>;
    fn create_event_tag(&mut self, name: &str, slug: &str) -> Result<TagId, StoreError>;
    fn rename_event_tag(&mut self, tag_id: TagId, name: &str, slug: &str)
        -> Result<(), StoreError>;
    fn delete_event_tag(&mut self, tag_id: TagId) -> Result<(), StoreError>;

    fn get_templates(&mut self) -> Result<Vec<models::FullEventTemplate>, StoreError>;
    fn get_template(&mut self, template_id: TemplateId)
        -> Result<models::FullEventTemplate, StoreError>;
    /// Update a template's name and replace its default role and tag sets in one transaction.
    fn update_template(
        &mut self,
        template_id: TemplateId,
        name: &str,
        role_ids: Vec<RoleId>,
        tag_ids: Vec<TagId>,
    ) -> Result<(), StoreError>;

    /// Get the idea record for the given month (must be a first-of-month date), if one exists
    fn get_idea(&mut self, month: NaiveDate) -> Result<Option<models::DiaryIdea>, StoreError>;
    /// Get all idea records with `from <= month < to`
    fn get_ideas_between(
        &mut self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<models::DiaryIdea>, StoreError>;
    /// Create or update the idea record for the given month
    fn upsert_idea(&mut self, month: NaiveDate, ideas: &str) -> Result<(), StoreError>;

    fn get_media_item(&mut self, id: MediaItemId) -> Result<models::MediaItem, StoreError>;
}

/// Filter options for retrieving showings from the store via
/// DiaryStoreFacade::get_showings_filtered()
///
/// Can be constructed through the ShowingFilterBuilder
#[derive(Default)]
pub struct ShowingFilter {
    /// Filter for showings that start at or after the given point in time
    pub start_after: Option<chrono::DateTime<chrono::Utc>>,
    /// Filter for showings that start before the given point in time
    pub start_before: Option<chrono::DateTime<chrono::Utc>>,
    /// If true, only include confirmed showings
    pub confirmed_only: bool,
    /// If true, exclude cancelled showings and showings of cancelled events
    pub exclude_cancelled: bool,
    /// If true, exclude private events and showings hidden from the programme
    pub public_only: bool,
}

impl ShowingFilter {
    /// Checks if a given showing matches the filter
    ///
    /// Usually, filtering should be done by the database. This function can be used for separate
    /// checks of individual showings in software.
    pub fn matches(&self, showing: &models::FullShowing) -> bool {
        if let Some(start_after) = self.start_after {
            if showing.showing.start < start_after {
                return false;
            }
        }
        if let Some(start_before) = self.start_before {
            if showing.showing.start >= start_before {
                return false;
            }
        }
        if self.confirmed_only && !showing.showing.confirmed {
            return false;
        }
        if self.exclude_cancelled && (showing.showing.cancelled || showing.event.cancelled) {
            return false;
        }
        if self.public_only && (showing.event.private || showing.showing.hide_in_programme) {
            return false;
        }
        true
    }
}

/// Builder for constructing ShowingFilter objects
pub struct ShowingFilterBuilder {
    result: ShowingFilter,
}

impl ShowingFilterBuilder {
    pub fn new() -> Self {
        Self {
            result: ShowingFilter::default(),
        }
    }

    /// Add filter, to only include showings that start at or after the given point in time
    pub fn start_after(&mut self, start_after: chrono::DateTime<chrono::Utc>) -> &mut Self {
        self.result.start_after = Some(start_after);
        self
    }

    /// Add filter, to only include showings that start before the given point in time
    pub fn start_before(&mut self, start_before: chrono::DateTime<chrono::Utc>) -> &mut Self {
        self.result.start_before = Some(start_before);
        self
    }

    /// Add filter to only include confirmed showings
    pub fn confirmed_only(&mut self) -> &mut Self {
        self.result.confirmed_only = true;
        self
    }

    /// Add filter to exclude cancelled showings and showings of cancelled events
    pub fn exclude_cancelled(&mut self) -> &mut Self {
        self.result.exclude_cancelled = true;
        self
    }

    /// Add filter to exclude private events and showings hidden from the programme
    pub fn public_only(&mut self) -> &mut Self {
        self.result.public_only = true;
        self
    }

    /// Create the ShowingFilter object
    pub fn build(self) -> ShowingFilter {
        self.result
    }
}

pub trait DiaryStore: Send + Sync {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn DiaryStoreFacade + 'a>, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    /// Connecting to the database failed. See string description for details.
    ConnectionError(String),
    /// The query could not be executed because of some error not covered by the other members (see
    /// string description)
    QueryError(diesel::result::Error),
    /// Database transaction could not be committed due to a conflicting concurrent transaction
    TransactionConflict,
    /// The requested entity does not exist
    NotExisting,
    /// The entity could not be created because a conflicting entity exists already (e.g. a tag or
    /// role with the same unique name)
    ConflictEntityExists,
    /// The provided data is invalid, i.e. it does not match the expected ranges or violates a
    /// SQL constraint. See string description for details.
    InvalidInputData(String),
    /// Some data queried from the database could not be deserialized. See string description for
    /// details.
    InvalidDataInDatabase(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => Self::NotExisting,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => Self::ConflictEntityExists,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::SerializationFailure,
                _,
            ) => Self::TransactionConflict,
            diesel::result::Error::DatabaseError(
                e @ diesel::result::DatabaseErrorKind::ForeignKeyViolation
                | e @ diesel::result::DatabaseErrorKind::CheckViolation,
                _,
            ) => Self::InvalidInputData(format!("{:?}", e)),
            diesel::result::Error::SerializationError(e) => Self::InvalidInputData(e.to_string()),
            diesel::result::Error::DeserializationError(e) => {
                Self::InvalidDataInDatabase(e.to_string())
            }
            _ => Self::QueryError(error),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::ConnectionError(error.to_string())
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to database: {}", e),
            Self::QueryError(e) => write!(f, "Error while executing database query: {}", e),
            Self::TransactionConflict => f.write_str("Database transaction could not be committed due to a conflicting concurrent transaction"),
            Self::NotExisting => f.write_str("Database record does not exist."),
            Self::ConflictEntityExists => f.write_str("Database record exists already."),
            Self::InvalidInputData(e) => {
                write!(f, "Data to be stored in database is not valid: {}", e)
            }
            StoreError::InvalidDataInDatabase(e) => {
                write!(f, "Data queried from database could not be deserialized: {}", e)
            }
        }
    }
}

impl std::error::Error for StoreError {}
