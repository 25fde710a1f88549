//! The showing lifecycle: creation (directly, by cloning and as part of a new event's run),
//! editing with rota reconciliation, and deletion. Showings that have already started are
//! immutable.

use crate::data_store::models::{
    FullNewEvent, NewEvent, NewRotaEntry, NewShowing, ShowingUpdate,
};
use crate::data_store::{DiaryStoreFacade, EventId, RoleId, ShowingId, StoreError};
use crate::diary::clock::Clock;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

/// Per-field validation messages for a rejected write
#[derive(Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub field_errors: BTreeMap<String, String>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.field_errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ShowingError {
    Validation(ValidationError),
    /// The showing has already started and must not be modified or deleted
    PastShowing,
    Store(StoreError),
}

impl Display for ShowingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShowingError::Validation(e) => write!(f, "Invalid showing data: {}", e),
            ShowingError::PastShowing => {
                f.write_str("Can't change showings that are in the past")
            }
            ShowingError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl From<StoreError> for ShowingError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<ValidationError> for ShowingError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

/// The user-editable fields of a new showing
#[derive(Clone)]
pub struct ShowingSpec {
    pub start: DateTime<Utc>,
    pub booked_by: String,
    pub confirmed: bool,
    pub discounted: bool,
    pub hide_in_programme: bool,
}

/// The user-editable fields of an existing showing, plus the desired number of rota entries per
/// role
#[derive(Clone)]
pub struct ShowingUpdateSpec {
    pub start: DateTime<Utc>,
    pub booked_by: String,
    pub confirmed: bool,
    pub cancelled: bool,
    pub discounted: bool,
    pub hide_in_programme: bool,
    pub role_counts: HashMap<RoleId, u32>,
}

/// The form data for creating a new event with a run of consecutive daily showings
#[derive(Clone)]
pub struct NewEventSpec {
    pub name: String,
    pub start: DateTime<Utc>,
    pub number_of_days: u32,
    pub booked_by: String,
    pub template_id: Option<i32>,
    pub confirmed: bool,
    pub discounted: bool,
    pub outside_hire: bool,
    pub private: bool,
}

fn validate_start_and_booker(
    clock: &dyn Clock,
    start: DateTime<Utc>,
    booked_by: &str,
) -> Result<(), ValidationError> {
    let mut field_errors = BTreeMap::new();
    if start <= clock.now() {
        field_errors.insert("start".to_owned(), "Must be in the future".to_owned());
    }
    if booked_by.trim().is_empty() {
        field_errors.insert("booked_by".to_owned(), "This field is required".to_owned());
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { field_errors })
    }
}

/// Get the role ids a new showing of the given event should be seeded with: the event template's
/// default roles, or the standard roles when the event has no template.
fn default_rota_roles(
    store: &mut dyn DiaryStoreFacade,
    template_id: Option<i32>,
) -> Result<Vec<RoleId>, StoreError> {
    match template_id {
        Some(template_id) => Ok(store.get_template(template_id)?.role_ids),
        None => Ok(store
            .get_roles()?
            .into_iter()
            .filter(|r| r.standard)
            .map(|r| r.id)
            .collect()),
    }
}

/// Create a new showing for an existing event, seeded with one required rank-1 rota entry per
/// default role.
pub fn create_showing(
    store: &mut dyn DiaryStoreFacade,
    clock: &dyn Clock,
    event_id: EventId,
    spec: ShowingSpec,
) -> Result<ShowingId, ShowingError> {
    validate_start_and_booker(clock, spec.start, &spec.booked_by)?;

    let event = store.get_event(event_id)?;
    let rota = default_rota_roles(store, event.event.template_id)?
        .into_iter()
        .map(|role_id| NewRotaEntry {
            role_id,
            rank: 1,
            required: true,
        })
        .collect();

    Ok(store.create_showing_with_rota(
        NewShowing {
            event_id,
            start: spec.start,
            booked_by: spec.booked_by,
            confirmed: spec.confirmed,
            cancelled: false,
            discounted: spec.discounted,
            hide_in_programme: spec.hide_in_programme,
        },
        rota,
    )?)
}

/// Create a new showing of the same event as `source_showing_id`, copying every field except
/// start and booked_by, including the exact rota (role, rank, required).
pub fn clone_showing(
    store: &mut dyn DiaryStoreFacade,
    clock: &dyn Clock,
    source_showing_id: ShowingId,
    start: DateTime<Utc>,
    booked_by: String,
) -> Result<ShowingId, ShowingError> {
    let source = store.get_showing(source_showing_id)?;
    validate_start_and_booker(clock, start, &booked_by)?;

    let rota = source
        .rota
        .iter()
        .map(|entry| NewRotaEntry {
            role_id: entry.role_id,
            rank: entry.rank,
            required: entry.required,
        })
        .collect();

    Ok(store.create_showing_with_rota(
        NewShowing {
            event_id: source.showing.event_id,
            start,
            booked_by,
            confirmed: source.showing.confirmed,
            cancelled: source.showing.cancelled,
            discounted: source.showing.discounted,
            hide_in_programme: source.showing.hide_in_programme,
        },
        rota,
    )?)
}

/// Update a showing's fields and reconcile its rota against the desired entry count per role.
///
/// For each role, the existing entries with the lowest ranks are kept up to the desired count,
/// missing entries are created with successive ranks, and excess entries are deleted. Roles not
/// mentioned in the map lose all their entries. All changes happen in one store transaction.
///
/// Showings that have already started are rejected with [ShowingError::PastShowing] and left
/// untouched.
pub fn edit_showing(
    store: &mut dyn DiaryStoreFacade,
    clock: &dyn Clock,
    showing_id: ShowingId,
    spec: ShowingUpdateSpec,
) -> Result<(), ShowingError> {
    let existing = store.get_showing(showing_id)?;
    if existing.showing.start <= clock.now() {
        return Err(ShowingError::PastShowing);
    }
    validate_start_and_booker(clock, spec.start, &spec.booked_by)?;

    let mut by_role: BTreeMap<RoleId, Vec<&crate::data_store::models::RotaEntry>> =
        BTreeMap::new();
    for entry in &existing.rota {
        by_role.entry(entry.role_id).or_default().push(entry);
    }
    for entries in by_role.values_mut() {
        entries.sort_by_key(|entry| entry.rank);
    }

    let mut new_entries = Vec::new();
    let mut deleted_entries = Vec::new();
    for (role_id, count) in &spec.role_counts {
        let count = *count as usize;
        let existing_entries = by_role.remove(role_id).unwrap_or_default();
        for entry in existing_entries.iter().skip(count) {
            deleted_entries.push(entry.id);
        }
        for rank in existing_entries.len()..count {
            new_entries.push(NewRotaEntry {
                role_id: *role_id,
                rank: rank as i32 + 1,
                required: true,
            });
        }
    }
    // roles not mentioned in the submission lose all their entries
    for entries in by_role.into_values() {
        for entry in entries {
            deleted_entries.push(entry.id);
        }
    }

    store.update_showing_and_rota(
        showing_id,
        ShowingUpdate {
            start: spec.start,
            booked_by: spec.booked_by,
            confirmed: spec.confirmed,
            cancelled: spec.cancelled,
            discounted: spec.discounted,
            hide_in_programme: spec.hide_in_programme,
        },
        new_entries,
        deleted_entries,
    )?;
    Ok(())
}

/// Delete a showing together with its rota. Showings that have already started are rejected with
/// [ShowingError::PastShowing] and left untouched.
pub fn delete_showing(
    store: &mut dyn DiaryStoreFacade,
    clock: &dyn Clock,
    showing_id: ShowingId,
) -> Result<(), ShowingError> {
    let existing = store.get_showing(showing_id)?;
    if existing.showing.start <= clock.now() {
        return Err(ShowingError::PastShowing);
    }
    store.delete_showing(showing_id)?;
    Ok(())
}

/// Create a new event together with a run of consecutive daily showings.
///
/// The event's tag set is reset to the template's default tags, and each showing is seeded with
/// one required rank-1 rota entry per default role, all in one store transaction.
pub fn add_event(
    store: &mut dyn DiaryStoreFacade,
    clock: &dyn Clock,
    spec: NewEventSpec,
) -> Result<EventId, ShowingError> {
    let mut validation = validate_start_and_booker(clock, spec.start, &spec.booked_by)
        .err()
        .map(|e| e.field_errors)
        .unwrap_or_default();
    if spec.name.trim().is_empty() {
        validation.insert("name".to_owned(), "This field is required".to_owned());
    }
    if spec.number_of_days == 0 {
        validation.insert(
            "number_of_days".to_owned(),
            "Must be at least 1".to_owned(),
        );
    }
    if !validation.is_empty() {
        return Err(ShowingError::Validation(ValidationError {
            field_errors: validation,
        }));
    }

    let (tag_ids, role_ids) = match spec.template_id {
        Some(template_id) => {
            let template = store.get_template(template_id)?;
            (template.tag_ids, template.role_ids)
        }
        None => (vec![], default_rota_roles(store, None)?),
    };

    let showings = (0..spec.number_of_days)
        .map(|day| NewShowing {
            // the store fills in the id of the freshly created event
            event_id: 0,
            start: spec.start + chrono::Duration::days(day as i64),
            booked_by: spec.booked_by.clone(),
            confirmed: spec.confirmed,
            cancelled: false,
            discounted: spec.discounted,
            hide_in_programme: false,
        })
        .collect();

    Ok(store.create_event_with_showings(
        FullNewEvent {
            event: NewEvent {
                name: spec.name,
                copy: "".to_owned(),
                copy_summary: "".to_owned(),
                terms: "".to_owned(),
                notes: "".to_owned(),
                duration_seconds: 0,
                legacy_copy: false,
                outside_hire: spec.outside_hire,
                private: spec.private,
                cancelled: false,
                template_id: spec.template_id,
            },
            tag_ids,
            media_ids: vec![],
        },
        showings,
        role_ids,
    )?)
}
