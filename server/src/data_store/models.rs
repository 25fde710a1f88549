use crate::data_store::{EventId, MediaItemId, RoleId, TagId};
use chrono::{naive::NaiveDate, DateTime, Utc};
use diesel::prelude::*;

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::events)]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub copy: String,
    pub copy_summary: String,
    pub terms: String,
    pub notes: String,
    pub duration_seconds: i32,
    pub legacy_copy: bool,
    pub outside_hire: bool,
    pub private: bool,
    pub cancelled: bool,
    pub template_id: Option<i32>,
}

#[derive(Clone, Insertable, AsChangeset)]
#[diesel(table_name=super::schema::events)]
#[diesel(treat_none_as_null = true)]
pub struct NewEvent {
    pub name: String,
    pub copy: String,
    pub copy_summary: String,
    pub terms: String,
    pub notes: String,
    pub duration_seconds: i32,
    pub legacy_copy: bool,
    pub outside_hire: bool,
    pub private: bool,
    pub cancelled: bool,
    pub template_id: Option<i32>,
}

// Conversion without the tag and media associations, for views that embed the event into each
// showing (the associations are served by the event endpoints).
impl From<Event> for programme_api_types::Event {
    fn from(value: Event) -> Self {
        Self {
            id: value.id,
            name: value.name,
            copy: value.copy,
            copy_summary: value.copy_summary,
            terms: value.terms,
            notes: value.notes,
            duration_seconds: value.duration_seconds,
            legacy_copy: value.legacy_copy,
            outside_hire: value.outside_hire,
            private: value.private,
            cancelled: value.cancelled,
            template_id: value.template_id,
            tags: vec![],
            media: vec![],
        }
    }
}

/// An event together with its tag and media item associations
#[derive(Clone)]
pub struct FullEvent {
    pub event: Event,
    pub tag_ids: Vec<TagId>,
    pub media_ids: Vec<MediaItemId>,
}

impl From<FullEvent> for programme_api_types::Event {
    fn from(value: FullEvent) -> Self {
        Self {
            id: value.event.id,
            name: value.event.name,
            copy: value.event.copy,
            copy_summary: value.event.copy_summary,
            terms: value.event.terms,
            notes: value.event.notes,
            duration_seconds: value.event.duration_seconds,
            legacy_copy: value.event.legacy_copy,
            outside_hire: value.event.outside_hire,
            private: value.event.private,
            cancelled: value.event.cancelled,
            template_id: value.event.template_id,
            tags: value.tag_ids,
            media: value.media_ids,
        }
    }
}

#[derive(Clone)]
pub struct FullNewEvent {
    pub event: NewEvent,
    pub tag_ids: Vec<TagId>,
    pub media_ids: Vec<MediaItemId>,
}

impl FullNewEvent {
    pub fn from_api(event: programme_api_types::Event) -> Self {
        Self {
            event: NewEvent {
                name: event.name,
                copy: event.copy,
                copy_summary: event.copy_summary,
                terms: event.terms,
                notes: event.notes,
                duration_seconds: event.duration_seconds,
                legacy_copy: event.legacy_copy,
                outside_hire: event.outside_hire,
                private: event.private,
                cancelled: event.cancelled,
                template_id: event.template_id,
            },
            tag_ids: event.tags,
            media_ids: event.media,
        }
    }
}

// Introduce types for the Event-Tag and Event-MediaItem associations, to simplify grouped
// retrieval of tag_ids/media_ids of an Event using Diesel's .grouped_by() method.
#[derive(Queryable, Associations, Identifiable, Selectable)]
#[diesel(table_name=super::schema::event_tag_mappings)]
#[diesel(primary_key(event_id, tag_id))]
#[diesel(belongs_to(Event))]
pub struct EventTagMapping {
    pub event_id: EventId,
    pub tag_id: TagId,
}

#[derive(Queryable, Associations, Identifiable, Selectable)]
#[diesel(table_name=super::schema::event_media)]
#[diesel(primary_key(event_id, media_item_id))]
#[diesel(belongs_to(Event))]
pub struct EventMediaMapping {
    pub event_id: EventId,
    pub media_item_id: MediaItemId,
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::showings)]
pub struct Showing {
    pub id: i32,
    pub event_id: i32,
    pub start: DateTime<Utc>,
    pub booked_by: String,
    pub confirmed: bool,
    pub cancelled: bool,
    pub discounted: bool,
    pub hide_in_programme: bool,
}

#[derive(Clone, Insertable)]
#[diesel(table_name=super::schema::showings)]
pub struct NewShowing {
    pub event_id: i32,
    pub start: DateTime<Utc>,
    pub booked_by: String,
    pub confirmed: bool,
    pub cancelled: bool,
    pub discounted: bool,
    pub hide_in_programme: bool,
}

/// Changeset for the scalar fields of a showing
#[derive(Clone, AsChangeset)]
#[diesel(table_name=super::schema::showings)]
pub struct ShowingUpdate {
    pub start: DateTime<Utc>,
    pub booked_by: String,
    pub confirmed: bool,
    pub cancelled: bool,
    pub discounted: bool,
    pub hide_in_programme: bool,
}

#[derive(Clone, Debug, Queryable, Associations, Identifiable, Selectable)]
#[diesel(table_name=super::schema::rota_entries)]
#[diesel(belongs_to(Showing))]
pub struct RotaEntry {
    pub id: i32,
    pub showing_id: i32,
    pub role_id: i32,
    pub rank: i32,
    pub required: bool,
}

impl From<RotaEntry> for programme_api_types::RotaEntry {
    fn from(value: RotaEntry) -> Self {
        Self {
            id: value.id,
            role_id: value.role_id,
            rank: value.rank,
            required: value.required,
        }
    }
}

/// A rota entry to be created for a showing whose id may not be known yet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRotaEntry {
    pub role_id: RoleId,
    pub rank: i32,
    pub required: bool,
}

/// A showing together with its event data and rota entries
#[derive(Clone)]
pub struct FullShowing {
    pub showing: Showing,
    pub event: Event,
    pub rota: Vec<RotaEntry>,
}

impl From<FullShowing> for programme_api_types::Showing {
    fn from(value: FullShowing) -> Self {
        Self {
            id: value.showing.id,
            event_id: value.showing.event_id,
            start: value.showing.start,
            booked_by: value.showing.booked_by,
            confirmed: value.showing.confirmed,
            cancelled: value.showing.cancelled,
            discounted: value.showing.discounted,
            hide_in_programme: value.showing.hide_in_programme,
            rota: value.rota.into_iter().map(|r| r.into()).collect(),
        }
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::roles)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub read_only: bool,
    pub standard: bool,
}

impl From<Role> for programme_api_types::Role {
    fn from(value: Role) -> Self {
        Self {
            id: value.id,
            name: value.name,
            read_only: value.read_only,
            standard: value.standard,
        }
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::event_tags)]
pub struct EventTag {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub read_only: bool,
}

impl From<EventTag> for programme_api_types::EventTag {
    fn from(value: EventTag) -> Self {
        Self {
            id: value.id,
            name: value.name,
            slug: value.slug,
            read_only: value.read_only,
        }
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::event_templates)]
pub struct EventTemplate {
    pub id: i32,
    pub name: String,
}

// Association mapping types for the default role and tag sets of an event template
#[derive(Queryable, Associations, Identifiable, Selectable)]
#[diesel(table_name=super::schema::template_roles)]
#[diesel(primary_key(template_id, role_id))]
#[diesel(belongs_to(EventTemplate, foreign_key = template_id))]
pub struct TemplateRoleMapping {
    pub template_id: i32,
    pub role_id: RoleId,
}

#[derive(Queryable, Associations, Identifiable, Selectable)]
#[diesel(table_name=super::schema::template_tags)]
#[diesel(primary_key(template_id, tag_id))]
#[diesel(belongs_to(EventTemplate, foreign_key = template_id))]
pub struct TemplateTagMapping {
    pub template_id: i32,
    pub tag_id: TagId,
}

#[derive(Clone)]
pub struct FullEventTemplate {
    pub template: EventTemplate,
    pub role_ids: Vec<RoleId>,
    pub tag_ids: Vec<TagId>,
}

impl From<FullEventTemplate> for programme_api_types::EventTemplate {
    fn from(value: FullEventTemplate) -> Self {
        Self {
            id: value.template.id,
            name: value.template.name,
            roles: value.role_ids,
            tags: value.tag_ids,
        }
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::diary_ideas)]
pub struct DiaryIdea {
    pub id: i32,
    /// Always a first-of-month date
    pub month: NaiveDate,
    pub ideas: String,
}

impl From<DiaryIdea> for programme_api_types::DiaryIdea {
    fn from(value: DiaryIdea) -> Self {
        Self {
            month: value.month,
            ideas: value.ideas,
        }
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::media_items)]
pub struct MediaItem {
    pub id: i32,
    pub media_file: String,
    pub mimetype: String,
    pub caption: String,
    pub credit: String,
}

impl From<MediaItem> for programme_api_types::MediaItem {
    fn from(value: MediaItem) -> Self {
        Self {
            id: value.id,
            media_file: value.media_file,
            mimetype: value.mimetype,
            caption: value.caption,
            credit: value.credit,
        }
    }
}
