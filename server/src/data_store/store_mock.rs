use crate::data_store::models::{
    DiaryIdea, Event, EventTag, FullEvent, FullEventTemplate, FullNewEvent, FullShowing,
    MediaItem, NewRotaEntry, NewShowing, Role, RotaEntry, ShowingUpdate,
};
use crate::data_store::{
    DiaryStore, DiaryStoreFacade, EventId, MediaItemId, RoleId, RotaEntryId, ShowingFilter,
    ShowingId, StoreError, TagId, TemplateId,
};
use chrono::naive::NaiveDate;
use std::sync::Mutex;

/**
 * A mock [DiaryStore] implementation for testing.
 *
 * The simulated database consists of the [StoreMockData] structure with vectors of entities. These
 * can be directly modified by the tests.
 *
 * Except from checking for entity existence and unique tag/role names, the interface functions of
 * this mock don't do any error checking. Instead, the [StoreMockData::next_error] attribute can be
 * set to simulate a database error.
 */
#[derive(Default)]
pub struct StoreMock {
    pub data: Mutex<StoreMockData>,
}

impl DiaryStore for StoreMock {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn DiaryStoreFacade + 'a>, StoreError> {
        Ok(Box::new(StoreMockFacade { store: self }))
    }
}

#[derive(Default)]
pub struct StoreMockData {
    pub events: Vec<FullEvent>,
    pub showings: Vec<FullShowing>,
    pub roles: Vec<Role>,
    pub tags: Vec<EventTag>,
    pub templates: Vec<FullEventTemplate>,
    pub ideas: Vec<DiaryIdea>,
    pub media_items: Vec<MediaItem>,
    /// If not none, the next call to a store facade method will return this error.
    pub next_error: Option<StoreError>,
    next_id: i32,
}

impl StoreMockData {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        1000 + self.next_id
    }
}

struct StoreMockFacade<'a> {
    store: &'a StoreMock,
}

impl<'a> DiaryStoreFacade for StoreMockFacade<'a> {
    fn get_event(&mut self, event_id: EventId) -> Result<FullEvent, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.events
            .iter()
            .find(|e| e.event.id == event_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn update_event(&mut self, event_id: EventId, event: FullNewEvent) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let existing = data
            .events
            .iter_mut()
            .find(|e| e.event.id == event_id)
            .ok_or(StoreError::NotExisting)?;
        existing.event = Event {
            id: event_id,
            name: event.event.name,
            copy: event.event.copy,
            copy_summary: event.event.copy_summary,
            terms: event.event.terms,
            notes: event.event.notes,
            duration_seconds: event.event.duration_seconds,
            legacy_copy: event.event.legacy_copy,
            outside_hire: event.event.outside_hire,
            private: event.event.private,
            cancelled: event.event.cancelled,
            template_id: event.event.template_id,
        };
        existing.tag_ids = event.tag_ids;
        existing.media_ids = event.media_ids;
        // showings embed a copy of their event
        let updated = existing.event.clone();
        for showing in data.showings.iter_mut() {
            if showing.showing.event_id == event_id {
                showing.event = updated.clone();
            }
        }
        Ok(())
    }

    fn create_event_with_showings(
        &mut self,
        event: FullNewEvent,
        showings: Vec<NewShowing>,
        rota_role_ids: Vec<RoleId>,
    ) -> Result<EventId, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let event_id = data.next_id();
        let the_event = Event {
            id: event_id,
            name: event.event.name,
            copy: event.event.copy,
            copy_summary: event.event.copy_summary,
            terms: event.event.terms,
            notes: event.event.notes,
            duration_seconds: event.event.duration_seconds,
            legacy_copy: event.event.legacy_copy,
            outside_hire: event.event.outside_hire,
            private: event.event.private,
            cancelled: event.event.cancelled,
            template_id: event.event.template_id,
        };
        data.events.push(FullEvent {
            event: the_event.clone(),
            tag_ids: event.tag_ids,
            media_ids: event.media_ids,
        });
        for showing in showings {
            let showing_id = data.next_id();
            let rota = rota_role_ids
                .iter()
                .map(|role_id| RotaEntry {
                    id: data.next_id(),
                    showing_id,
                    role_id: *role_id,
                    rank: 1,
                    required: true,
                })
                .collect();
            data.showings.push(FullShowing {
                showing: crate::data_store::models::Showing {
                    id: showing_id,
                    event_id,
                    start: showing.start,
                    booked_by: showing.booked_by,
                    confirmed: showing.confirmed,
                    cancelled: showing.cancelled,
                    discounted: showing.discounted,
                    hide_in_programme: showing.hide_in_programme,
                },
                event: the_event.clone(),
                rota,
            });
        }
        Ok(event_id)
    }

    fn get_showings_filtered(
        &mut self,
        filter: ShowingFilter,
    ) -> Result<Vec<FullShowing>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<FullShowing> = data
            .showings
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        result.sort_by_key(|s| (s.showing.start, s.showing.id));
        Ok(result)
    }

    fn get_showing(&mut self, showing_id: ShowingId) -> Result<FullShowing, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.showings
            .iter()
            .find(|s| s.showing.id == showing_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn create_showing_with_rota(
        &mut self,
        showing: NewShowing,
        rota: Vec<NewRotaEntry>,
    ) -> Result<ShowingId, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let event = data
            .events
            .iter()
            .find(|e| e.event.id == showing.event_id)
            .map(|e| e.event.clone())
            .ok_or(StoreError::NotExisting)?;
        let showing_id = data.next_id();
        let rota = rota
            .into_iter()
            .map(|entry| RotaEntry {
                id: data.next_id(),
                showing_id,
                role_id: entry.role_id,
                rank: entry.rank,
                required: entry.required,
            })
            .collect();
        data.showings.push(FullShowing {
            showing: crate::data_store::models::Showing {
                id: showing_id,
                event_id: showing.event_id,
                start: showing.start,
                booked_by: showing.booked_by,
                confirmed: showing.confirmed,
                cancelled: showing.cancelled,
                discounted: showing.discounted,
                hide_in_programme: showing.hide_in_programme,
            },
            event,
            rota,
        });
        Ok(showing_id)
    }

    fn update_showing_and_rota(
        &mut self,
        showing_id: ShowingId,
        showing: ShowingUpdate,
        new_rota_entries: Vec<NewRotaEntry>,
        deleted_rota_entries: Vec<RotaEntryId>,
    ) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut new_entries = Vec::new();
        {
            let existing = data
                .showings
                .iter()
                .position(|s| s.showing.id == showing_id)
                .ok_or(StoreError::NotExisting)?;
            for entry in new_rota_entries {
                new_entries.push((existing, entry));
            }
        }
        for (index, entry) in new_entries {
            let id = data.next_id();
            data.showings[index].rota.push(RotaEntry {
                id,
                showing_id,
                role_id: entry.role_id,
                rank: entry.rank,
                required: entry.required,
            });
        }
        let existing = data
            .showings
            .iter_mut()
            .find(|s| s.showing.id == showing_id)
            .ok_or(StoreError::NotExisting)?;
        existing.showing.start = showing.start;
        existing.showing.booked_by = showing.booked_by;
        existing.showing.confirmed = showing.confirmed;
        existing.showing.cancelled = showing.cancelled;
        existing.showing.discounted = showing.discounted;
        existing.showing.hide_in_programme = showing.hide_in_programme;
        existing
            .rota
            .retain(|entry| !deleted_rota_entries.contains(&entry.id));
        existing.rota.sort_by_key(|entry| (entry.role_id, entry.rank));
        Ok(())
    }

    fn delete_showing(&mut self, showing_id: ShowingId) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if !data.showings.iter().any(|s| s.showing.id == showing_id) {
            return Err(StoreError::NotExisting);
        }
        data.showings.retain(|s| s.showing.id != showing_id);
        Ok(())
    }

    fn get_roles(&mut self) -> Result<Vec<Role>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data.roles.clone())
    }

    fn create_role(&mut self, name: &str) -> Result<RoleId, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if data.roles.iter().any(|r| r.name == name) {
            return Err(StoreError::ConflictEntityExists);
        }
        let role_id = data.next_id();
        data.roles.push(Role {
            id: role_id,
            name: name.to_owned(),
            read_only: false,
            standard: false,
        });
        Ok(role_id)
    }

    fn rename_role(&mut self, role_id: RoleId, name: &str) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if data.roles.iter().any(|r| r.name == name && r.id != role_id) {
            return Err(StoreError::ConflictEntityExists);
        }
        let role = data
            .roles
            .iter_mut()
            .find(|r| r.id == role_id)
            .ok_or(StoreError::NotExisting)?;
        role.name = name.to_owned();
        Ok(())
    }

    fn delete_role(&mut self, role_id: RoleId) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if !data.roles.iter().any(|r| r.id == role_id) {
            return Err(StoreError::NotExisting);
        }
        data.roles.retain(|r| r.id != role_id);
        Ok(())
    }

    fn get_event_tags(&mut self) -> Result<Vec<EventTag>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data.tags.clone())
    }

    fn create_event_tag(&mut self, name: &str, slug: &str) -> Result<TagId, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if data.tags.iter().any(|t| t.name == name || t.slug == slug) {
            return Err(StoreError::ConflictEntityExists);
        }
        let tag_id = data.next_id();
        data.tags.push(EventTag {
            id: tag_id,
            name: name.to_owned(),
            slug: slug.to_owned(),
            read_only: false,
        });
        Ok(tag_id)
    }

    fn rename_event_tag(
        &mut self,
        tag_id: TagId,
        name: &str,
        slug: &str,
    ) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if data
            .tags
            .iter()
            .any(|t| (t.name == name || t.slug == slug) && t.id != tag_id)
        {
            return Err(StoreError::ConflictEntityExists);
        }
        let tag = data
            .tags
            .iter_mut()
            .find(|t| t.id == tag_id)
            .ok_or(StoreError::NotExisting)?;
        tag.name = name.to_owned();
        tag.slug = slug.to_owned();
        Ok(())
    }

    fn delete_event_tag(&mut self, tag_id: TagId) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if !data.tags.iter().any(|t| t.id == tag_id) {
            return Err(StoreError::NotExisting);
        }
        data.tags.retain(|t| t.id != tag_id);
        for event in data.events.iter_mut() {
            event.tag_ids.retain(|id| *id != tag_id);
        }
        Ok(())
    }

    fn get_templates(&mut self) -> Result<Vec<FullEventTemplate>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data.templates.clone())
    }

    fn get_template(
        &mut self,
        template_id: TemplateId,
    ) -> Result<FullEventTemplate, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.templates
            .iter()
            .find(|t| t.template.id == template_id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }

    fn update_template(
        &mut self,
        template_id: TemplateId,
        name: &str,
        role_ids: Vec<RoleId>,
        tag_ids: Vec<TagId>,
    ) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let template = data
            .templates
            .iter_mut()
            .find(|t| t.template.id == template_id)
            .ok_or(StoreError::NotExisting)?;
        template.template.name = name.to_owned();
        template.role_ids = role_ids;
        template.tag_ids = tag_ids;
        Ok(())
    }

    fn get_idea(&mut self, month: NaiveDate) -> Result<Option<DiaryIdea>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data.ideas.iter().find(|i| i.month == month).cloned())
    }

    fn get_ideas_between(
        &mut self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DiaryIdea>, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let mut result: Vec<DiaryIdea> = data
            .ideas
            .iter()
            .filter(|i| i.month >= from && i.month < to)
            .cloned()
            .collect();
        result.sort_by_key(|i| i.month);
        Ok(result)
    }

    fn upsert_idea(&mut self, month: NaiveDate, ideas: &str) -> Result<(), StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if let Some(existing) = data.ideas.iter_mut().find(|i| i.month == month) {
            existing.ideas = ideas.to_owned();
        } else {
            let id = data.next_id();
            data.ideas.push(DiaryIdea {
                id,
                month,
                ideas: ideas.to_owned(),
            });
        }
        Ok(())
    }

    fn get_media_item(&mut self, id: MediaItemId) -> Result<MediaItem, StoreError> {
        let mut data = self.store.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.media_items
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(StoreError::NotExisting)
    }
}
