//! Bulk reconciliation of the tag and role lists against a submitted form.
//!
//! The wire format is a flat form map with keys like `tags[2]` (an existing record's id) or
//! `tags[-1]` (a negative placeholder for a record to be created). The reconciliation is lenient:
//! read-only records and uniqueness collisions are logged and skipped, so a partially applicable
//! submission still applies the rest. Applying the same submission twice changes nothing the
//! second time.

use crate::data_store::util::slugify;
use crate::data_store::{DiaryStoreFacade, StoreError};
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use std::collections::HashMap;

/// A record reference as submitted by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmittedKey {
    Existing(i32),
    /// A negative placeholder id, i.e. a record to be created
    New,
}

/// Parse the entries with keys of the form `<prefix>[<int>]` from a submitted form map.
///
/// Negative ids are placeholders for new records. Keys that do not match the pattern are ignored.
/// The entries are returned sorted by the submitted id, so placeholder entries come first.
pub fn parse_form_keys(
    prefix: &str,
    form: &HashMap<String, String>,
) -> Vec<(SubmittedKey, String)> {
    lazy_static! {
        static ref FORM_KEY_RE: Regex =
            Regex::new(r"^([a-z]+)\[(-?\d+)\]$").expect("static regex must compile");
    }
    let mut entries: Vec<(i32, String)> = form
        .iter()
        .filter_map(|(key, value)| {
            let captures = FORM_KEY_RE.captures(key)?;
            if &captures[1] != prefix {
                return None;
            }
            let id: i32 = captures[2].parse().ok()?;
            Some((id, value.clone()))
        })
        .collect();
    entries.sort_by_key(|(id, _)| *id);
    entries
        .into_iter()
        .map(|(id, value)| {
            let key = if id < 0 {
                SubmittedKey::New
            } else {
                SubmittedKey::Existing(id)
            };
            (key, value)
        })
        .collect()
}

/// Reconcile the event tag list against the submitted entries.
///
/// Submitted tag names are trimmed and lowercased. Existing tags are renamed (with a refreshed
/// slug) or, when submitted with an empty name, deleted. Placeholder entries and entries
/// referencing unknown ids create new tags. Read-only tags are never renamed or deleted. Name
/// collisions on create or rename are logged and skipped. Tags not mentioned in the submission
/// are left untouched.
pub fn reconcile_tags(
    store: &mut dyn DiaryStoreFacade,
    entries: &[(SubmittedKey, String)],
) -> Result<(), StoreError> {
    let existing_tags: HashMap<i32, _> = store
        .get_event_tags()?
        .into_iter()
        .map(|tag| (tag.id, tag))
        .collect();
    let mut accounted_for = Vec::new();

    for (key, name) in entries {
        let name = name.trim().to_lowercase();
        let name = name.as_str();
        let existing = match key {
            SubmittedKey::Existing(id) => existing_tags.get(id),
            SubmittedKey::New => None,
        };
        match existing {
            Some(tag) if tag.read_only => {
                accounted_for.push(tag.id);
                if name != tag.name {
                    warn!("Ignoring modification of read-only tag '{}'", tag.name);
                }
            }
            Some(tag) if name.is_empty() => {
                accounted_for.push(tag.id);
                store.delete_event_tag(tag.id)?;
            }
            Some(tag) if name == tag.name => {
                accounted_for.push(tag.id);
            }
            Some(tag) => {
                accounted_for.push(tag.id);
                match store.rename_event_tag(tag.id, name, &slugify(name)) {
                    Err(StoreError::ConflictEntityExists) => {
                        warn!("Not renaming tag '{}' to '{}': name is taken", tag.name, name);
                    }
                    other => other?,
                }
            }
            None if name.is_empty() => {}
            None => match store.create_event_tag(name, &slugify(name)) {
                Err(StoreError::ConflictEntityExists) => {
                    warn!("Not creating tag '{}': name is taken", name);
                }
                other => {
                    other?;
                }
            },
        }
    }

    for tag in existing_tags.values() {
        if !accounted_for.contains(&tag.id) {
            info!("Tag '{}' was not accounted for in the submitted form", tag.name);
        }
    }
    Ok(())
}

/// Reconcile the role list against the submitted entries, with the same semantics as
/// [reconcile_tags] (roles have no slug).
pub fn reconcile_roles(
    store: &mut dyn DiaryStoreFacade,
    entries: &[(SubmittedKey, String)],
) -> Result<(), StoreError> {
    let existing_roles: HashMap<i32, _> = store
        .get_roles()?
        .into_iter()
        .map(|role| (role.id, role))
        .collect();
    let mut accounted_for = Vec::new();

    for (key, name) in entries {
        let name = name.trim();
        let existing = match key {
            SubmittedKey::Existing(id) => existing_roles.get(id),
            SubmittedKey::New => None,
        };
        match existing {
            Some(role) if role.read_only => {
                accounted_for.push(role.id);
                if name != role.name {
                    warn!("Ignoring modification of read-only role '{}'", role.name);
                }
            }
            Some(role) if name.is_empty() => {
                accounted_for.push(role.id);
                store.delete_role(role.id)?;
            }
            Some(role) if name == role.name => {
                accounted_for.push(role.id);
            }
            Some(role) => {
                accounted_for.push(role.id);
                match store.rename_role(role.id, name) {
                    Err(StoreError::ConflictEntityExists) => {
                        warn!(
                            "Not renaming role '{}' to '{}': name is taken",
                            role.name, name
                        );
                    }
                    other => other?,
                }
            }
            None if name.is_empty() => {}
            None => match store.create_role(name) {
                Err(StoreError::ConflictEntityExists) => {
                    warn!("Not creating role '{}': name is taken", name);
                }
                other => {
                    other?;
                }
            },
        }
    }

    for role in existing_roles.values() {
        if !accounted_for.contains(&role.id) {
            info!(
                "Role '{}' was not accounted for in the submitted form",
                role.name
            );
        }
    }
    Ok(())
}
