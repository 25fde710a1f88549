//! Merging showings and idea notes into the gap-filled diary calendar.

use crate::data_store::models::{DiaryIdea, FullShowing};
use crate::diary::date_range::{first_of_month, DateWindow};
use chrono::{naive::NaiveDate, Datelike};
use std::collections::BTreeMap;

/// The merged diary view-model: one entry per calendar day of the window (days without showings
/// are included with an empty list), plus the idea notes relevant to the window.
pub struct DiaryPage {
    pub dates: BTreeMap<NaiveDate, Vec<FullShowing>>,
    pub ideas: BTreeMap<NaiveDate, String>,
}

/// Build the diary page for the given window.
///
/// `showings` must be the showings of the window in chronological order; their query order is
/// preserved within each day. `ideas` are the idea records of all months touched by the window,
/// including the month the window starts in.
///
/// The ideas map always contains the window's start date (with an empty text if there is no
/// record) and every first-of-month within the window. When the window does not begin on the
/// first of a month, the start month's idea text is surfaced under the start date instead.
pub fn build_diary(
    window: &DateWindow,
    showings: Vec<FullShowing>,
    ideas: Vec<DiaryIdea>,
    tz: chrono_tz::Tz,
) -> DiaryPage {
    let end = window.end_date();

    let mut dates: BTreeMap<NaiveDate, Vec<FullShowing>> = BTreeMap::new();
    let mut date = window.start_date;
    while date < end {
        dates.insert(date, Vec::new());
        date += chrono::Duration::days(1);
    }
    for showing in showings {
        let local_date = showing.showing.start.with_timezone(&tz).date_naive();
        if let Some(day) = dates.get_mut(&local_date) {
            day.push(showing);
        }
    }

    let mut idea_notes: BTreeMap<NaiveDate, String> = BTreeMap::new();
    idea_notes.insert(window.start_date, String::new());
    let mut month = first_of_month(window.start_date);
    while month < end {
        if month >= window.start_date {
            idea_notes.insert(month, String::new());
        }
        month = next_month(month);
    }
    let start_month = first_of_month(window.start_date);
    for idea in ideas {
        if let Some(text) = idea_notes.get_mut(&idea.month) {
            *text = idea.ideas;
        } else if idea.month == start_month {
            // window does not begin on the 1st: surface the start month's note under the start
            // date
            idea_notes.insert(window.start_date, idea.ideas);
        }
    }

    DiaryPage {
        dates,
        ideas: idea_notes,
    }
}

fn next_month(month: NaiveDate) -> NaiveDate {
    let next = if month.month() == 12 {
        NaiveDate::from_ymd_opt(month.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month.year(), month.month() + 1, 1)
    };
    next.unwrap_or(month)
}
