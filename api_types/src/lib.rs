use chrono::{naive::NaiveDate, DateTime, Utc};
use serde::{Deserialize, Serialize};

fn not(v: &bool) -> bool {
    !v
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Event {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub copy: String,
    #[serde(default, rename = "copySummary")]
    pub copy_summary: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub notes: String,
    /// Running time in seconds
    #[serde(default, rename = "durationSeconds")]
    pub duration_seconds: i32,
    #[serde(default, skip_serializing_if = "not", rename = "legacyCopy")]
    pub legacy_copy: bool,
    #[serde(default, skip_serializing_if = "not", rename = "outsideHire")]
    pub outside_hire: bool,
    #[serde(default, skip_serializing_if = "not")]
    pub private: bool,
    #[serde(default, skip_serializing_if = "not")]
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "templateId")]
    pub template_id: Option<i32>,
    #[serde(default)]
    pub tags: Vec<i32>,
    #[serde(default)]
    pub media: Vec<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Showing {
    pub id: i32,
    #[serde(rename = "eventId")]
    pub event_id: i32,
    pub start: DateTime<Utc>,
    #[serde(rename = "bookedBy")]
    pub booked_by: String,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "not")]
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "not")]
    pub discounted: bool,
    #[serde(default, skip_serializing_if = "not", rename = "hideInProgramme")]
    pub hide_in_programme: bool,
    #[serde(default)]
    pub rota: Vec<RotaEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RotaEntry {
    pub id: i32,
    #[serde(rename = "roleId")]
    pub role_id: i32,
    pub rank: i32,
    pub required: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Role {
    pub id: i32,
    pub name: String,
    #[serde(rename = "readOnly")]
    pub read_only: bool,
    pub standard: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventTag {
    pub id: i32,
    pub name: String,
    pub slug: String,
    #[serde(rename = "readOnly")]
    pub read_only: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventTemplate {
    pub id: i32,
    pub name: String,
    pub roles: Vec<i32>,
    pub tags: Vec<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiaryIdea {
    /// First day of the month this idea note belongs to
    pub month: NaiveDate,
    pub ideas: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MediaItem {
    pub id: i32,
    #[serde(rename = "mediaFile")]
    pub media_file: String,
    pub mimetype: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub credit: String,
}

/// One calendar day of the merged diary view. Days without showings are
/// included with an empty showing list.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiaryDay {
    pub date: NaiveDate,
    pub showings: Vec<DiaryShowing>,
}

/// A showing together with its event data, as shown in the diary view
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiaryShowing {
    pub showing: Showing,
    pub event: Event,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IdeaNote {
    pub date: NaiveDate,
    pub ideas: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiaryView {
    pub start: NaiveDate,
    pub days: u32,
    pub dates: Vec<DiaryDay>,
    pub ideas: Vec<IdeaNote>,
}

/// Request body for creating a showing (directly or by cloning)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewShowingRequest {
    pub start: DateTime<Utc>,
    #[serde(rename = "bookedBy")]
    pub booked_by: String,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub discounted: bool,
    #[serde(default, rename = "hideInProgramme")]
    pub hide_in_programme: bool,
}

/// Request body for updating a showing, including the desired number of rota
/// entries per role. Roles not mentioned in `rota` lose all their entries.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ShowingUpdateRequest {
    pub start: DateTime<Utc>,
    #[serde(rename = "bookedBy")]
    pub booked_by: String,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub discounted: bool,
    #[serde(default, rename = "hideInProgramme")]
    pub hide_in_programme: bool,
    #[serde(default)]
    pub rota: std::collections::HashMap<i32, u32>,
}

/// Request body for creating an event with a run of consecutive daily showings
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewEventRequest {
    pub name: String,
    pub start: DateTime<Utc>,
    #[serde(rename = "numberOfDays")]
    pub number_of_days: u32,
    #[serde(rename = "bookedBy")]
    pub booked_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "templateId")]
    pub template_id: Option<i32>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub discounted: bool,
    #[serde(default, rename = "outsideHire")]
    pub outside_hire: bool,
    #[serde(default)]
    pub private: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MailoutDraft {
    pub subject: String,
    pub body: String,
}

/// Normalized progress report of a mailout job
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MailoutProgress {
    pub complete: bool,
    /// None while the job is still pending
    pub error: Option<bool>,
    #[serde(rename = "errorMsg")]
    pub error_msg: Option<String>,
    #[serde(rename = "sentCount")]
    pub sent_count: Option<i32>,
    pub progress: u32,
    #[serde(rename = "taskId")]
    pub task_id: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditPreferences {
    pub popups: bool,
    pub daysahead: u32,
}

/// The client-side follow-up a successful write operation asks for, depending on whether the
/// session uses popup-based edit forms
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnSuccess {
    ClosePopup,
    Redirect,
}

/// Response body of a successful write operation
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WriteResult {
    /// Id of the created record, if the operation created one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(rename = "onSuccess")]
    pub on_success: OnSuccess,
}
