//! Tracking of mailout delivery jobs.
//!
//! The actual mail delivery runs out of process behind the [JobRunner] trait; this module
//! normalizes the runner's weakly-typed job status reports into the
//! [programme_api_types::MailoutProgress] contract and renders the programme preview used to
//! prefill the mailout form.

use crate::data_store::models::FullShowing;
use chrono::Datelike;
use log::warn;
use programme_api_types::MailoutProgress;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// A job status report as returned by the runner: an opaque state string and an optional,
/// weakly-typed result payload.
#[derive(Debug, Clone)]
pub struct JobPoll {
    pub state: String,
    pub result: Option<serde_json::Value>,
}

#[derive(Debug)]
pub enum JobError {
    /// The job could not be handed to the runner. See string description for details.
    EnqueueFailed(String),
    /// The job's status could not be retrieved. See string description for details.
    PollFailed(String),
}

impl Display for JobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::EnqueueFailed(e) => write!(f, "Could not enqueue mailout job: {}", e),
            JobError::PollFailed(e) => write!(f, "Could not poll mailout job: {}", e),
        }
    }
}

impl std::error::Error for JobError {}

/// The out-of-process job runner the mailout delivery is handed to.
pub trait JobRunner: Send + Sync {
    fn enqueue(&self, subject: &str, body: &str) -> Result<String, JobError>;
    fn poll(&self, task_id: &str) -> Result<JobPoll, JobError>;
}

/// Map a job status report into the normalized progress contract.
///
/// The runner's result payload is externally owned, so every malformed shape maps to a defined
/// outcome instead of an error: an unparseable progress suffix counts as "just started", a
/// completed job without a readable result triple counts as failed.
pub fn normalize_status(task_id: &str, poll: &JobPoll) -> MailoutProgress {
    if let Some(progress) = poll.state.strip_prefix("PROGRESS") {
        return MailoutProgress {
            complete: false,
            error: None,
            error_msg: None,
            sent_count: None,
            progress: progress.parse().unwrap_or(0),
            task_id: task_id.to_owned(),
        };
    }
    match poll.state.as_str() {
        "SUCCESS" => match parse_result_triple(poll.result.as_ref()) {
            Some((error, sent_count, message)) => MailoutProgress {
                complete: true,
                error: Some(error),
                error_msg: Some(message),
                sent_count: Some(sent_count),
                progress: 100,
                task_id: task_id.to_owned(),
            },
            None => {
                warn!(
                    "Mailout job {} completed with a malformed result: {:?}",
                    task_id, poll.result
                );
                MailoutProgress {
                    complete: true,
                    error: Some(true),
                    error_msg: Some("Couldn't retrieve status from completed job".to_owned()),
                    sent_count: Some(0),
                    progress: 100,
                    task_id: task_id.to_owned(),
                }
            }
        },
        "FAILURE" => MailoutProgress {
            complete: true,
            error: Some(true),
            error_msg: Some(match &poll.result {
                Some(serde_json::Value::String(message)) => message.clone(),
                Some(other) => other.to_string(),
                None => "Failed: Unknown error".to_owned(),
            }),
            sent_count: None,
            progress: 0,
            task_id: task_id.to_owned(),
        },
        // pending, queued or unknown
        _ => MailoutProgress {
            complete: false,
            error: None,
            error_msg: None,
            sent_count: None,
            progress: 0,
            task_id: task_id.to_owned(),
        },
    }
}

/// Extract the (error_flag, sent_count, message) triple a completed job is expected to report.
fn parse_result_triple(result: Option<&serde_json::Value>) -> Option<(bool, i32, String)> {
    let values = result?.as_array()?;
    if values.len() != 3 {
        return None;
    }
    let error = values[0].as_bool()?;
    let sent_count = i32::try_from(values[1].as_i64()?).ok()?;
    let message = values[2].as_str()?.to_owned();
    Some((error, sent_count, message))
}

/// Render the plain-text programme of the given showings, grouped by year and month, used to
/// prefill the mailout body. The showings are expected in chronological order.
pub fn render_mailout_body(showings: &[FullShowing], tz: chrono_tz::Tz) -> String {
    let mut body = String::new();
    let mut current_month: Option<(i32, u32)> = None;
    for showing in showings {
        let start = showing.showing.start.with_timezone(&tz);
        let month = (start.year(), start.month());
        if current_month != Some(month) {
            if current_month.is_some() {
                body.push('\n');
            }
            body.push_str(&format!("{}\n\n", start.format("%B %Y")));
            current_month = Some(month);
        }
        body.push_str(&format!(
            "{} - {}\n",
            start.format("%a %d %H:%M"),
            showing.event.name
        ));
    }
    body
}

/// An in-process stand-in for the external delivery queue: enqueued jobs are recorded and
/// immediately reported as completed, so the progress contract can be exercised without a mail
/// transport attached.
pub struct LocalJobRunner {
    jobs: Mutex<HashMap<String, JobPoll>>,
    next_task_id: Mutex<u64>,
}

impl LocalJobRunner {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            next_task_id: Mutex::new(1),
        }
    }
}

impl Default for LocalJobRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRunner for LocalJobRunner {
    fn enqueue(&self, subject: &str, _body: &str) -> Result<String, JobError> {
        let task_id = {
            let mut next_task_id = self
                .next_task_id
                .lock()
                .map_err(|e| JobError::EnqueueFailed(e.to_string()))?;
            let task_id = format!("local-{}", next_task_id);
            *next_task_id += 1;
            task_id
        };
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|e| JobError::EnqueueFailed(e.to_string()))?;
        jobs.insert(
            task_id.clone(),
            JobPoll {
                state: "SUCCESS".to_owned(),
                result: Some(serde_json::json!([
                    false,
                    0,
                    format!("No mail transport attached; '{}' was not sent", subject)
                ])),
            },
        );
        Ok(task_id)
    }

    fn poll(&self, task_id: &str) -> Result<JobPoll, JobError> {
        let jobs = self
            .jobs
            .lock()
            .map_err(|e| JobError::PollFailed(e.to_string()))?;
        jobs.get(task_id)
            .cloned()
            .ok_or_else(|| JobError::PollFailed(format!("Unknown task id {}", task_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_store::models::{Event, Showing};
    use chrono::{DateTime, Utc};

    fn poll(state: &str, result: Option<serde_json::Value>) -> JobPoll {
        JobPoll {
            state: state.to_owned(),
            result,
        }
    }

    #[test]
    fn test_progress_states() {
        let progress = normalize_status("t1", &poll("PROGRESS45", None));
        assert!(!progress.complete);
        assert_eq!(progress.error, None);
        assert_eq!(progress.progress, 45);
        assert_eq!(progress.task_id, "t1");

        // a bare progress report counts as "just started"
        let progress = normalize_status("t1", &poll("PROGRESS", None));
        assert!(!progress.complete);
        assert_eq!(progress.progress, 0);
    }

    #[test]
    fn test_success_with_result_triple() {
        let progress = normalize_status(
            "t1",
            &poll("SUCCESS", Some(serde_json::json!([false, 113, "Ok"]))),
        );
        assert!(progress.complete);
        assert_eq!(progress.error, Some(false));
        assert_eq!(progress.error_msg.as_deref(), Some("Ok"));
        assert_eq!(progress.sent_count, Some(113));
        assert_eq!(progress.progress, 100);
    }

    #[test]
    fn test_success_with_malformed_result() {
        for result in [
            None,
            Some(serde_json::json!("done")),
            Some(serde_json::json!([false, 113])),
            Some(serde_json::json!(["no", 113, "Ok"])),
        ] {
            let progress = normalize_status("t1", &poll("SUCCESS", result));
            assert!(progress.complete);
            assert_eq!(progress.error, Some(true));
            assert_eq!(
                progress.error_msg.as_deref(),
                Some("Couldn't retrieve status from completed job")
            );
            assert_eq!(progress.sent_count, Some(0));
            assert_eq!(progress.progress, 100);
        }
    }

    #[test]
    fn test_failure_states() {
        let progress = normalize_status(
            "t1",
            &poll("FAILURE", Some(serde_json::json!("SMTP gone away"))),
        );
        assert!(progress.complete);
        assert_eq!(progress.error, Some(true));
        assert_eq!(progress.error_msg.as_deref(), Some("SMTP gone away"));
        assert_eq!(progress.progress, 0);

        let progress = normalize_status("t1", &poll("FAILURE", None));
        assert!(progress.complete);
        assert_eq!(progress.error, Some(true));
        assert_eq!(progress.error_msg.as_deref(), Some("Failed: Unknown error"));
    }

    #[test]
    fn test_unknown_state_is_pending() {
        let progress = normalize_status("t1", &poll("PENDING", None));
        assert!(!progress.complete);
        assert_eq!(progress.error, None);
        assert_eq!(progress.error_msg, None);
        assert_eq!(progress.sent_count, None);
        assert_eq!(progress.progress, 0);
    }

    fn sample_showing(id: i32, name: &str, start: &str) -> FullShowing {
        FullShowing {
            showing: Showing {
                id,
                event_id: id,
                start: start.parse::<DateTime<Utc>>().expect("valid test timestamp"),
                booked_by: "someone".to_owned(),
                confirmed: true,
                cancelled: false,
                discounted: false,
                hide_in_programme: false,
            },
            event: Event {
                id,
                name: name.to_owned(),
                copy: "".to_owned(),
                copy_summary: "".to_owned(),
                terms: "".to_owned(),
                notes: "".to_owned(),
                duration_seconds: 5400,
                legacy_copy: false,
                outside_hire: false,
                private: false,
                cancelled: false,
                template_id: None,
            },
            rota: vec![],
        }
    }

    #[test]
    fn test_render_mailout_body_groups_by_month() {
        let showings = vec![
            sample_showing(1, "One", "2013-06-10T19:00:00+00:00"),
            sample_showing(2, "Two", "2013-06-12T19:00:00+00:00"),
            sample_showing(3, "Three", "2013-07-01T19:00:00+00:00"),
        ];
        let body = render_mailout_body(&showings, chrono_tz::Tz::Europe__London);
        assert_eq!(
            body,
            "June 2013\n\n\
             Mon 10 20:00 - One\n\
             Wed 12 20:00 - Two\n\
             \n\
             July 2013\n\n\
             Tue 01 20:00 - Three\n"
        );
    }

    #[test]
    fn test_local_job_runner_round_trip() {
        let runner = LocalJobRunner::new();
        let task_id = runner.enqueue("Programme", "body").unwrap();
        let progress = normalize_status(&task_id, &runner.poll(&task_id).unwrap());
        assert!(progress.complete);
        assert_eq!(progress.error, Some(false));
        assert!(runner.poll("local-999").is_err());
    }
}
