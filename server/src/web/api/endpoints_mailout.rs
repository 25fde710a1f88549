use crate::data_store::ShowingFilterBuilder;
use crate::diary::date_range::resolve_date_range;
use crate::mailout::{normalize_status, render_mailout_body};
use crate::web::api::{edit_preferences, APIError};
use crate::web::AppState;
use actix_web::{get, post, web, HttpRequest, Responder};
use programme_api_types::MailoutDraft;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_SUBJECT: &str = "Programme of forthcoming events";

#[derive(Deserialize)]
struct MailoutQuery {
    daysahead: Option<String>,
}

#[derive(Deserialize)]
struct ProgressQuery {
    task_id: String,
}

/// Prefill the mailout form: the plain-text programme of the forthcoming public confirmed
/// showings, grouped by month.
#[get("/mailout")]
async fn get_mailout_draft(
    query: web::Query<MailoutQuery>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let preferences = edit_preferences(&req);
    let window = resolve_date_range(
        None,
        None,
        None,
        query.daysahead.as_deref(),
        preferences.daysahead,
        state.timezone,
        state.clock.as_ref(),
    )?;
    let tz = state.timezone;
    let showings = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let mut filter = ShowingFilterBuilder::new();
        filter
            .start_after(window.start_utc(tz))
            .start_before(window.end_utc(tz))
            .confirmed_only()
            .exclude_cancelled()
            .public_only();
        Ok(store.get_showings_filtered(filter.build())?)
    })
    .await??;

    Ok(web::Json(MailoutDraft {
        subject: DEFAULT_SUBJECT.to_owned(),
        body: render_mailout_body(&showings, tz),
    }))
}

#[post("/mailout")]
async fn enqueue_mailout(
    data: web::Json<MailoutDraft>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let draft = data.into_inner();
    let mut errors = serde_json::Map::new();
    if draft.subject.trim().is_empty() {
        errors.insert("subject".to_owned(), json!("This field is required"));
    }
    if draft.body.trim().is_empty() {
        errors.insert("body".to_owned(), json!("This field is required"));
    }
    if !errors.is_empty() {
        return Ok(web::Json(json!({
            "status": "error",
            "errors": errors,
        })));
    }

    let task_id = state.job_runner.enqueue(&draft.subject, &draft.body)?;
    Ok(web::Json(json!({
        "status": "ok",
        "task_id": task_id,
        "progress": 0,
    })))
}

#[get("/mailout/progress")]
async fn get_mailout_progress(
    query: web::Query<ProgressQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let task_id = query.into_inner().task_id;
    let poll = state.job_runner.poll(&task_id)?;
    Ok(web::Json(normalize_status(&task_id, &poll)))
}
