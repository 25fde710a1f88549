use crate::data_store::models::FullShowing;
use crate::data_store::ShowingFilterBuilder;
use crate::diary::calendar::{build_diary, DiaryPage};
use crate::diary::date_range::{first_of_month, resolve_date_range, DateWindow};
use crate::web::api::{edit_preferences, APIError};
use crate::web::AppState;
use actix_web::{get, web, HttpRequest, Responder};
use programme_api_types::{DiaryDay, DiaryShowing, DiaryView, IdeaNote};
use serde::Deserialize;

#[derive(Deserialize)]
struct DiaryQuery {
    daysahead: Option<String>,
}

#[derive(Deserialize)]
struct FieldQuery {
    daysahead: Option<String>,
    search: Option<String>,
}

#[get("/diary")]
async fn get_diary(
    query: web::Query<DiaryQuery>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    diary_view(None, None, None, query.into_inner(), state, req).await
}

#[get("/diary/{year}")]
async fn get_diary_for_year(
    path: web::Path<i32>,
    query: web::Query<DiaryQuery>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    diary_view(
        Some(path.into_inner()),
        None,
        None,
        query.into_inner(),
        state,
        req,
    )
    .await
}

#[get("/diary/{year}/{month}")]
async fn get_diary_for_month(
    path: web::Path<(i32, u32)>,
    query: web::Query<DiaryQuery>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let (year, month) = path.into_inner();
    diary_view(Some(year), Some(month), None, query.into_inner(), state, req).await
}

#[get("/diary/{year}/{month}/{day}")]
async fn get_diary_for_day(
    path: web::Path<(i32, u32, u32)>,
    query: web::Query<DiaryQuery>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let (year, month, day) = path.into_inner();
    diary_view(
        Some(year),
        Some(month),
        Some(day),
        query.into_inner(),
        state,
        req,
    )
    .await
}

async fn diary_view(
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    query: DiaryQuery,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<web::Json<DiaryView>, APIError> {
    let preferences = edit_preferences(&req);
    let window = resolve_date_range(
        year,
        month,
        day,
        query.daysahead.as_deref(),
        preferences.daysahead,
        state.timezone,
        state.clock.as_ref(),
    )?;
    let tz = state.timezone;
    let page = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let mut filter = ShowingFilterBuilder::new();
        filter
            .start_after(window.start_utc(tz))
            .start_before(window.end_utc(tz));
        let showings = store.get_showings_filtered(filter.build())?;
        let ideas =
            store.get_ideas_between(first_of_month(window.start_date), window.end_date())?;
        Ok(build_diary(&window, showings, ideas, tz))
    })
    .await??;

    Ok(web::Json(diary_page_to_view(&window, page)))
}

fn diary_page_to_view(window: &DateWindow, page: DiaryPage) -> DiaryView {
    DiaryView {
        start: window.start_date,
        days: window.days,
        dates: page
            .dates
            .into_iter()
            .map(|(date, showings)| DiaryDay {
                date,
                showings: showings.into_iter().map(diary_showing).collect(),
            })
            .collect(),
        ideas: page
            .ideas
            .into_iter()
            .map(|(date, ideas)| IdeaNote { date, ideas })
            .collect(),
    }
}

fn diary_showing(showing: FullShowing) -> DiaryShowing {
    DiaryShowing {
        event: showing.event.clone().into(),
        showing: showing.into(),
    }
}

/// List the confirmed, non-cancelled showings of the default window, optionally filtered by a
/// substring search on the named event text field. The recognized fields are `copy`, `terms` and
/// `rota` (the latter without text search; the rota entries are part of every returned showing).
#[get("/diary/field/{field}")]
async fn get_diary_field(
    path: web::Path<String>,
    query: web::Query<FieldQuery>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let field = path.into_inner();
    if !["copy", "terms", "rota"].contains(&field.as_str()) {
        return Err(APIError::NotExisting);
    }
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
    let search = query.search.clone();
    let tz = state.timezone;
    let showings = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let mut filter = ShowingFilterBuilder::new();
        filter
            .start_after(window.start_utc(tz))
            .start_before(window.end_utc(tz))
            .confirmed_only()
            .exclude_cancelled();
        Ok(store.get_showings_filtered(filter.build())?)
    })
    .await??;

    let needle = search.unwrap_or_default().to_lowercase();
    let matches: Vec<DiaryShowing> = showings
        .into_iter()
        .filter(|showing| {
            let haystack = match field.as_str() {
                "copy" => &showing.event.copy,
                "terms" => &showing.event.terms,
                _ => return true,
            };
            needle.is_empty() || haystack.to_lowercase().contains(&needle)
        })
        .map(diary_showing)
        .collect();

    Ok(web::Json(matches))
}
