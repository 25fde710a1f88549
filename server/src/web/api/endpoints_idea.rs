use crate::diary::date_range::InvalidDateError;
use crate::web::api::{edit_preferences, on_success, APIError};
use crate::web::AppState;
use actix_web::{get, put, web, HttpRequest, Responder};
use chrono::naive::NaiveDate;
use programme_api_types::{DiaryIdea, WriteResult};

fn month_from_path(year: i32, month: u32) -> Result<NaiveDate, APIError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(APIError::InvalidDate(
        InvalidDateError::ImpossibleDate {
            year,
            month,
            day: 1,
        },
    ))
}

/// Get the idea note for the given month. Months without a record get an empty one created
/// on the first request (get-or-create).
#[get("/ideas/{year}/{month}")]
async fn get_idea(
    path: web::Path<(i32, u32)>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let (year, month) = path.into_inner();
    let month = month_from_path(year, month)?;
    let idea: DiaryIdea = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        match store.get_idea(month)? {
            Some(idea) => Ok(idea.into()),
            None => {
                store.upsert_idea(month, "")?;
                Ok(DiaryIdea {
                    month,
                    ideas: String::new(),
                })
            }
        }
    })
    .await??;

    Ok(web::Json(idea))
}

#[put("/ideas/{year}/{month}")]
async fn update_idea(
    path: web::Path<(i32, u32)>,
    data: web::Json<DiaryIdea>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let (year, month) = path.into_inner();
    let month = month_from_path(year, month)?;
    let idea = data.into_inner();
    if idea.month != month {
        return Err(APIError::EntityIdMissmatch);
    }
    let preferences = edit_preferences(&req);
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        store.upsert_idea(month, &idea.ideas)?;
        Ok(())
    })
    .await??;

    Ok(web::Json(WriteResult {
        id: None,
        on_success: on_success(&preferences),
    }))
}
