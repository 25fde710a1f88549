use crate::diary::showings;
use crate::diary::showings::{ShowingSpec, ShowingUpdateSpec};
use crate::web::api::{edit_preferences, on_success, APIError};
use crate::web::AppState;
use actix_web::{delete, post, put, web, HttpRequest, HttpResponse, Responder};
use programme_api_types::{NewShowingRequest, ShowingUpdateRequest, WriteResult};
use serde::Deserialize;

#[derive(Deserialize)]
struct CloneQuery {
    /// Id of a source showing to clone instead of creating a bare showing
    copy_from: Option<i32>,
}

#[post("/events/{event_id}/showings")]
async fn create_showing(
    path: web::Path<i32>,
    query: web::Query<CloneQuery>,
    data: web::Json<NewShowingRequest>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let copy_from = query.copy_from;
    let request = data.into_inner();
    let preferences = edit_preferences(&req);
    let showing_id = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let showing_id = match copy_from {
            Some(source_showing_id) => showings::clone_showing(
                store.as_mut(),
                state.clock.as_ref(),
                source_showing_id,
                request.start,
                request.booked_by,
            )?,
            None => showings::create_showing(
                store.as_mut(),
                state.clock.as_ref(),
                event_id,
                ShowingSpec {
                    start: request.start,
                    booked_by: request.booked_by,
                    confirmed: request.confirmed,
                    discounted: request.discounted,
                    hide_in_programme: request.hide_in_programme,
                },
            )?,
        };
        Ok(showing_id)
    })
    .await??;

    Ok(HttpResponse::Created().json(WriteResult {
        id: Some(showing_id),
        on_success: on_success(&preferences),
    }))
}

#[put("/showings/{showing_id}")]
async fn update_showing(
    path: web::Path<i32>,
    data: web::Json<ShowingUpdateRequest>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let showing_id = path.into_inner();
    let request = data.into_inner();
    let preferences = edit_preferences(&req);
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        showings::edit_showing(
            store.as_mut(),
            state.clock.as_ref(),
            showing_id,
            ShowingUpdateSpec {
                start: request.start,
                booked_by: request.booked_by,
                confirmed: request.confirmed,
                cancelled: request.cancelled,
                discounted: request.discounted,
                hide_in_programme: request.hide_in_programme,
                role_counts: request.rota,
            },
        )?;
        Ok(())
    })
    .await??;

    Ok(web::Json(WriteResult {
        id: None,
        on_success: on_success(&preferences),
    }))
}

#[delete("/showings/{showing_id}")]
async fn delete_showing(
    path: web::Path<i32>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let showing_id = path.into_inner();
    let preferences = edit_preferences(&req);
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        showings::delete_showing(store.as_mut(), state.clock.as_ref(), showing_id)?;
        Ok(())
    })
    .await??;

    Ok(web::Json(WriteResult {
        id: None,
        on_success: on_success(&preferences),
    }))
}
