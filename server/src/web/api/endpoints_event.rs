use crate::data_store::models::FullNewEvent;
use crate::diary::showings;
use crate::diary::showings::NewEventSpec;
use crate::web::api::{edit_preferences, on_success, APIError};
use crate::web::AppState;
use actix_web::{get, post, put, web, HttpRequest, HttpResponse, Responder};
use programme_api_types::{NewEventRequest, WriteResult};

#[post("/events")]
async fn add_event(
    data: web::Json<NewEventRequest>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let preferences = edit_preferences(&req);
    let request = data.into_inner();
    let event_id = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(showings::add_event(
            store.as_mut(),
            state.clock.as_ref(),
            NewEventSpec {
                name: request.name,
                start: request.start,
                number_of_days: request.number_of_days,
                booked_by: request.booked_by,
                template_id: request.template_id,
                confirmed: request.confirmed,
                discounted: request.discounted,
                outside_hire: request.outside_hire,
                private: request.private,
            },
        )?)
    })
    .await??;

    Ok(HttpResponse::Created().json(WriteResult {
        id: Some(event_id),
        on_success: on_success(&preferences),
    }))
}

#[get("/events/{event_id}")]
async fn get_event(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let event: programme_api_types::Event = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_event(event_id)?)
    })
    .await??
    .into();

    Ok(web::Json(event))
}

#[put("/events/{event_id}")]
async fn update_event(
    path: web::Path<i32>,
    data: web::Json<programme_api_types::Event>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let event_id = path.into_inner();
    let event = data.into_inner();
    if event_id != event.id {
        return Err(APIError::EntityIdMissmatch);
    }
    let preferences = edit_preferences(&req);
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        store.update_event(event_id, FullNewEvent::from_api(event))?;
        Ok(())
    })
    .await??;

    Ok(web::Json(WriteResult {
        id: None,
        on_success: on_success(&preferences),
    }))
}
