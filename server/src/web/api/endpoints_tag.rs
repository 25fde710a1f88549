use crate::diary::reconcile;
use crate::web::api::APIError;
use crate::web::AppState;
use actix_web::{get, post, web, HttpResponse, Responder};
use std::collections::HashMap;

#[get("/tags")]
async fn list_tags(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    let tags: Vec<programme_api_types::EventTag> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_event_tags()?)
    })
    .await??
    .into_iter()
    .map(|tag| tag.into())
    .collect();

    Ok(web::Json(tags))
}

/// Bulk-reconcile the tag list against a submitted form with keys of the form `tags[<id>]`
/// (negative ids create new tags). Best effort: read-only tags and name collisions are skipped.
#[post("/tags")]
async fn reconcile_tags(
    form: web::Form<HashMap<String, String>>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let entries = reconcile::parse_form_keys("tags", &form.into_inner());
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        reconcile::reconcile_tags(store.as_mut(), &entries)?;
        Ok(())
    })
    .await??;

    Ok(HttpResponse::Ok().body("OK"))
}

#[get("/roles")]
async fn list_roles(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    let roles: Vec<programme_api_types::Role> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_roles()?)
    })
    .await??
    .into_iter()
    .map(|role| role.into())
    .collect();

    Ok(web::Json(roles))
}

#[post("/roles")]
async fn reconcile_roles(
    form: web::Form<HashMap<String, String>>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let entries = reconcile::parse_form_keys("roles", &form.into_inner());
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        reconcile::reconcile_roles(store.as_mut(), &entries)?;
        Ok(())
    })
    .await??;

    Ok(HttpResponse::Ok().body("OK"))
}
