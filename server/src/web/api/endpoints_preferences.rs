use crate::diary::edit_prefs;
use crate::web::api::{edit_preferences, APIError, EDIT_PREFS_COOKIE};
use actix_web::cookie::Cookie;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use std::collections::HashMap;

#[get("/preferences")]
async fn get_preferences(req: HttpRequest) -> Result<impl Responder, APIError> {
    Ok(web::Json(edit_preferences(&req)))
}

/// Update the session's edit preferences from a string map (unknown keys and unparseable values
/// are ignored) and persist them in the session cookie.
#[post("/preferences")]
async fn update_preferences(
    data: web::Json<HashMap<String, String>>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let mut preferences = edit_preferences(&req);
    edit_prefs::apply_updates(&mut preferences, &data.into_inner());

    let cookie_value = serde_json::to_string(&preferences)
        .map_err(|e| APIError::InternalError(format!("Could not serialize preferences: {}", e)))?;
    let cookie = Cookie::build(EDIT_PREFS_COOKIE, cookie_value)
        .path("/")
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(preferences))
}
