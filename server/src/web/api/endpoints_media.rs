use crate::web::api::APIError;
use crate::web::AppState;
use actix_web::{get, web, Responder};

/// Resolve a media item id (as referenced by an event's media list) to its file path, mimetype
/// and caption data.
#[get("/media/{media_item_id}")]
async fn get_media_item(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let media_item_id = path.into_inner();
    let media_item: programme_api_types::MediaItem = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_media_item(media_item_id)?)
    })
    .await??
    .into();

    Ok(web::Json(media_item))
}
