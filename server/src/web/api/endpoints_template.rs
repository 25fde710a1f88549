use crate::web::api::{edit_preferences, on_success, APIError};
use crate::web::AppState;
use actix_web::{get, put, web, HttpRequest, Responder};
use programme_api_types::{EventTemplate, WriteResult};

#[get("/templates")]
async fn list_templates(state: web::Data<AppState>) -> Result<impl Responder, APIError> {
    let templates: Vec<EventTemplate> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.get_templates()?)
    })
    .await??
    .into_iter()
    .map(|template| template.into())
    .collect();

    Ok(web::Json(templates))
}

#[put("/templates/{template_id}")]
async fn update_template(
    path: web::Path<i32>,
    data: web::Json<EventTemplate>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, APIError> {
    let template_id = path.into_inner();
    let template = data.into_inner();
    if template_id != template.id {
        return Err(APIError::EntityIdMissmatch);
    }
    let preferences = edit_preferences(&req);
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        store.update_template(
            template_id,
            &template.name,
            template.roles,
            template.tags,
        )?;
        Ok(())
    })
    .await??;

    Ok(web::Json(WriteResult {
        id: None,
        on_success: on_success(&preferences),
    }))
}
