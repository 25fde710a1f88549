use std::fmt::Display;

mod endpoints_diary;
mod endpoints_event;
mod endpoints_idea;
mod endpoints_mailout;
mod endpoints_media;
mod endpoints_preferences;
mod endpoints_showing;
mod endpoints_tag;
mod endpoints_template;
#[cfg(test)]
mod tests;

use crate::data_store::StoreError;
use crate::diary::date_range::InvalidDateError;
use crate::diary::edit_prefs;
use crate::diary::showings::{ShowingError, ValidationError};
use crate::mailout::JobError;
use actix_web::error::JsonPayloadError;
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    web, HttpRequest, HttpResponse,
};
use programme_api_types::{EditPreferences, OnSuccess};
use serde_json::json;

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(get_api_service());
}

fn get_api_service() -> actix_web::Scope {
    let json_config =
        web::JsonConfig::default().error_handler(|err, _req| APIError::InvalidJson(err).into());
    web::scope("/api/v1")
        .app_data(json_config)
        .service(endpoints_diary::get_diary_field)
        .service(endpoints_diary::get_diary)
        .service(endpoints_diary::get_diary_for_year)
        .service(endpoints_diary::get_diary_for_month)
        .service(endpoints_diary::get_diary_for_day)
        .service(endpoints_event::add_event)
        .service(endpoints_event::get_event)
        .service(endpoints_event::update_event)
        .service(endpoints_showing::create_showing)
        .service(endpoints_showing::update_showing)
        .service(endpoints_showing::delete_showing)
        .service(endpoints_idea::get_idea)
        .service(endpoints_idea::update_idea)
        .service(endpoints_tag::list_tags)
        .service(endpoints_tag::reconcile_tags)
        .service(endpoints_tag::list_roles)
        .service(endpoints_tag::reconcile_roles)
        .service(endpoints_template::list_templates)
        .service(endpoints_template::update_template)
        .service(endpoints_media::get_media_item)
        .service(endpoints_mailout::get_mailout_draft)
        .service(endpoints_mailout::enqueue_mailout)
        .service(endpoints_mailout::get_mailout_progress)
        .service(endpoints_preferences::get_preferences)
        .service(endpoints_preferences::update_preferences)
}

/// Name of the session cookie holding the JSON-serialized edit preferences
const EDIT_PREFS_COOKIE: &str = "editprefs";

/// Restore the session's edit preferences from the request cookie, falling back to the defaults.
fn edit_preferences(req: &HttpRequest) -> EditPreferences {
    let cookie = req.cookie(EDIT_PREFS_COOKIE);
    edit_prefs::from_cookie_value(cookie.as_ref().map(|c| c.value()))
}

/// The follow-up signal for a successful write, depending on the session's popup preference.
fn on_success(preferences: &EditPreferences) -> OnSuccess {
    if preferences.popups {
        OnSuccess::ClosePopup
    } else {
        OnSuccess::Redirect
    }
}

#[derive(Debug)]
pub enum APIError {
    NotExisting,
    AlreadyExisting,
    InvalidDate(InvalidDateError),
    ValidationFailed(ValidationError),
    PastShowing,
    InvalidJson(actix_web::error::JsonPayloadError),
    InvalidData(String),
    EntityIdMissmatch,
    TransactionConflict,
    InternalError(String),
}

impl Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotExisting => f.write_str("Element does not exist")?,
            Self::AlreadyExisting => f.write_str("Element already exists")?,
            Self::InvalidDate(e) => write!(f, "{}", e)?,
            Self::ValidationFailed(e) => write!(f, "Invalid form data: {}", e)?,
            Self::PastShowing => {
                f.write_str("Can't change showings that are in the past")?;
            }
            Self::InvalidJson(e) => {
                write!(f, "Invalid JSON request data: {}", e)?;
            }
            Self::InvalidData(e) => {
                write!(f, "Invalid request data: {}", e)?;
            }
            Self::EntityIdMissmatch => {
                f.write_str("Entity id in given data does not match URL")?;
            }
            Self::TransactionConflict => {
                f.write_str("Concurrent database transaction conflict. Please retry request.")?;
            }
            Self::InternalError(s) => {
                f.write_str("Internal error: ")?;
                f.write_str(s)?;
            }
        };
        Ok(())
    }
}

impl ResponseError for APIError {
    fn error_response(&self) -> HttpResponse {
        let message = format!("{}", self);

        let mut body = json!({
            "httpCode": self.status_code().as_u16(),
            "message": message
        });
        if let Self::ValidationFailed(e) = self {
            body["errors"] = json!(e.field_errors);
        }
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotExisting => StatusCode::NOT_FOUND,
            Self::AlreadyExisting => StatusCode::CONFLICT,
            Self::InvalidDate(InvalidDateError::ImpossibleDate { .. }) => StatusCode::NOT_FOUND,
            Self::InvalidDate(InvalidDateError::InvalidDaysAhead(_)) => StatusCode::BAD_REQUEST,
            Self::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PastShowing => StatusCode::FORBIDDEN,
            Self::InvalidJson(e) => match e {
                JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                JsonPayloadError::Deserialize(json_error) if json_error.is_data() => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EntityIdMissmatch => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TransactionConflict => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for APIError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConnectionError(error) => {
                Self::InternalError(format!("Could not connect to database: {}", error))
            }
            StoreError::QueryError(diesel_error) => Self::InternalError(format!(
                "Error while executing database query: {}",
                diesel_error
            )),
            StoreError::TransactionConflict => Self::TransactionConflict,
            StoreError::NotExisting => Self::NotExisting,
            StoreError::ConflictEntityExists => Self::AlreadyExisting,
            StoreError::InvalidInputData(e) => Self::InvalidData(e),
            StoreError::InvalidDataInDatabase(e) => Self::InternalError(format!(
                "Data queried from database could not be deserialized: {}",
                e
            )),
        }
    }
}

impl From<ShowingError> for APIError {
    fn from(e: ShowingError) -> Self {
        match e {
            ShowingError::Validation(e) => Self::ValidationFailed(e),
            ShowingError::PastShowing => Self::PastShowing,
            ShowingError::Store(e) => e.into(),
        }
    }
}

impl From<InvalidDateError> for APIError {
    fn from(e: InvalidDateError) -> Self {
        Self::InvalidDate(e)
    }
}

impl From<JobError> for APIError {
    fn from(e: JobError) -> Self {
        Self::InternalError(e.to_string())
    }
}

impl From<actix_web::error::BlockingError> for APIError {
    fn from(_e: actix_web::error::BlockingError) -> Self {
        APIError::InternalError(
            "Could not get thread from thread pool for synchronous database operation.".to_owned(),
        )
    }
}
