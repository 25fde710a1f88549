use crate::cli_error::CliError;
use crate::data_store::get_store_from_env;
use crate::diary::clock::{Clock, SystemClock};
use crate::mailout::{JobRunner, LocalJobRunner};
use crate::setup::{
    get_listen_address_from_env, get_listen_port_from_env, get_venue_timezone_from_env,
};
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

mod api;

pub fn serve() -> Result<(), CliError> {
    log::info!("Starting programme server {}", crate::get_version());
    let state = AppState::new()?;
    actix_web::rt::System::new()
        .block_on(
            HttpServer::new(move || {
                App::new()
                    .configure(api::configure_app)
                    .app_data(web::Data::new(state.clone()))
                    .wrap(middleware::Compress::default())
            })
            .bind((get_listen_address_from_env()?, get_listen_port_from_env()?))
            .map_err(CliError::BindError)?
            .run(),
        )
        .map_err(CliError::ServerError)
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn crate::data_store::DiaryStore>,
    job_runner: Arc<dyn JobRunner>,
    clock: Arc<dyn Clock>,
    timezone: chrono_tz::Tz,
}

impl AppState {
    pub fn new() -> Result<Self, CliError> {
        Ok(Self {
            store: Arc::new(get_store_from_env()?),
            job_runner: Arc::new(LocalJobRunner::new()),
            clock: Arc::new(SystemClock),
            timezone: get_venue_timezone_from_env()?,
        })
    }

    #[cfg(test)]
    pub fn for_test(
        store: Arc<dyn crate::data_store::DiaryStore>,
        job_runner: Arc<dyn JobRunner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            job_runner,
            clock,
            timezone: chrono_tz::Tz::Europe__London,
        }
    }
}
