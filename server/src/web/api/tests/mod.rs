
use super::*;
use crate::data_store::store_mock::StoreMock;
use crate::diary::clock::FixedClock;
use crate::mailout::LocalJobRunner;
use crate::web::AppState;
use actix_web::body::MessageBody;
use actix_web::{http, test, web, App};
use std::sync::Arc;

fn test_state() -> (Arc<StoreMock>, AppState) {
    let data_store_mock = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&data_store_mock);
    let state = AppState::for_test(
        data_store_mock.clone(),
        Arc::new(LocalJobRunner::new()),
        Arc::new(FixedClock(
            sample_data::NOW.parse().expect("valid test timestamp"),
        )),
    );
    (data_store_mock, state)
}


#[actix_web::test]
async fn test_get_diary_for_month() {
    let (_store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/diary/2013/6")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let body = res.into_body().try_into_bytes().unwrap();
    let result: programme_api_types::DiaryView = serde_json::from_slice(&body).unwrap();

    assert_eq!(result.days, 30);
    assert_eq!(result.dates.len(), 30);
    let june_10 = result
        .dates
        .iter()
        .find(|day| day.date == chrono::NaiveDate::from_ymd_opt(2013, 6, 10).unwrap())
        .unwrap();
    assert_eq!(june_10.showings.len(), 1);
    assert_eq!(june_10.showings[0].event.name, "Sample Film");
    assert_eq!(result.ideas.len(), 1);
    assert_eq!(result.ideas[0].ideas, "june ideas");
}

#[actix_web::test]
async fn test_get_diary_with_invalid_daysahead() {
    let (_store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/diary?daysahead=soon")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_get_event_with_associations() {
    let (_store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/events/1").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let body = res.into_body().try_into_bytes().unwrap();
    let result: programme_api_types::Event = serde_json::from_slice(&body).unwrap();
    assert_eq!(result.name, "Sample Film");
    assert_eq!(result.tags, vec![1]);
    assert!(result.media.is_empty());
}

#[actix_web::test]
async fn test_get_idea_creates_missing_record() {
    let (store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/ideas/2013/7")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let body = res.into_body().try_into_bytes().unwrap();
    let result: programme_api_types::DiaryIdea = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        result.month,
        chrono::NaiveDate::from_ymd_opt(2013, 7, 1).unwrap()
    );
    assert_eq!(result.ideas, "");

    // the empty record has been persisted
    let data = store.data.lock().unwrap();
    assert!(data
        .ideas
        .iter()
        .any(|idea| idea.month == chrono::NaiveDate::from_ymd_opt(2013, 7, 1).unwrap()));
}

#[actix_web::test]
async fn test_create_showing_with_invalid_data() {
    let (store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    // start in the past and blank booked_by
    let req = test::TestRequest::post()
        .uri("/api/v1/events/1/showings")
        .set_json(serde_json::json!({
            "start": "2013-05-20T19:00:00Z",
            "bookedBy": " "
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.into_body().try_into_bytes().unwrap();
    let result: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(result["errors"]["start"].is_string());
    assert!(result["errors"]["booked_by"].is_string());
    assert_eq!(store.data.lock().unwrap().showings.len(), 2);
}

#[actix_web::test]
async fn test_create_showing() {
    let (store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/events/1/showings")
        .set_json(serde_json::json!({
            "start": "2013-07-05T19:00:00Z",
            "bookedBy": "someone",
            "confirmed": true
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CREATED);
    let body = res.into_body().try_into_bytes().unwrap();
    let result: programme_api_types::WriteResult = serde_json::from_slice(&body).unwrap();
    assert!(result.id.is_some());

    let data = store.data.lock().unwrap();
    assert_eq!(data.showings.len(), 3);
    // rota seeded from the standard roles
    assert_eq!(data.showings[2].rota.len(), 1);
    assert_eq!(data.showings[2].rota[0].role_id, 1);
}

#[actix_web::test]
async fn test_past_showing_is_protected() {
    let (store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::delete()
        .uri("/api/v1/showings/11")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::FORBIDDEN);
    assert_eq!(store.data.lock().unwrap().showings.len(), 2);
}

#[actix_web::test]
async fn test_reconcile_tags_endpoint() {
    let (store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/tags")
        .set_form([("tags[1]", "drama"), ("tags[-1]", "music")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);

    let data = store.data.lock().unwrap();
    let names: Vec<&str> = data.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["drama", "music"]);
}

#[actix_web::test]
async fn test_mailout_enqueue_and_progress() {
    let (_store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/mailout")
        .set_json(serde_json::json!({"subject": "Programme", "body": "Lots of films"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let body = res.into_body().try_into_bytes().unwrap();
    let result: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["status"], "ok");
    let task_id = result["task_id"].as_str().unwrap().to_owned();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/mailout/progress?task_id={}", task_id))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let body = res.into_body().try_into_bytes().unwrap();
    let progress: programme_api_types::MailoutProgress = serde_json::from_slice(&body).unwrap();
    assert!(progress.complete);
    assert_eq!(progress.error, Some(false));
}

#[actix_web::test]
async fn test_mailout_with_empty_subject() {
    let (_store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/mailout")
        .set_json(serde_json::json!({"subject": "", "body": "Lots of films"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let body = res.into_body().try_into_bytes().unwrap();
    let result: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["status"], "error");
    assert!(result["errors"]["subject"].is_string());
}

#[actix_web::test]
async fn test_preferences_update_sets_cookie() {
    let (_store, state) = test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/preferences")
        .set_json(serde_json::json!({"daysahead": "30", "ignored": "value"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == EDIT_PREFS_COOKIE)
        .expect("preferences cookie should be set");
    let saved: programme_api_types::EditPreferences =
        serde_json::from_str(cookie.value()).unwrap();
    assert_eq!(saved.daysahead, 30);
    assert!(saved.popups);
}
