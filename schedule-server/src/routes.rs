use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use tracing::{debug, error};

use schedule_feed::{build_schedule, error_document, Schedule};

use crate::cache::{FeedFormat, RenderCache, RenderKey};
use crate::forms::{LanguageInput, SubEventLanguageForm};
use crate::store::Store;

const XML_CONTENT_TYPE: &str = "application/xml";
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

const NOT_FOUND_MESSAGE: &str = "Event not found";
const NOT_A_SERIES_MESSAGE: &str =
    "Event is not an event-series: configure the event's dates as a series in the organizer backend";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub cache: Arc<RenderCache>,
}

/// All of the plugin's routes, registered explicitly at startup.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/event/:organizer/:event/schedule.xml", get(schedule_xml))
        .route("/api/v1/event/:organizer/:event/schedule.md", get(schedule_md))
        .route(
            "/control/event/:organizer/:event/subevent/:subevent/language",
            get(language_form).post(save_language),
        )
        .with_state(state)
}

fn xml_body(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
}

/// Best-effort absolute URL of the feed itself, omitted when the Host
/// header is unusable.
fn feed_url(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    Some(format!("http://{host}{uri}"))
}

/// Resolves the event series and derives the schedule tree, or produces
/// the 404/400 error document.
async fn resolve_schedule(
    state: &AppState,
    organizer: &str,
    event: &str,
    url: Option<String>,
) -> Result<Schedule, Response> {
    let Some(record) = state.store.event(organizer, event) else {
        return Err(xml_body(
            StatusCode::NOT_FOUND,
            error_document(NOT_FOUND_MESSAGE),
        ));
    };

    if !record.event.has_subevents {
        return Err(xml_body(
            StatusCode::BAD_REQUEST,
            error_document(NOT_A_SERIES_MESSAGE),
        ));
    }

    let languages = state.store.languages_for(record).await;

    Ok(build_schedule(
        &record.event,
        &record.subevents,
        |id| languages.get(&id).copied(),
        url,
    ))
}

async fn schedule_xml(
    State(state): State<AppState>,
    Path((organizer, event)): Path<(String, String)>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let key = RenderKey {
        organizer: organizer.clone(),
        event: event.clone(),
        format: FeedFormat::Xml,
    };

    if let Some(body) = state.cache.get(&key).await {
        debug!(%organizer, %event, "serving schedule.xml from cache");
        return xml_body(StatusCode::OK, body.as_ref().clone());
    }

    let url = feed_url(&headers, &uri);
    let schedule = match resolve_schedule(&state, &organizer, &event, url).await {
        Ok(schedule) => schedule,
        Err(response) => return response,
    };

    match schedule.to_xml() {
        Ok(body) => {
            let body = Arc::clone(&state.cache).insert(key, body).await;
            xml_body(StatusCode::OK, body.as_ref().clone())
        }
        Err(err) => {
            error!(%organizer, %event, error = %err, "failed to render schedule");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render schedule").into_response()
        }
    }
}

async fn schedule_md(
    State(state): State<AppState>,
    Path((organizer, event)): Path<(String, String)>,
) -> Response {
    let key = RenderKey {
        organizer: organizer.clone(),
        event: event.clone(),
        format: FeedFormat::Markdown,
    };

    if let Some(body) = state.cache.get(&key).await {
        debug!(%organizer, %event, "serving schedule.md from cache");
        return (
            [(header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)],
            body.as_ref().clone(),
        )
            .into_response();
    }

    let schedule = match resolve_schedule(&state, &organizer, &event, None).await {
        Ok(schedule) => schedule,
        Err(response) => return response,
    };

    let body = Arc::clone(&state.cache).insert(key, schedule.to_markdown()).await;
    (
        [(header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)],
        body.as_ref().clone(),
    )
        .into_response()
}

/// Checks that the sub-event exists under the given series before any
/// form state is shown or saved.
fn resolve_form(
    state: &AppState,
    organizer: &str,
    event: &str,
    subevent: i64,
) -> Result<SubEventLanguageForm, Response> {
    let known = state
        .store
        .event(organizer, event)
        .map(|record| record.subevents.iter().any(|se| se.id == subevent))
        .unwrap_or(false);

    if !known {
        return Err((StatusCode::NOT_FOUND, "Sub-event not found").into_response());
    }

    Ok(SubEventLanguageForm {
        organizer: organizer.to_string(),
        event: event.to_string(),
        subevent,
    })
}

async fn language_form(
    State(state): State<AppState>,
    Path((organizer, event, subevent)): Path<(String, String, i64)>,
) -> Response {
    match resolve_form(&state, &organizer, &event, subevent) {
        Ok(form) => Json(form.state(&state.store).await).into_response(),
        Err(response) => response,
    }
}

async fn save_language(
    State(state): State<AppState>,
    Path((organizer, event, subevent)): Path<(String, String, i64)>,
    Form(input): Form<LanguageInput>,
) -> Response {
    let form = match resolve_form(&state, &organizer, &event, subevent) {
        Ok(form) => form,
        Err(response) => return response,
    };

    match form.save(&state.store, input).await {
        Ok(language) => {
            state.cache.invalidate_event(&organizer, &event).await;
            Json(serde_json::json!({ "language": language.code() })).into_response()
        }
        Err(err) => {
            error!(%organizer, %event, subevent, error = %err, "failed to save language");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to save language").into_response()
        }
    }
}
