use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::auth_extractor::BearerToken;
use crate::auth::{AuthError, Authorizer};
use crate::logic::fields::camel_case_value;
use crate::logic::{fingerprint, normalize_patch, NormalizedPatch, PatchTarget};
use crate::model::{Gender, Genre, Id, NewActor, NewMovie};
use crate::store::traits::{Store, PAGE_SIZE};

/// Media type required on PATCH requests.
pub const JSON_PATCH_MEDIA_TYPE: &str = "application/json-patch+json";

pub struct AppState<S> {
    pub store: Arc<S>,
    pub auth: Arc<dyn Authorizer>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            auth: Arc::clone(&self.auth),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request() -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new("Bad Request")))
}

fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not Found")))
}

fn unsupported_media_type() -> ApiError {
    (
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        Json(ErrorResponse::new("Unsupported Media Type")),
    )
}

fn internal_error(e: &anyhow::Error) -> ApiError {
    log::error!("internal error: {e:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal Server Error")),
    )
}

fn auth_error(e: AuthError) -> ApiError {
    if e.is_forbidden() {
        (StatusCode::FORBIDDEN, Json(ErrorResponse::new("Forbidden")))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Unauthorized")),
        )
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    /// 1-indexed page, clamped to 1 on non-numeric or sub-1 input.
    fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|page| page.parse::<i64>().ok())
            .map(|page| page.max(1))
            .unwrap_or(1)
    }

    fn search(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }

    fn offset(&self) -> i64 {
        (self.page() - 1) * PAGE_SIZE
    }
}

/// Content-type gate plus body parse and normalization for PATCH requests.
fn parse_patch_body<E: PatchTarget>(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<NormalizedPatch, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    if content_type != Some(JSON_PATCH_MEDIA_TYPE) {
        return Err(unsupported_media_type());
    }

    let ops: Value = serde_json::from_slice(body).map_err(|_| bad_request())?;
    let Some(ops) = ops.as_array() else {
        return Err(bad_request());
    };
    normalize_patch(ops, E::COLUMNS).map_err(|e| {
        log::debug!("patch rejected: {e}");
        bad_request()
    })
}

fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|_| bad_request())
}

/// Optional string fields on create: absent and null mean none, and an empty
/// or blank string normalizes to none.
fn optional_trimmed(value: Option<&Value>) -> Option<Option<String>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(None)
            } else {
                Some(Some(trimmed.to_string()))
            }
        }
        Some(_) => None,
    }
}

fn parse_new_actor(body: &Value) -> Option<NewActor> {
    let body = body.as_object()?;
    let name = body.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let age = body.get("age")?.as_i64().filter(|age| *age > 0)?;
    let gender = match body.get("gender") {
        None | Some(Value::Null) => None,
        Some(Value::String(g)) => Some(Gender::resolve(g)?),
        Some(_) => return None,
    };
    let photo_url = optional_trimmed(body.get("photoUrl"))?;

    Some(NewActor {
        name: name.to_string(),
        age,
        photo_url,
        gender,
    })
}

fn parse_new_movie(body: &Value) -> Option<NewMovie> {
    let body = body.as_object()?;
    let title = body.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    let genre = Genre::resolve(body.get("genre")?.as_str()?.trim())?;
    let release_date = match optional_trimmed(body.get("releaseDate"))? {
        Some(raw) => Some(
            chrono::NaiveDate::parse_from_str(&raw, crate::logic::mutate::DATE_FORMAT).ok()?,
        ),
        None => None,
    };
    let poster_url = optional_trimmed(body.get("posterUrl"))?;

    Some(NewMovie {
        title: title.to_string(),
        release_date,
        genre,
        poster_url,
    })
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

pub async fn list_actors<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth
        .authorize(&token, "read:actors")
        .await
        .map_err(auth_error)?;

    let offset = query.offset();
    let (actors, total) = match state.store.search_actors(query.search(), offset).await {
        Ok(page) => page,
        Err(e) => return Err(internal_error(&e)),
    };

    Ok(Json(camel_case_value(json!({
        "success": true,
        "actors": actors,
        "total_actors": total,
        "offset": offset,
    }))))
}

pub async fn create_actor<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state
        .auth
        .authorize(&token, "create:actors")
        .await
        .map_err(auth_error)?;

    let body = parse_body(&body)?;
    let new = parse_new_actor(&body).ok_or_else(bad_request)?;

    match state.store.insert_actor(new).await {
        Ok(actor) => Ok((
            StatusCode::CREATED,
            Json(json!({"success": true, "id": actor.id})),
        )),
        Err(e) => Err(internal_error(&e)),
    }
}

pub async fn get_actor<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Path(actor_id): Path<Id>,
) -> Result<Response, ApiError> {
    state
        .auth
        .authorize(&token, "read:actors")
        .await
        .map_err(auth_error)?;

    let actor = match state.store.get_actor(actor_id).await {
        Ok(Some(actor)) => actor,
        Ok(None) => return Err(not_found()),
        Err(e) => return Err(internal_error(&e)),
    };

    let etag = fingerprint(&actor).map_err(|e| internal_error(&e))?;
    let payload = camel_case_value(json!({"success": true, "actor": actor}));
    Ok(([(header::ETAG, etag)], Json(payload)).into_response())
}

pub async fn update_actor<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Path(actor_id): Path<Id>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    state
        .auth
        .authorize(&token, "modify:actors")
        .await
        .map_err(auth_error)?;

    let patch = parse_patch_body::<crate::model::Actor>(&headers, &body)?;

    let actor = match state.store.get_actor(actor_id).await {
        Ok(Some(actor)) => actor,
        Ok(None) => return Err(not_found()),
        Err(e) => return Err(internal_error(&e)),
    };

    let before = fingerprint(&actor).map_err(|e| internal_error(&e))?;

    // validate and mutate a scratch copy so a failing field leaves nothing behind
    let mut updated = actor.clone();
    if let Err(e) = updated.apply(&patch) {
        log::debug!("patch rejected: {e}");
        return Err(bad_request());
    }

    let after = fingerprint(&updated).map_err(|e| internal_error(&e))?;
    if after == before {
        // no content change, skip the store and hand back the same tag
        return Ok((StatusCode::NO_CONTENT, [(header::ETAG, before)]).into_response());
    }

    if let Err(e) = state.store.update_actor(&updated).await {
        return Err(internal_error(&e));
    }

    let payload = camel_case_value(json!({"success": true, "id": actor_id}));
    Ok((StatusCode::OK, [(header::ETAG, after)], Json(payload)).into_response())
}

pub async fn delete_actor<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Path(actor_id): Path<Id>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth
        .authorize(&token, "delete:actors")
        .await
        .map_err(auth_error)?;

    match state.store.delete_actor(actor_id).await {
        Ok(true) => Ok(Json(json!({"success": true, "id": actor_id}))),
        Ok(false) => Err(not_found()),
        Err(e) => Err(internal_error(&e)),
    }
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

pub async fn list_movies<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth
        .authorize(&token, "read:movies")
        .await
        .map_err(auth_error)?;

    let offset = query.offset();
    let (movies, total) = match state.store.search_movies(query.search(), offset).await {
        Ok(page) => page,
        Err(e) => return Err(internal_error(&e)),
    };

    Ok(Json(camel_case_value(json!({
        "success": true,
        "movies": movies,
        "total_movies": total,
        "offset": offset,
    }))))
}

pub async fn create_movie<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state
        .auth
        .authorize(&token, "create:movies")
        .await
        .map_err(auth_error)?;

    let body = parse_body(&body)?;
    let new = parse_new_movie(&body).ok_or_else(bad_request)?;

    match state.store.insert_movie(new).await {
        Ok(movie) => Ok((
            StatusCode::CREATED,
            Json(json!({"success": true, "id": movie.id})),
        )),
        Err(e) => Err(internal_error(&e)),
    }
}

pub async fn get_movie<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Path(movie_id): Path<Id>,
) -> Result<Response, ApiError> {
    state
        .auth
        .authorize(&token, "read:movies")
        .await
        .map_err(auth_error)?;

    let movie = match state.store.get_movie(movie_id).await {
        Ok(Some(movie)) => movie,
        Ok(None) => return Err(not_found()),
        Err(e) => return Err(internal_error(&e)),
    };

    let etag = fingerprint(&movie).map_err(|e| internal_error(&e))?;
    let payload = camel_case_value(json!({"success": true, "movie": movie}));
    Ok(([(header::ETAG, etag)], Json(payload)).into_response())
}

pub async fn update_movie<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Path(movie_id): Path<Id>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    state
        .auth
        .authorize(&token, "modify:movies")
        .await
        .map_err(auth_error)?;

    let patch = parse_patch_body::<crate::model::Movie>(&headers, &body)?;

    let movie = match state.store.get_movie(movie_id).await {
        Ok(Some(movie)) => movie,
        Ok(None) => return Err(not_found()),
        Err(e) => return Err(internal_error(&e)),
    };

    let before = fingerprint(&movie).map_err(|e| internal_error(&e))?;

    let mut updated = movie.clone();
    if let Err(e) = updated.apply(&patch) {
        log::debug!("patch rejected: {e}");
        return Err(bad_request());
    }

    let after = fingerprint(&updated).map_err(|e| internal_error(&e))?;
    if after == before {
        return Ok((StatusCode::NO_CONTENT, [(header::ETAG, before)]).into_response());
    }

    if let Err(e) = state.store.update_movie(&updated).await {
        return Err(internal_error(&e));
    }

    let payload = camel_case_value(json!({"success": true, "id": movie_id}));
    Ok((StatusCode::OK, [(header::ETAG, after)], Json(payload)).into_response())
}

pub async fn delete_movie<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Path(movie_id): Path<Id>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth
        .authorize(&token, "delete:movies")
        .await
        .map_err(auth_error)?;

    match state.store.delete_movie(movie_id).await {
        Ok(true) => Ok(Json(json!({"success": true, "id": movie_id}))),
        Ok(false) => Err(not_found()),
        Err(e) => Err(internal_error(&e)),
    }
}

// ---------------------------------------------------------------------------
// Casts
// ---------------------------------------------------------------------------

pub async fn create_cast<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state
        .auth
        .authorize(&token, "create:casts")
        .await
        .map_err(auth_error)?;

    let body = parse_body(&body)?;
    let movie_id = body
        .get("movie_id")
        .and_then(Value::as_i64)
        .filter(|id| *id > 0)
        .ok_or_else(bad_request)?;
    let actor_id = body
        .get("actor_id")
        .and_then(Value::as_i64)
        .filter(|id| *id > 0)
        .ok_or_else(bad_request)?;

    match state.store.create_cast(movie_id, actor_id).await {
        Ok(cast) => Ok((
            StatusCode::CREATED,
            Json(json!({"success": true, "id": cast.external_id()})),
        )),
        // unknown ids and duplicate pairs surface as constraint failures
        Err(e) => {
            log::debug!("cast rejected: {e:#}");
            Err(bad_request())
        }
    }
}

pub async fn delete_cast<S: Store>(
    State(state): State<AppState<S>>,
    BearerToken(token): BearerToken,
    Path((movie_id, actor_id)): Path<(Id, Id)>,
) -> Result<Json<Value>, ApiError> {
    state
        .auth
        .authorize(&token, "delete:casts")
        .await
        .map_err(auth_error)?;

    let cast = crate::model::Cast { movie_id, actor_id };
    match state.store.delete_cast(movie_id, actor_id).await {
        Ok(true) => Ok(Json(json!({"success": true, "id": cast.external_id()}))),
        Ok(false) => Err(not_found()),
        Err(e) => Err(internal_error(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_parameter_is_clamped() {
        let query = ListQuery {
            page: Some("abc".to_string()),
            search: None,
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.offset(), 0);

        let query = ListQuery {
            page: Some("0".to_string()),
            search: None,
        };
        assert_eq!(query.page(), 1);

        let query = ListQuery {
            page: Some("-2".to_string()),
            search: None,
        };
        assert_eq!(query.page(), 1);

        let query = ListQuery {
            page: Some("3".to_string()),
            search: None,
        };
        assert_eq!(query.offset(), 20);

        let query = ListQuery {
            page: None,
            search: None,
        };
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn new_actor_parsing_validates_shape() {
        let ok = parse_new_actor(&json!({
            "name": "  Tom Hanks ",
            "age": 68,
            "photoUrl": " https://example.com/th.jpg ",
            "gender": "MALE",
        }))
        .unwrap();
        assert_eq!(ok.name, "Tom Hanks");
        assert_eq!(ok.photo_url.as_deref(), Some("https://example.com/th.jpg"));
        assert_eq!(ok.gender, Some(Gender::Male));

        assert!(parse_new_actor(&json!({"name": "x", "age": 0})).is_none());
        assert!(parse_new_actor(&json!({"name": "  ", "age": 30})).is_none());
        assert!(parse_new_actor(&json!({"age": 30})).is_none());
        assert!(parse_new_actor(&json!({"name": "x", "age": 30, "gender": "M"})).is_none());
        assert!(parse_new_actor(&json!({"name": "x", "age": 30, "photoUrl": 5})).is_none());

        let minimal = parse_new_actor(&json!({"name": "x", "age": 30})).unwrap();
        assert_eq!(minimal.gender, None);
        assert_eq!(minimal.photo_url, None);
    }

    #[test]
    fn new_movie_parsing_validates_shape() {
        let ok = parse_new_movie(&json!({
            "title": "Contact",
            "genre": "SCI_FI",
            "releaseDate": "1997-07-11",
        }))
        .unwrap();
        assert_eq!(ok.genre, Genre::SciFi);
        assert!(ok.release_date.is_some());

        // empty release date means none, a malformed one is an error
        let blank = parse_new_movie(&json!({"title": "x", "genre": "DRAMA", "releaseDate": ""}))
            .unwrap();
        assert_eq!(blank.release_date, None);
        assert!(
            parse_new_movie(&json!({"title": "x", "genre": "DRAMA", "releaseDate": "07/11/1997"}))
                .is_none()
        );
        assert!(parse_new_movie(&json!({"title": "x", "genre": "ROMANCE"})).is_none());
        assert!(parse_new_movie(&json!({"title": "", "genre": "DRAMA"})).is_none());
    }
}
