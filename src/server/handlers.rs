//! Route handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use crate::context::ServiceContext;
use crate::error::ServiceError;
use crate::params::{normalize_tags, validate_page, validate_text};
use crate::ports::{ImageRequest, Phrase};

/// Body of `POST /phrases`.
#[derive(Debug, Deserialize)]
pub struct NewPhrase {
    /// Phrase text.
    pub text: String,
}

/// Body of `PATCH /phrases/{id}`.
#[derive(Debug, Deserialize)]
pub struct PhraseUpdate {
    /// Replacement text.
    pub text: String,
}

/// Query string of `GET /phrases/{id}/candidates`.
#[derive(Debug, Default, Deserialize)]
pub struct CandidatesQuery {
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Candidates per page.
    pub per: Option<u32>,
}

/// Response of `GET /phrases/{id}/candidates`.
#[derive(Debug, Serialize)]
pub struct CandidatePage {
    /// The phrase the candidates illustrate.
    pub phrase_id: String,
    /// Page number served.
    pub page: u32,
    /// Page size used.
    pub per: u32,
    /// Candidate locators, best first. Empty past the last page.
    pub images: Vec<String>,
}

/// Body of `PUT /phrases/{id}/image`.
#[derive(Debug, Deserialize)]
pub struct ImageChoice {
    /// Chosen locator; `null` clears the image.
    pub image_url: Option<String>,
}

/// Body of `POST /images`.
#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    /// Text to illustrate.
    pub text: String,
    /// Optional labels for the backends.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Response of `POST /images`.
#[derive(Debug, Serialize)]
pub struct ImageAnswer {
    /// The locator found by the chain.
    pub url: String,
}

pub(crate) async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn create_phrase(
    State(ctx): State<ServiceContext>,
    Json(body): Json<NewPhrase>,
) -> Result<(StatusCode, Json<Phrase>), ApiError> {
    let phrase = ctx.create_phrase(&body.text).await?;
    Ok((StatusCode::CREATED, Json(phrase)))
}

pub(crate) async fn list_phrases(
    State(ctx): State<ServiceContext>,
) -> Result<Json<Vec<Phrase>>, ApiError> {
    Ok(Json(ctx.list_phrases().await?))
}

pub(crate) async fn get_phrase(
    State(ctx): State<ServiceContext>,
    Path(phrase_id): Path<String>,
) -> Result<Json<Phrase>, ApiError> {
    Ok(Json(ctx.get_phrase(&phrase_id).await?))
}

pub(crate) async fn update_phrase(
    State(ctx): State<ServiceContext>,
    Path(phrase_id): Path<String>,
    Json(body): Json<PhraseUpdate>,
) -> Result<Json<Phrase>, ApiError> {
    Ok(Json(ctx.update_phrase(&phrase_id, &body.text).await?))
}

pub(crate) async fn list_candidates(
    State(ctx): State<ServiceContext>,
    Path(phrase_id): Path<String>,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<CandidatePage>, ApiError> {
    let page = validate_page(query.page, query.per);
    let page = page.map_err(ServiceError::InvalidArgument)?;
    let images = ctx.image_candidates(&phrase_id, page).await?;
    Ok(Json(CandidatePage {
        phrase_id,
        page: page.number,
        per: page.size,
        images,
    }))
}

pub(crate) async fn set_image(
    State(ctx): State<ServiceContext>,
    Path(phrase_id): Path<String>,
    Json(body): Json<ImageChoice>,
) -> Result<Json<Phrase>, ApiError> {
    let image_url = body.image_url.as_deref();
    Ok(Json(ctx.set_phrase_image(&phrase_id, image_url).await?))
}

pub(crate) async fn generate_image(
    State(ctx): State<ServiceContext>,
    Json(body): Json<ImageQuery>,
) -> Result<Json<ImageAnswer>, ApiError> {
    let text = validate_text(&body.text);
    let text = text.map_err(ServiceError::InvalidArgument)?;
    let tags = normalize_tags(&body.tags);
    let request = ImageRequest::new(text).with_tags(tags);
    let url = ctx.images.generate(&request).await?;
    Ok(Json(ImageAnswer { url }))
}
