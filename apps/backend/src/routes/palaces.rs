//! Palace endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use palace_core::Palace;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/palaces
pub async fn list(State(state): State<AppState>) -> Result<Json<PalaceListResponse>> {
    let now = Utc::now();
    let palaces = state
        .store
        .palaces()
        .await?
        .iter()
        .map(|p| PalaceSummary::from_palace(p, now))
        .collect();
    Ok(Json(PalaceListResponse { palaces }))
}

/// POST /api/palaces
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreatePalaceRequest>,
) -> Result<(StatusCode, Json<Palace>)> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let palace = new_palace(request.title, request.description, request.image_url, request.objects);
    let palace = state.store.add_palace(palace).await?;
    tracing::info!(palace_id = %palace.id, loci = palace.loci.len(), "palace created");

    Ok((StatusCode::CREATED, Json(palace)))
}

/// POST /api/palaces/generate
///
/// Paints the palace from its description, then asks the vision model which
/// objects in the picture can hold concepts.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GeneratePalaceRequest>,
) -> Result<(StatusCode, Json<Palace>)> {
    if request.title.trim().is_empty() || request.description.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "title and description are required".to_string(),
        ));
    }

    let generator = state.generator()?;
    let image_url = generator.palace_image(&request.description).await?;
    let objects = generator.extract_loci(&image_url).await?;

    let palace = new_palace(request.title, request.description, image_url, objects);
    let palace = state.store.add_palace(palace).await?;
    tracing::info!(palace_id = %palace.id, loci = palace.loci.len(), "palace generated");

    Ok((StatusCode::CREATED, Json(palace)))
}

/// GET /api/palaces/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(palace_id): Path<String>,
) -> Result<Json<Palace>> {
    Ok(Json(state.store.palace(&palace_id).await?))
}

/// DELETE /api/palaces/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(palace_id): Path<String>,
) -> Result<StatusCode> {
    state.store.delete_palace(&palace_id).await?;
    state.sessions.remove_for_palace(&palace_id).await;
    tracing::info!(%palace_id, "palace deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/palaces/{id}/loci/{locus_id}
pub async fn update_locus(
    State(state): State<AppState>,
    Path((palace_id, locus_id)): Path<(String, String)>,
    Json(request): Json<UpdateLocusRequest>,
) -> Result<Json<Locus>> {
    let locus = state
        .store
        .update_palace(&palace_id, |palace| {
            let locus = palace.locus_mut(&locus_id)?;
            if let Some(concept) = request.concept {
                locus.concept = concept;
            }
            if let Some(mental_image) = request.mental_image {
                locus.mental_image = Some(mental_image);
            }
            if let Some(explanation) = request.explanation {
                locus.explanation = Some(explanation);
            }
            Ok(locus.clone())
        })
        .await?;

    Ok(Json(locus))
}

/// POST /api/palaces/{id}/loci/{locus_id}/mnemonic
pub async fn locus_mnemonic(
    State(state): State<AppState>,
    Path((palace_id, locus_id)): Path<(String, String)>,
) -> Result<Json<Locus>> {
    let mut palace = state.store.palace(&palace_id).await?;
    let locus = palace.locus_mut(&locus_id)?;
    if !locus.is_anchored() {
        return Err(ApiError::BadRequest(
            "anchor a concept on this locus first".to_string(),
        ));
    }

    let (object, concept) = (locus.object_name.clone(), locus.concept.clone());
    let scene = state.generator()?.bizarre_mnemonic(&object, &concept).await?;

    let locus = state
        .store
        .update_palace(&palace_id, |palace| {
            let locus = palace.locus_mut(&locus_id)?;
            locus.mental_image = Some(scene);
            Ok(locus.clone())
        })
        .await?;

    Ok(Json(locus))
}

/// POST /api/palaces/{id}/loci/{locus_id}/feynman
///
/// One turn of explaining the locus concept to a curious student.
pub async fn feynman(
    State(state): State<AppState>,
    Path((palace_id, locus_id)): Path<(String, String)>,
    Json(request): Json<FeynmanRequest>,
) -> Result<Json<FeynmanResponse>> {
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    let mut palace = state.store.palace(&palace_id).await?;
    let locus = palace.locus_mut(&locus_id)?;
    if !locus.is_anchored() {
        return Err(ApiError::BadRequest(
            "anchor a concept on this locus first".to_string(),
        ));
    }
    let concept = locus.concept.clone();

    let mut history = request.history;
    history.push(ChatTurn::user(request.message.trim()));
    let reply = state
        .generator()?
        .feynman_reply(&palace.theme, &concept, &history)
        .await?;
    history.push(ChatTurn::model(reply.clone()));

    Ok(Json(FeynmanResponse { reply, history }))
}

/// POST /api/palaces/{id}/analysis
///
/// Fills the loci, in order, with the theme's key concepts.
pub async fn analyze(
    State(state): State<AppState>,
    Path(palace_id): Path<String>,
) -> Result<Json<AnalysisResponse>> {
    let palace = state.store.palace(&palace_id).await?;
    let concepts = state.generator()?.key_concepts(&palace.title).await?;

    let palace = state
        .store
        .update_palace(&palace_id, |palace| {
            palace.assign_concepts(&concepts);
            Ok(palace.clone())
        })
        .await?;

    Ok(Json(AnalysisResponse { concepts, palace }))
}

fn new_palace(title: String, description: String, image_url: String, objects: Vec<String>) -> Palace {
    let loci = objects
        .into_iter()
        .map(|object| object.trim().to_string())
        .filter(|object| !object.is_empty())
        .map(|object| Locus::new(Uuid::new_v4().to_string(), object))
        .collect();
    Palace::new(
        Uuid::new_v4().to_string(),
        title.trim(),
        description,
        image_url,
        loci,
        Utc::now(),
    )
}
