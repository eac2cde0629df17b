use crate::{error::ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use flowfield_core::{AudioClip, GenerateRequest, GenerateResponse};
use serde_json::{json, Value};
use std::sync::Arc;

/// Multipart field carrying the uploaded clip.
pub const AUDIO_FIELD: &str = "audio_file";

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "FlowField gateway for LLM and Whisper is running." }))
}

/// POST /generate: validate, dispatch once, return the validated flow field.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|detail| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, detail))?;

    match state.dispatcher.dispatch(&request).await {
        Ok(resp) => {
            if !request.available_styles.contains(&resp.style) {
                tracing::warn!(
                    target: "flowfield::http",
                    "Backend chose style '{}' outside available_styles {:?}",
                    resp.style,
                    request.available_styles
                );
            }
            Ok(Json(resp))
        }
        Err(e) => {
            tracing::error!(
                target: "flowfield::http",
                "Generation failed ({} / {}, {:?}): {}",
                e.provider,
                e.model,
                e.kind(),
                e
            );
            Err(e.into())
        }
    }
}

/// POST /transcribe: multipart `audio_file` (16 kHz WAV) → `{transcript}`.
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let Some(stt) = state.stt.clone() else {
        return Err(ApiError::internal("Whisper model is not available."));
    };

    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(AUDIO_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid multipart body: {}", e)))?;
            audio = Some(bytes);
            break;
        }
    }
    let Some(audio) = audio else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Missing multipart field '{}'", AUDIO_FIELD),
        ));
    };

    tracing::info!(target: "flowfield::stt", "Transcribing upload ({} bytes)", audio.len());

    let transcript = tokio::task::spawn_blocking(move || {
        let clip = AudioClip::from_wav_bytes(&audio)?;
        tracing::debug!(target: "flowfield::stt", "Decoded {:.2}s of audio", clip.duration_secs());
        stt.transcribe(&clip)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Transcription failed: {}", e)))?
    .map_err(|e| {
        tracing::error!(target: "flowfield::stt", "Transcription failed: {}", e);
        ApiError::internal(format!("Transcription failed: {}", e))
    })?;

    tracing::info!(target: "flowfield::stt", "Transcription: {}", transcript);
    Ok(Json(json!({ "transcript": transcript })))
}
