use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tutor_exercise::{ExerciseInstance, SubmitOutcome};
use uuid::Uuid;
use validator::Validate;

use crate::{
    ApiState,
    error::ApiError,
    exercise::model::{
        CompleteResponse, ExerciseRequest, ExerciseResponse, SubmitRequest, SubmitResponse,
    },
    metrics,
};

/// Create the exercise routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/exercises", post(create_exercise))
        .route(
            "/exercises/{exercise_id}",
            put(replace_exercise).delete(delete_exercise),
        )
        .route("/exercises/{exercise_id}/word-bank", get(get_word_bank))
        .route("/exercises/{exercise_id}/submit", post(submit))
        .route("/exercises/{exercise_id}/retry", post(retry))
        .route("/exercises/{exercise_id}/complete", post(complete))
}

/// Reject targets that resolve to nothing in the loaded pool.
fn ensure_resolvable(state: &ApiState, payload: &ExerciseRequest) -> Result<(), ApiError> {
    if state
        .assembler
        .count_semantic_units(&payload.target, &state.vocabulary)
        == 0
    {
        return Err(ApiError::Validation(
            "Target does not resolve to any answer word".to_string(),
        ));
    }
    Ok(())
}

async fn create_exercise(
    State(state): State<ApiState>,
    Json(payload): Json<ExerciseRequest>,
) -> Result<(StatusCode, Json<ExerciseResponse>), ApiError> {
    payload.validate()?;
    ensure_resolvable(&state, &payload)?;

    let content = payload.content(state.assembler.max_size());
    let max_size = content.max_size;
    let seed = payload.seed.unwrap_or_else(rand::random);
    let mut instance = ExerciseInstance::new(
        content,
        Arc::clone(&state.vocabulary),
        Arc::clone(&state.assembler),
        seed,
    )?;

    let response = ExerciseResponse::from_instance(&mut instance);
    metrics::record_word_bank_generated(response.tiles.len(), max_size);
    let exercise_id = state.exercises.insert(instance).await;

    tracing::info!(
        %exercise_id,
        units = response.expected_unit_count,
        tiles = response.tiles.len(),
        "Exercise created"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

async fn replace_exercise(
    State(state): State<ApiState>,
    Path(exercise_id): Path<Uuid>,
    Json(payload): Json<ExerciseRequest>,
) -> Result<Json<ExerciseResponse>, ApiError> {
    payload.validate()?;
    ensure_resolvable(&state, &payload)?;

    let content = payload.content(state.assembler.max_size());
    let max_size = content.max_size;
    let (changed, response) = state
        .exercises
        .with(exercise_id, |instance| {
            let changed = instance.set_content(content)?;
            Ok::<_, ApiError>((changed, ExerciseResponse::from_instance(instance)))
        })
        .await??;

    if changed {
        metrics::record_word_bank_generated(response.tiles.len(), max_size);
        tracing::info!(%exercise_id, "Exercise content replaced");
    }

    Ok(Json(response))
}

async fn get_word_bank(
    State(state): State<ApiState>,
    Path(exercise_id): Path<Uuid>,
) -> Result<Json<ExerciseResponse>, ApiError> {
    let response = state
        .exercises
        .with(exercise_id, ExerciseResponse::from_instance)
        .await?;

    Ok(Json(response))
}

async fn submit(
    State(state): State<ApiState>,
    Path(exercise_id): Path<Uuid>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    payload.validate()?;

    let outcome = state
        .exercises
        .with(exercise_id, |instance| {
            instance.submit(&payload.display_keys, state.tracker.as_ref())
        })
        .await?;

    match outcome {
        Ok(SubmitOutcome::Judged(judgement)) => {
            metrics::record_submission(if judgement.result.overall_correct {
                "correct"
            } else {
                "incorrect"
            });
            Ok(Json(judgement.into()))
        }
        Ok(SubmitOutcome::NotReady { expected, actual }) => {
            metrics::record_submission("not_ready");
            Err(ApiError::NotReady { expected, actual })
        }
        Ok(SubmitOutcome::Duplicate) => {
            metrics::record_submission("duplicate");
            Err(ApiError::Conflict(
                "This attempt was already submitted, retry to start a new one".to_string(),
            ))
        }
        Err(e) => {
            metrics::record_submission("rejected");
            Err(e.into())
        }
    }
}

async fn retry(
    State(state): State<ApiState>,
    Path(exercise_id): Path<Uuid>,
) -> Result<Json<ExerciseResponse>, ApiError> {
    let response = state
        .exercises
        .with(exercise_id, |instance| {
            instance.retry();
            ExerciseResponse::from_instance(instance)
        })
        .await?;

    Ok(Json(response))
}

async fn complete(
    State(state): State<ApiState>,
    Path(exercise_id): Path<Uuid>,
) -> Result<Json<CompleteResponse>, ApiError> {
    // The ledger call is awaited outside the registry lock
    let (gate, reward_key, passed) = state
        .exercises
        .with(exercise_id, |instance| {
            (
                instance.gate(),
                instance.reward_key().to_string(),
                instance.is_passed(),
            )
        })
        .await?;

    if !passed {
        return Err(ApiError::Conflict(
            "Exercise has not been answered correctly yet".to_string(),
        ));
    }

    let completion = gate
        .complete(state.ledger.as_ref(), &reward_key, state.xp_per_exercise)
        .await?;
    metrics::record_completion(completion.newly_granted(), completion.points());

    Ok(Json(completion.into()))
}

async fn delete_exercise(
    State(state): State<ApiState>,
    Path(exercise_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.exercises.remove(exercise_id).await {
        tracing::debug!(%exercise_id, "Exercise unmounted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Exercise {exercise_id} not found")))
    }
}
