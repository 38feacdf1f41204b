//! Lesson board routes
//!
//! Admins create and delete lessons and assign any instructor; instructors
//! list the board (their own calendar or the shared pool of unclaimed
//! lessons) and claim unclaimed lessons for themselves.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use slopeline_shared::Assignment;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::auth::MessageResponse;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListLessonsQuery {
    /// Filter by assignment: an instructor UUID or the sentinel "None"
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<Assignment>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    #[serde(rename = "type")]
    pub lesson_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(rename = "timeLength")]
    pub time_length: String,
    pub guests: i32,
    #[serde(rename = "assignedTo", default)]
    pub assigned_to: Option<Assignment>,
}

#[derive(Debug, Deserialize)]
pub struct AssignLessonRequest {
    #[serde(rename = "assignedTo")]
    pub assigned_to: Assignment,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub lesson_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(rename = "timeLength")]
    pub time_length: String,
    pub guests: i32,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Assignment,
}

#[derive(Debug, Serialize)]
pub struct LessonListResponse {
    pub lessons: Vec<LessonResponse>,
}

#[derive(Debug, Serialize)]
pub struct LessonMessageResponse {
    pub message: String,
    pub lesson: LessonResponse,
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct LessonRow {
    id: Uuid,
    lesson_type: String,
    date: OffsetDateTime,
    time_length: String,
    guests: i32,
    assigned_to: Option<Uuid>,
}

impl From<LessonRow> for LessonResponse {
    fn from(row: LessonRow) -> Self {
        Self {
            id: row.id,
            lesson_type: row.lesson_type,
            date: row.date,
            time_length: row.time_length,
            guests: row.guests,
            assigned_to: Assignment::from(row.assigned_to),
        }
    }
}

const LESSON_COLUMNS: &str = "id, lesson_type, date, time_length, guests, assigned_to";

// =============================================================================
// Handlers
// =============================================================================

/// List lessons, optionally filtered by assignment
pub async fn list_lessons(
    State(state): State<AppState>,
    Query(query): Query<ListLessonsQuery>,
) -> ApiResult<Json<LessonListResponse>> {
    let rows: Vec<LessonRow> = match query.assigned_to {
        None => {
            sqlx::query_as(&format!(
                "SELECT {LESSON_COLUMNS} FROM lessons ORDER BY date ASC"
            ))
            .fetch_all(&state.pool)
            .await?
        }
        Some(filter) => {
            // IS NOT DISTINCT FROM matches NULL when filtering for "None"
            sqlx::query_as(&format!(
                "SELECT {LESSON_COLUMNS} FROM lessons \
                 WHERE assigned_to IS NOT DISTINCT FROM $1 ORDER BY date ASC"
            ))
            .bind(filter.as_db())
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(Json(LessonListResponse {
        lessons: rows.into_iter().map(LessonResponse::from).collect(),
    }))
}

/// Create a lesson (admin only)
pub async fn create_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateLessonRequest>,
) -> ApiResult<(StatusCode, Json<LessonMessageResponse>)> {
    if !user.admin {
        return Err(ApiError::Forbidden);
    }

    if req.lesson_type.trim().is_empty() || req.time_length.trim().is_empty() {
        return Err(ApiError::Validation(
            "Lesson type and time length are required".to_string(),
        ));
    }
    if req.guests < 0 {
        return Err(ApiError::Validation(
            "Guest count cannot be negative".to_string(),
        ));
    }

    let assignment = req.assigned_to.unwrap_or(Assignment::Unassigned);
    ensure_instructor_exists(&state, &assignment).await?;

    let lesson_id = Uuid::new_v4();
    let row: LessonRow = sqlx::query_as(&format!(
        "INSERT INTO lessons (id, lesson_type, date, time_length, guests, assigned_to) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {LESSON_COLUMNS}"
    ))
    .bind(lesson_id)
    .bind(req.lesson_type.trim())
    .bind(req.date)
    .bind(req.time_length.trim())
    .bind(req.guests)
    .bind(assignment.as_db())
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(lesson_id = %lesson_id, created_by = %user.user_id, "create_lesson: Lesson created");

    Ok((
        StatusCode::CREATED,
        Json(LessonMessageResponse {
            message: "Lesson created".to_string(),
            lesson: row.into(),
        }),
    ))
}

/// Assign or claim a lesson
///
/// Instructors may only claim an unclaimed lesson for themselves; admins may
/// set any assignment, including back to unassigned. A claim is a single
/// conditional UPDATE, so the availability check and the write cannot be
/// separated: of two instructors racing for the same lesson, exactly one
/// wins and the other gets a conflict.
pub async fn assign_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lesson_id): Path<Uuid>,
    Json(req): Json<AssignLessonRequest>,
) -> ApiResult<Json<LessonMessageResponse>> {
    ensure_instructor_exists(&state, &req.assigned_to).await?;

    let row: Option<LessonRow> = if user.admin {
        sqlx::query_as(&format!(
            "UPDATE lessons SET assigned_to = $1 WHERE id = $2 RETURNING {LESSON_COLUMNS}"
        ))
        .bind(req.assigned_to.as_db())
        .bind(lesson_id)
        .fetch_optional(&state.pool)
        .await?
    } else {
        match req.assigned_to {
            Assignment::Instructor(id) if id.0 == user.user_id => {}
            _ => {
                return Err(ApiError::Forbidden);
            }
        }
        sqlx::query_as(&format!(
            "UPDATE lessons SET assigned_to = $1 \
             WHERE id = $2 AND (assigned_to IS NULL OR assigned_to = $1) \
             RETURNING {LESSON_COLUMNS}"
        ))
        .bind(user.user_id)
        .bind(lesson_id)
        .fetch_optional(&state.pool)
        .await?
    };

    let row = match row {
        Some(row) => row,
        None => {
            // Zero rows from a claim means either the lesson is gone or
            // someone else holds it; tell those apart after the fact
            let exists: Option<(bool,)> =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM lessons WHERE id = $1)")
                    .bind(lesson_id)
                    .fetch_optional(&state.pool)
                    .await?;
            if exists.map(|r| r.0).unwrap_or(false) {
                return Err(ApiError::Conflict(
                    "Lesson is already assigned to another instructor".to_string(),
                ));
            }
            return Err(ApiError::NotFound);
        }
    };

    tracing::info!(
        lesson_id = %lesson_id,
        assigned_by = %user.user_id,
        unassigned = req.assigned_to.is_unassigned(),
        "assign_lesson: Assignment updated"
    );

    Ok(Json(LessonMessageResponse {
        message: "Lesson assignment updated".to_string(),
        lesson: row.into(),
    }))
}

/// Delete a lesson (admin only)
pub async fn delete_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lesson_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if !user.admin {
        return Err(ApiError::Forbidden);
    }

    let deleted = sqlx::query("DELETE FROM lessons WHERE id = $1")
        .bind(lesson_id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(ApiError::NotFound);
    }

    tracing::info!(lesson_id = %lesson_id, deleted_by = %user.user_id, "delete_lesson: Lesson deleted");

    Ok(Json(MessageResponse {
        message: "Lesson deleted".to_string(),
    }))
}

/// Reject assignments that point at a nonexistent instructor before the
/// foreign key turns it into an opaque database error
async fn ensure_instructor_exists(state: &AppState, assignment: &Assignment) -> ApiResult<()> {
    if let Some(instructor_id) = assignment.as_db() {
        let exists: Option<(bool,)> =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(instructor_id)
                .fetch_optional(&state.pool)
                .await?;

        if !exists.map(|r| r.0).unwrap_or(false) {
            return Err(ApiError::BadRequest(
                "Assigned instructor does not exist".to_string(),
            ));
        }
    }
    Ok(())
}
