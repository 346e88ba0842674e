use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Principal;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{AssessmentRequest, Submission};
use crate::state::SharedState;
use crate::store::SubmissionStats;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub questions_answered: usize,
    pub skills_selected: usize,
    pub experience_level: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub submission_id: String,
    pub submitted_at: DateTime<Utc>,
    pub status: &'static str,
    pub summary: SubmissionSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyAssessments {
    pub assessments: Vec<Submission>,
    pub total_submissions: usize,
    pub user_id: String,
    pub retrieved_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllAssessments {
    pub assessments: Vec<Submission>,
    pub total_submissions: usize,
    pub retrieved_at: DateTime<Utc>,
    pub retrieved_by: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDetail {
    pub assessment: Submission,
    pub retrieved_at: DateTime<Utc>,
    pub retrieved_by: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedAssessment {
    pub message: &'static str,
    pub submission_id: String,
    pub deleted_by: String,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    #[serde(flatten)]
    pub stats: SubmissionStats,
    pub generated_at: DateTime<Utc>,
    pub generated_by: String,
}

pub async fn submit(
    principal: Principal,
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(req) = payload?;
    let mut record = req.validate()?;

    if record.user_agent.is_none() {
        record.user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }

    let submission = state.submissions.submit(record, &principal.id);

    tracing::info!(
        submission_id = %submission.id,
        user = %principal.label(),
        experience = %submission.experience,
        skills = submission.skills.len(),
        "Assessment submitted"
    );
    audit::log_event(
        &principal.id,
        "assessment.submitted",
        "assessment",
        Some(&submission.id),
        None,
    );

    Ok(Json(SubmitResponse {
        success: true,
        message: "Assessment submitted successfully",
        summary: SubmissionSummary {
            questions_answered: submission.technical_answers.len(),
            skills_selected: submission.skills.len(),
            experience_level: submission.experience.clone(),
        },
        submission_id: submission.id,
        submitted_at: submission.submitted_at,
        status: "RECEIVED",
    }))
}

pub async fn mine(principal: Principal, State(state): State<SharedState>) -> Json<MyAssessments> {
    let assessments = state.submissions.list_by_owner(&principal.id);
    Json(MyAssessments {
        total_submissions: assessments.len(),
        assessments,
        user_id: principal.id,
        retrieved_at: Utc::now(),
    })
}

pub async fn list(principal: Principal, State(state): State<SharedState>) -> Json<AllAssessments> {
    let assessments = state.submissions.list_all();
    tracing::debug!(admin = %principal.label(), count = assessments.len(), "Listing all assessments");
    Json(AllAssessments {
        total_submissions: assessments.len(),
        assessments,
        retrieved_at: Utc::now(),
        retrieved_by: principal.label().to_string(),
    })
}

pub async fn get(
    principal: Principal,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<AssessmentDetail>, AppError> {
    let assessment = state
        .submissions
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;

    Ok(Json(AssessmentDetail {
        assessment,
        retrieved_at: Utc::now(),
        retrieved_by: principal.label().to_string(),
    }))
}

pub async fn delete(
    principal: Principal,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedAssessment>, AppError> {
    let removed = state
        .submissions
        .delete(&id)
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;

    audit::log_event(
        &principal.id,
        "assessment.deleted",
        "assessment",
        Some(&removed.id),
        Some(serde_json::json!({ "owner": removed.user_id })),
    );

    Ok(Json(DeletedAssessment {
        message: "Assessment deleted successfully",
        submission_id: removed.id,
        deleted_by: principal.label().to_string(),
        deleted_at: Utc::now(),
    }))
}

pub async fn stats(principal: Principal, State(state): State<SharedState>) -> Json<StatsReport> {
    Json(StatsReport {
        stats: state.submissions.stats(),
        generated_at: Utc::now(),
        generated_by: principal.label().to_string(),
    })
}
