// src/web/handlers.rs

use crate::database::{DatabaseConfig, Job, JobRepository, NewJob, SqliteJobStore};
use crate::filters::FilterSelection;
use crate::search::PageExecutor;
use crate::web::types::{
    DataResponse, JobPageData, ServerConfig, StandardErrorResponse, TextResponse,
};

use rocket::serde::json::Json;
use rocket::State;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, info};

fn database_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Database connection failed".to_string(),
        "DATABASE_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
    ))
}

fn acquire_pool<'a>(
    db_config: &'a State<DatabaseConfig>,
) -> Result<&'a SqlitePool, Json<StandardErrorResponse>> {
    db_config.pool().map_err(|e| {
        error!("Database connection failed: {}", e);
        database_error()
    })
}

pub async fn search_jobs_handler(
    selection: FilterSelection,
    page: Option<u32>,
    config: &State<ServerConfig>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<JobPageData>>, Json<StandardErrorResponse>> {
    let pool = acquire_pool(db_config)?;

    let page_number = page.unwrap_or(1).max(1);

    let executor = PageExecutor::new(Arc::new(SqliteJobStore::new(pool.clone())))
        .with_page_size(config.page_size);

    // Store failures degrade inside the executor; the feed always receives a
    // well-formed (possibly empty) page.
    let fetched = executor.fetch_page(page_number, &selection).await;

    info!(
        "Job search page {} -> {} items (has_more: {})",
        page_number,
        fetched.items.len(),
        fetched.has_more
    );

    let data = JobPageData {
        page: page_number,
        has_more: fetched.has_more,
        jobs: fetched.items,
    };

    Ok(Json(DataResponse::success(
        format!("{} jobs on page {}", data.jobs.len(), page_number),
        data,
    )))
}

pub async fn get_job_handler(
    id: String,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<Job>>, Json<StandardErrorResponse>> {
    let pool = acquire_pool(db_config)?;

    match JobRepository::new(pool).find_by_id(&id).await {
        Ok(Some(job)) => Ok(Json(DataResponse::success(
            format!("Job '{}'", job.title),
            job,
        ))),
        Ok(None) => Err(Json(StandardErrorResponse::new(
            format!("Job '{}' not found", id),
            "JOB_NOT_FOUND".to_string(),
            vec!["Check the job id".to_string()],
        ))),
        Err(e) => {
            error!("Job lookup failed for {}: {}", id, e);
            Err(database_error())
        }
    }
}

pub async fn create_job_handler(
    request: Json<NewJob>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<Job>>, Json<StandardErrorResponse>> {
    let pool = acquire_pool(db_config)?;
    let new = request.into_inner();

    if let Err(message) = validate_job(&new) {
        return Err(Json(StandardErrorResponse::new(
            message,
            "VALIDATION_ERROR".to_string(),
            vec!["Fix the highlighted field and retry".to_string()],
        )));
    }

    match JobRepository::new(pool).create(&new).await {
        Ok(job) => {
            info!("Job posted: {} ({})", job.title, job.id);
            Ok(Json(DataResponse::success(
                format!("Job '{}' created", job.title),
                job,
            )))
        }
        Err(e) => {
            error!("Job creation failed: {}", e);
            Err(Json(StandardErrorResponse::new(
                "Failed to create job".to_string(),
                "JOB_CREATE_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
            )))
        }
    }
}

pub async fn update_job_handler(
    id: String,
    request: Json<NewJob>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<Job>>, Json<StandardErrorResponse>> {
    let pool = acquire_pool(db_config)?;
    let new = request.into_inner();

    if let Err(message) = validate_job(&new) {
        return Err(Json(StandardErrorResponse::new(
            message,
            "VALIDATION_ERROR".to_string(),
            vec!["Fix the highlighted field and retry".to_string()],
        )));
    }

    match JobRepository::new(pool).update(&id, &new).await {
        Ok(Some(job)) => Ok(Json(DataResponse::success(
            format!("Job '{}' updated", job.title),
            job,
        ))),
        Ok(None) => Err(Json(StandardErrorResponse::new(
            format!("Job '{}' not found", id),
            "JOB_NOT_FOUND".to_string(),
            vec!["Check the job id".to_string()],
        ))),
        Err(e) => {
            error!("Job update failed for {}: {}", id, e);
            Err(database_error())
        }
    }
}

pub async fn health_handler() -> Json<TextResponse> {
    Json(TextResponse::success(
        "Job search service is healthy".to_string(),
    ))
}

fn validate_job(new: &NewJob) -> Result<(), String> {
    if new.title.trim().is_empty() {
        return Err("Job title is required".to_string());
    }
    if new.min_experience < 0 || new.max_experience < 0 {
        return Err("Experience years cannot be negative".to_string());
    }
    Ok(())
}
