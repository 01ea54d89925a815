// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::config::AppConfig;
use crate::database::DatabaseConfig;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[get("/jobs?<q>&<commitment>&<exp>&<pay>&<skills>&<page>")]
pub async fn search_jobs(
    q: Option<String>,
    commitment: Vec<String>,
    exp: Vec<String>,
    pay: Vec<String>,
    skills: Vec<String>,
    page: Option<u32>,
    config: &State<ServerConfig>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<JobPageData>>, Json<StandardErrorResponse>> {
    let selection = crate::filters::FilterSelection::from_parts(q, commitment, exp, pay, skills);
    handlers::search_jobs_handler(selection, page, config, db_config).await
}

#[get("/jobs/<id>")]
pub async fn get_job(
    id: String,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<crate::database::Job>>, Json<StandardErrorResponse>> {
    handlers::get_job_handler(id, db_config).await
}

#[post("/jobs", data = "<request>")]
pub async fn create_job(
    request: Json<crate::database::NewJob>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<crate::database::Job>>, Json<StandardErrorResponse>> {
    handlers::create_job_handler(request, db_config).await
}

#[post("/jobs/<id>", data = "<request>")]
pub async fn update_job(
    id: String,
    request: Json<crate::database::NewJob>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<crate::database::Job>>, Json<StandardErrorResponse>> {
    handlers::update_job_handler(id, request, db_config).await
}

#[get("/health")]
pub async fn health() -> Json<TextResponse> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

fn build_rocket(server_config: ServerConfig, db_config: DatabaseConfig, port: u16) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .attach(Cors)
        .manage(server_config)
        .manage(db_config)
        .register("/api", catchers![bad_request, internal_error])
        .mount(
            "/api",
            routes![search_jobs, get_job, create_job, update_job, health, options],
        )
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let server_config = ServerConfig {
        page_size: config.search.page_size,
    };

    let mut db_config = DatabaseConfig::new(config.environment.database_path.clone());

    if let Err(e) = db_config.init_pool().await {
        error!("Failed to initialize database: {}", e);
        return Err(e);
    }

    if let Err(e) = db_config.migrate().await {
        error!("Failed to run database migrations: {}", e);
        return Err(e);
    }

    info!("Starting worklance job-search API server");
    info!("Database: {}", db_config.database_path.display());
    info!("Page size: {}", server_config.page_size);

    build_rocket(server_config, db_config, config.environment.port)
        .launch()
        .await?;

    Ok(())
}
