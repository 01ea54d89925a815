//! Job-search backend for a freelance marketplace: a SQLite-backed job
//! store, the filter/pagination pipeline over it, and the HTTP surface that
//! serves the infinite-scroll job feed.

pub mod config;
pub mod database;
pub mod filters;
pub mod jobs_cli;
pub mod search;
pub mod web;

pub use config::AppConfig;
pub use database::{
    Currency, DatabaseConfig, Job, JobRepository, JobStore, JobType, NewJob, SqliteJobStore,
};
pub use filters::{FilterDimension, FilterSelection};
pub use search::{FeedPhase, JobPage, PageExecutor, PageView, SearchSession};
pub use web::start_web_server;
