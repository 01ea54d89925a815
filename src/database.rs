// src/database.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use crate::filters::{push_filters, FilterSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    FullTime,
    PartTime,
    Internship,
    Freelance,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "FULL_TIME",
            JobType::PartTime => "PART_TIME",
            JobType::Internship => "INTERNSHIP",
            JobType::Freelance => "FREELANCE",
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "FULL_TIME" => Ok(JobType::FullTime),
            "PART_TIME" => Ok(JobType::PartTime),
            "INTERNSHIP" => Ok(JobType::Internship),
            "FREELANCE" => Ok(JobType::Freelance),
            other => anyhow::bail!("Unknown job type: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Currency {
    Inr,
    Usd,
}

impl std::str::FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "USD" => Ok(Currency::Usd),
            other => anyhow::bail!("Unknown currency: {}", other),
        }
    }
}

/// A posted job as stored and served. `posted_at` is the sole sort key for
/// search results (descending).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub job_type: JobType,
    pub min_experience: i64,
    pub max_experience: i64,
    pub description: String,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub currency: Currency,
    #[sqlx(json)]
    pub skills: Vec<String>,
    pub link: Option<String>,
    pub is_remote: bool,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub posted_at: DateTime<Utc>,
}

/// Payload for creating or updating a job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub job_type: JobType,
    pub min_experience: i64,
    pub max_experience: i64,
    #[serde(default)]
    pub description: String,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub currency: Currency,
    #[serde(default)]
    pub skills: Vec<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
    pub company_name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug)]
pub struct DatabaseConfig {
    pub database_path: PathBuf,
    pub pool: Option<SqlitePool>,
}

impl DatabaseConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            pool: None,
        }
    }

    /// Initialize the database connection pool
    pub async fn init_pool(&mut self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", self.database_path.display());

        let pool = SqlitePool::connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;
        self.pool = Some(pool);

        info!("Database connection pool initialized: {}", database_url);
        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool.as_ref().ok_or_else(|| {
            anyhow::anyhow!("Database pool not initialized. Call init_pool() first.")
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        migrate_schema(self.pool()?).await
    }
}

pub(crate) async fn migrate_schema(pool: &SqlitePool) -> Result<()> {
    // Create jobs table; skills is a JSON array of lowercase strings
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            job_type TEXT NOT NULL,
            min_experience INTEGER NOT NULL,
            max_experience INTEGER NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            min_salary INTEGER,
            max_salary INTEGER,
            currency TEXT NOT NULL DEFAULT 'USD',
            skills TEXT NOT NULL DEFAULT '[]',
            link TEXT,
            is_remote BOOLEAN NOT NULL DEFAULT FALSE,
            company_name TEXT,
            location TEXT,
            posted_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Index on posted_at: the feed's only sort key
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_jobs_posted_at
        ON jobs(posted_at);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_jobs_job_type
        ON jobs(job_type);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed successfully");
    Ok(())
}

const JOB_COLUMNS: &str = "id, title, job_type, min_experience, max_experience, description, \
     min_salary, max_salary, currency, skills, link, is_remote, company_name, location, posted_at";

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new job posting with a fresh id and `posted_at = now`.
    /// Skills are stored lowercase so overlap matching stays case-insensitive
    /// at the storage layer.
    pub async fn create(&self, new: &NewJob) -> Result<Job> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let skills = normalize_skills(&new.skills);

        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, job_type, min_experience, max_experience, description,
                              min_salary, max_salary, currency, skills, link, is_remote,
                              company_name, location, posted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.title)
        .bind(new.job_type)
        .bind(new.min_experience)
        .bind(new.max_experience)
        .bind(&new.description)
        .bind(new.min_salary)
        .bind(new.max_salary)
        .bind(new.currency)
        .bind(sqlx::types::Json(&skills))
        .bind(&new.link)
        .bind(new.is_remote)
        .bind(&new.company_name)
        .bind(&new.location)
        .bind(now)
        .execute(self.pool)
        .await?;

        info!("Created job: {} ({})", new.title, id);

        Ok(Job {
            id,
            title: new.title.clone(),
            job_type: new.job_type,
            min_experience: new.min_experience,
            max_experience: new.max_experience,
            description: new.description.clone(),
            min_salary: new.min_salary,
            max_salary: new.max_salary,
            currency: new.currency,
            skills,
            link: new.link.clone(),
            is_remote: new.is_remote,
            company_name: new.company_name.clone(),
            location: new.location.clone(),
            posted_at: now,
        })
    }

    /// Overwrite an existing posting. Returns the updated job, or `None`
    /// when no row carries that id. `posted_at` keeps its original value.
    pub async fn update(&self, id: &str, new: &NewJob) -> Result<Option<Job>> {
        let skills = normalize_skills(&new.skills);

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = ?, job_type = ?, min_experience = ?, max_experience = ?, description = ?,
                min_salary = ?, max_salary = ?, currency = ?, skills = ?, link = ?, is_remote = ?,
                company_name = ?, location = ?
            WHERE id = ?
            "#,
        )
        .bind(&new.title)
        .bind(new.job_type)
        .bind(new.min_experience)
        .bind(new.max_experience)
        .bind(&new.description)
        .bind(new.min_salary)
        .bind(new.max_salary)
        .bind(new.currency)
        .bind(sqlx::types::Json(&skills))
        .bind(&new.link)
        .bind(new.is_remote)
        .bind(&new.company_name)
        .bind(&new.location)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Updated job: {}", id);
        self.find_by_id(id).await
    }

    /// Find a job by id
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
        let sql = format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS);
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(job)
    }

    /// Count jobs matching the selection's predicate.
    pub async fn count(&self, selection: &FilterSelection) -> Result<i64> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        push_filters(&mut qb, selection);

        let total: i64 = qb.build_query_scalar().fetch_one(self.pool).await?;
        Ok(total)
    }

    /// List jobs matching the selection's predicate, newest first.
    pub async fn list(
        &self,
        selection: &FilterSelection,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Job>> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM jobs", JOB_COLUMNS));
        push_filters(&mut qb, selection);
        qb.push(" ORDER BY posted_at DESC LIMIT ")
            .push_bind(take)
            .push(" OFFSET ")
            .push_bind(skip);

        let jobs = qb.build_query_as::<Job>().fetch_all(self.pool).await?;
        Ok(jobs)
    }
}

fn normalize_skills(skills: &[String]) -> Vec<String> {
    skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The query contract the search pipeline consumes: a count and a page over
/// the same composed predicate, ordered by `posted_at` descending.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn count_jobs(&self, selection: &FilterSelection) -> Result<i64>;
    async fn list_jobs(
        &self,
        selection: &FilterSelection,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Job>>;
}

/// `JobStore` backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn count_jobs(&self, selection: &FilterSelection) -> Result<i64> {
        JobRepository::new(&self.pool).count(selection).await
    }

    async fn list_jobs(
        &self,
        selection: &FilterSelection,
        skip: i64,
        take: i64,
    ) -> Result<Vec<Job>> {
        JobRepository::new(&self.pool)
            .list(selection, skip, take)
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    /// One-connection pool: every connection to `sqlite::memory:` opens its
    /// own database, so the pool must stay pinned to a single one.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        migrate_schema(&pool).await.expect("migrations");
        pool
    }

    pub fn new_job(title: &str, job_type: JobType) -> NewJob {
        NewJob {
            title: title.to_string(),
            job_type,
            min_experience: 0,
            max_experience: 10,
            description: String::new(),
            min_salary: None,
            max_salary: None,
            currency: Currency::Usd,
            skills: Vec::new(),
            link: None,
            is_remote: false,
            company_name: None,
            location: None,
        }
    }

    /// Insert a job whose `posted_at` is `now - index` seconds, so index 0
    /// is the newest row regardless of insertion timing.
    pub async fn seed_job(pool: &SqlitePool, index: i64, new: &NewJob) -> Job {
        let repo = JobRepository::new(pool);
        let mut job = repo.create(new).await.expect("create job");
        let posted_at = Utc::now() - Duration::seconds(index);

        sqlx::query("UPDATE jobs SET posted_at = ? WHERE id = ?")
            .bind(posted_at)
            .bind(&job.id)
            .execute(pool)
            .await
            .expect("set posted_at");

        job.posted_at = posted_at;
        job
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::filters::FilterSelection;

    #[tokio::test]
    async fn test_create_and_find_round_trip() {
        let pool = memory_pool().await;
        let repo = JobRepository::new(&pool);

        let mut new = new_job("Senior Rust Engineer", JobType::FullTime);
        new.skills = vec!["Rust ".to_string(), "SQLx".to_string()];
        new.min_salary = Some(90_000);
        new.max_salary = Some(120_000);

        let created = repo.create(&new).await.unwrap();
        let found = repo.find_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(found.title, "Senior Rust Engineer");
        assert_eq!(found.skills, vec!["rust", "sqlx"]);
        assert_eq!(found.min_salary, Some(90_000));
        assert_eq!(found.job_type, JobType::FullTime);
    }

    #[tokio::test]
    async fn test_update_overwrites_and_missing_id_is_none() {
        let pool = memory_pool().await;
        let repo = JobRepository::new(&pool);

        let created = repo
            .create(&new_job("Backend Dev", JobType::Freelance))
            .await
            .unwrap();

        let mut changed = new_job("Backend Developer", JobType::PartTime);
        changed.location = Some("Remote".to_string());

        let updated = repo.update(&created.id, &changed).await.unwrap().unwrap();
        assert_eq!(updated.title, "Backend Developer");
        assert_eq!(updated.job_type, JobType::PartTime);
        assert_eq!(updated.location.as_deref(), Some("Remote"));

        assert!(repo.update("no-such-id", &changed).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_selection_lists_all_newest_first() {
        let pool = memory_pool().await;

        for i in 0..3 {
            seed_job(&pool, i, &new_job(&format!("Job {}", i), JobType::FullTime)).await;
        }

        let repo = JobRepository::new(&pool);
        let jobs = repo.list(&FilterSelection::new(), 0, 10).await.unwrap();

        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Job 0", "Job 1", "Job 2"]);
        assert_eq!(repo.count(&FilterSelection::new()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_commitment_filter_is_membership() {
        let pool = memory_pool().await;
        seed_job(&pool, 0, &new_job("Full time", JobType::FullTime)).await;
        seed_job(&pool, 1, &new_job("Freelance", JobType::Freelance)).await;
        seed_job(&pool, 2, &new_job("Intern", JobType::Internship)).await;

        let repo = JobRepository::new(&pool);
        let selection = FilterSelection::new().with_commitments(&["FULL_TIME", "FREELANCE"]);

        let jobs = repo.list(&selection, 0, 10).await.unwrap();
        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Full time", "Freelance"]);
    }

    #[tokio::test]
    async fn test_experience_interval_overlap() {
        let pool = memory_pool().await;

        let mut overlapping = new_job("Overlaps", JobType::FullTime);
        overlapping.min_experience = 2;
        overlapping.max_experience = 4;
        seed_job(&pool, 0, &overlapping).await;

        let mut disjoint = new_job("Disjoint", JobType::FullTime);
        disjoint.min_experience = 7;
        disjoint.max_experience = 9;
        seed_job(&pool, 1, &disjoint).await;

        let repo = JobRepository::new(&pool);
        let selection = FilterSelection::new().with_experience(&["3-6 YOE"]);

        let jobs = repo.list(&selection, 0, 10).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Overlaps");
    }

    #[tokio::test]
    async fn test_experience_tokens_or_within_dimension() {
        let pool = memory_pool().await;

        let mut junior = new_job("Junior", JobType::FullTime);
        junior.min_experience = 0;
        junior.max_experience = 1;
        seed_job(&pool, 0, &junior).await;

        let mut senior = new_job("Senior", JobType::FullTime);
        senior.min_experience = 8;
        senior.max_experience = 12;
        seed_job(&pool, 1, &senior).await;

        let mut mid = new_job("Mid", JobType::FullTime);
        mid.min_experience = 3;
        mid.max_experience = 5;
        seed_job(&pool, 2, &mid).await;

        let repo = JobRepository::new(&pool);
        let selection = FilterSelection::new().with_experience(&["0-1 YOE", "6+ YOE"]);

        let jobs = repo.list(&selection, 0, 10).await.unwrap();
        let titles: Vec<_> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Junior", "Senior"]);
    }

    #[tokio::test]
    async fn test_pay_tokens_scale_to_thousands() {
        let pool = memory_pool().await;

        let mut matching = new_job("In band", JobType::FullTime);
        matching.min_salary = Some(25_000);
        matching.max_salary = Some(60_000);
        seed_job(&pool, 0, &matching).await;

        let mut above = new_job("Above band", JobType::FullTime);
        above.min_salary = Some(150_000);
        above.max_salary = Some(200_000);
        seed_job(&pool, 1, &above).await;

        // NULL salaries fail the range comparison and drop out
        seed_job(&pool, 2, &new_job("Unpriced", JobType::FullTime)).await;

        let repo = JobRepository::new(&pool);
        let selection = FilterSelection::new().with_pay(&["20-50"]);

        let jobs = repo.list(&selection, 0, 10).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "In band");
    }

    #[tokio::test]
    async fn test_skills_match_on_set_overlap() {
        let pool = memory_pool().await;

        let mut frontend = new_job("Frontend", JobType::Freelance);
        frontend.skills = vec!["react".to_string(), "node".to_string()];
        seed_job(&pool, 0, &frontend).await;

        let mut data = new_job("Data", JobType::Freelance);
        data.skills = vec!["python".to_string()];
        seed_job(&pool, 1, &data).await;

        let repo = JobRepository::new(&pool);
        let selection = FilterSelection::new().with_skills(&["React", "vue"]);

        let jobs = repo.list(&selection, 0, 10).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Frontend");
    }

    #[tokio::test]
    async fn test_text_search_is_literal_substring() {
        let pool = memory_pool().await;
        seed_job(&pool, 0, &new_job("100% remote Rust role", JobType::FullTime)).await;
        seed_job(&pool, 1, &new_job("1000 units shipped", JobType::FullTime)).await;

        let repo = JobRepository::new(&pool);

        let jobs = repo
            .list(&FilterSelection::new().with_search("100%"), 0, 10)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "100% remote Rust role");

        let jobs = repo
            .list(&FilterSelection::new().with_search("RUST"), 0, 10)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_range_token_matches_nothing() {
        let pool = memory_pool().await;
        seed_job(&pool, 0, &new_job("Anything", JobType::FullTime)).await;

        let repo = JobRepository::new(&pool);
        let selection = FilterSelection::new().with_experience(&["abc-def YOE"]);

        assert_eq!(repo.count(&selection).await.unwrap(), 0);
        assert!(repo.list(&selection, 0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dimensions_compose_as_conjunction() {
        let pool = memory_pool().await;

        let mut hit = new_job("Freelance junior react", JobType::Freelance);
        hit.min_experience = 0;
        hit.max_experience = 1;
        hit.skills = vec!["react".to_string()];
        seed_job(&pool, 0, &hit).await;

        let mut wrong_type = new_job("Full time junior react", JobType::FullTime);
        wrong_type.min_experience = 0;
        wrong_type.max_experience = 1;
        wrong_type.skills = vec!["react".to_string()];
        seed_job(&pool, 1, &wrong_type).await;

        let repo = JobRepository::new(&pool);
        let selection = FilterSelection::new()
            .with_commitments(&["FREELANCE"])
            .with_experience(&["0-1 YOE"])
            .with_skills(&["react"]);

        let jobs = repo.list(&selection, 0, 10).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Freelance junior react");
    }

    #[tokio::test]
    async fn test_list_paginates_without_gaps() {
        let pool = memory_pool().await;
        for i in 0..5 {
            seed_job(&pool, i, &new_job(&format!("Job {}", i), JobType::FullTime)).await;
        }

        let repo = JobRepository::new(&pool);
        let selection = FilterSelection::new();

        let first = repo.list(&selection, 0, 2).await.unwrap();
        let second = repo.list(&selection, 2, 2).await.unwrap();
        let third = repo.list(&selection, 4, 2).await.unwrap();

        let titles: Vec<_> = first
            .iter()
            .chain(second.iter())
            .chain(third.iter())
            .map(|j| j.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Job 0", "Job 1", "Job 2", "Job 3", "Job 4"]);
    }
}
