// src/jobs_cli.rs
use crate::database::{Currency, DatabaseConfig, JobRepository, JobType, NewJob};
use crate::filters::FilterSelection;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(about = "Manage job postings for the worklance API")]
pub struct JobsCli {
    #[command(subcommand)]
    pub command: JobsCommand,

    #[arg(long, default_value = "data/worklance.db")]
    pub database_path: PathBuf,
}

#[derive(Subcommand)]
pub enum JobsCommand {
    /// Add a single job posting
    Add {
        title: String,
        #[arg(long, default_value = "FULL_TIME")]
        job_type: String,
        #[arg(long, default_value_t = 0)]
        min_exp: i64,
        #[arg(long, default_value_t = 5)]
        max_exp: i64,
        #[arg(long)]
        min_salary: Option<i64>,
        #[arg(long)]
        max_salary: Option<i64>,
        #[arg(long, default_value = "USD")]
        currency: String,
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        remote: bool,
    },
    /// List the newest job postings
    List {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Import jobs from a CSV file
    Import { csv_file: PathBuf },
    /// Initialize the database
    Init,
}

pub async fn handle_jobs_command(cli: JobsCli) -> Result<()> {
    // Initialize database
    let mut db_config = DatabaseConfig::new(cli.database_path.clone());
    db_config.init_pool().await?;
    db_config.migrate().await?;

    let pool = db_config.pool()?;
    let repo = JobRepository::new(pool);

    match cli.command {
        JobsCommand::Add {
            title,
            job_type,
            min_exp,
            max_exp,
            min_salary,
            max_salary,
            currency,
            skills,
            company,
            location,
            link,
            remote,
        } => {
            let new = NewJob {
                title,
                job_type: JobType::from_str(&job_type)?,
                min_experience: min_exp,
                max_experience: max_exp,
                description: String::new(),
                min_salary,
                max_salary,
                currency: Currency::from_str(&currency)?,
                skills,
                link,
                is_remote: remote,
                company_name: company,
                location,
            };

            match repo.create(&new).await {
                Ok(job) => {
                    println!("✅ Job created:");
                    println!("   Title: {}", job.title);
                    println!("   Type:  {}", job.job_type.as_str());
                    println!("   ID:    {}", job.id);
                }
                Err(e) => {
                    println!("❌ Error: {}", e);
                }
            }
        }

        JobsCommand::List { limit } => match repo.list(&FilterSelection::default(), 0, limit).await
        {
            Ok(jobs) => {
                if jobs.is_empty() {
                    println!("No jobs found.");
                } else {
                    println!(
                        "{:<38} {:<12} {:<32} {:<20}",
                        "ID", "Type", "Title", "Posted"
                    );
                    println!("{}", "-".repeat(104));

                    for job in jobs {
                        println!(
                            "{:<38} {:<12} {:<32} {:<20}",
                            job.id,
                            job.job_type.as_str(),
                            job.title,
                            job.posted_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
            }
            Err(e) => {
                println!("❌ Error: {}", e);
            }
        },

        JobsCommand::Import { csv_file } => {
            if !csv_file.exists() {
                println!("❌ CSV file not found: {}", csv_file.display());
                return Ok(());
            }

            let content = tokio::fs::read_to_string(&csv_file).await?;
            let mut reader = csv::Reader::from_reader(content.as_bytes());

            let mut success_count = 0;
            let mut error_count = 0;

            for result in reader.records() {
                match result {
                    Ok(record) => match job_from_record(&record) {
                        Ok(new) => match repo.create(&new).await {
                            Ok(_) => {
                                success_count += 1;
                                println!("✅ Added: {}", new.title);
                            }
                            Err(e) => {
                                error_count += 1;
                                println!("❌ Failed to add {}: {}", new.title, e);
                            }
                        },
                        Err(e) => {
                            error_count += 1;
                            println!("⚠️  Skipping record: {}", e);
                        }
                    },
                    Err(e) => {
                        error_count += 1;
                        println!("❌ CSV parsing error: {}", e);
                    }
                }
            }

            println!("\nImport completed:");
            println!("  ✅ Success: {}", success_count);
            println!("  ❌ Errors:  {}", error_count);
        }

        JobsCommand::Init => {
            println!("✅ Database initialized at: {}", cli.database_path.display());
            println!("   Tables created: jobs (with posted_at and job_type indexes)");
            println!();
            println!("Usage:");
            println!("  cargo run -- jobs add <title> --job-type FREELANCE --skills rust,sqlx");
            println!("  cargo run -- jobs import jobs.csv");
            println!("  cargo run -- jobs list");
        }
    }

    Ok(())
}

/// Build a job from one CSV row:
/// `title,job_type,min_exp,max_exp,min_salary,max_salary,currency,skills,company,location`
/// with skills separated by `;`. Salary, company and location may be empty.
fn job_from_record(record: &csv::StringRecord) -> Result<NewJob> {
    let title = record.get(0).unwrap_or("").trim().to_string();
    if title.is_empty() {
        anyhow::bail!("missing title");
    }

    let job_type = JobType::from_str(record.get(1).unwrap_or("FULL_TIME"))?;
    let min_experience = parse_field(record.get(2), 0, "min_exp")?;
    let max_experience = parse_field(record.get(3), 5, "max_exp")?;
    let min_salary = optional_field(record.get(4))?;
    let max_salary = optional_field(record.get(5))?;
    let currency = Currency::from_str(record.get(6).unwrap_or("USD"))?;

    let skills: Vec<String> = record
        .get(7)
        .unwrap_or("")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(NewJob {
        title,
        job_type,
        min_experience,
        max_experience,
        description: String::new(),
        min_salary,
        max_salary,
        currency,
        skills,
        link: None,
        is_remote: false,
        company_name: non_empty(record.get(8)),
        location: non_empty(record.get(9)),
    })
}

fn parse_field(value: Option<&str>, default: i64, name: &str) -> Result<i64> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .with_context(|| format!("invalid {}: {}", name, raw)),
    }
}

fn optional_field(value: Option<&str>) -> Result<Option<i64>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Ok(Some(
            raw.parse::<i64>()
                .with_context(|| format!("invalid number: {}", raw))?,
        )),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
