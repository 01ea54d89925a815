// src/search/executor.rs
//! Offset pagination over the job store.

use std::sync::Arc;
use tracing::error;

use crate::database::{Job, JobStore};
use crate::filters::FilterSelection;

/// Page size served to the infinite-scroll feed.
pub const DEFAULT_PAGE_SIZE: i64 = 6;

/// One fetched page. `failed` marks a degraded page produced by a store
/// error; such a page is always empty with `has_more = false`.
#[derive(Debug, Clone, Default)]
pub struct JobPage {
    pub items: Vec<Job>,
    pub has_more: bool,
    pub failed: bool,
}

impl JobPage {
    fn degraded() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            failed: true,
        }
    }
}

/// Issues count+page queries against the composed predicate and keeps the
/// `has_more` bookkeeping in one place.
pub struct PageExecutor {
    store: Arc<dyn JobStore>,
    page_size: i64,
}

impl PageExecutor {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Fetch one page (1-based). Store failures are logged and degrade to an
    /// empty page instead of propagating; the UI never crashes on a fetch.
    pub async fn fetch_page(&self, page: u32, selection: &FilterSelection) -> JobPage {
        match self.try_fetch(page, selection).await {
            Ok(page) => page,
            Err(e) => {
                error!("Job page fetch failed: {}", e);
                JobPage::degraded()
            }
        }
    }

    async fn try_fetch(&self, page: u32, selection: &FilterSelection) -> anyhow::Result<JobPage> {
        let page = page.max(1);
        let skip = (page as i64 - 1) * self.page_size;

        // Pass-through path: the first unfiltered page takes the newest rows
        // with no count query. `has_more` here is a full-page heuristic and
        // can report one extra page when the total is an exact multiple of
        // the page size; the filtered path below does exact accounting.
        if selection.is_empty() && page == 1 {
            let items = self.store.list_jobs(selection, 0, self.page_size).await?;
            let has_more = items.len() as i64 == self.page_size;
            return Ok(JobPage {
                items,
                has_more,
                failed: false,
            });
        }

        let total = self.store.count_jobs(selection).await?;
        let items = self.store.list_jobs(selection, skip, self.page_size).await?;
        let has_more = skip + (items.len() as i64) < total;

        Ok(JobPage {
            items,
            has_more,
            failed: false,
        })
    }
}
