//! Paginated and filterable list fetching on top of the coordinator.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::PaginationConfig;
use crate::service::{CachePolicy, ServiceError};
use crate::state::{LifecycleState, StateController};

use super::coordinator::{AggregateCoordinator, CoordinatorError};
use super::filter::{FilterSet, Filterable};
use super::task::FetchTask;
use super::window::{Window, WindowError};

/// A list the fetcher can page through.
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Item: Filterable + Clone + Send + Sync + 'static;

    /// Items at 1-based positions `from..=to`.
    async fn fetch_range(
        &self,
        from: usize,
        to: usize,
        cache: CachePolicy,
    ) -> Result<Vec<Self::Item>, ServiceError>;

    /// Total number of items the source holds.
    async fn total_count(&self) -> Result<usize, ServiceError>;
}

type Items<Src> = Vec<<Src as ListSource>::Item>;

/// Keeps a list and its pagination window in step with a [`ListSource`].
///
/// The window and list only change after a successful cycle; a failed
/// cycle leaves both as they were and reports `Error` to the observer.
pub struct WindowedListFetcher<Src: ListSource> {
    source: Arc<Src>,
    coordinator: AggregateCoordinator,
    initial: Window,
    increment: usize,
    window: Window,
    items: Items<Src>,
    filters: Option<FilterSet>,
}

impl<Src: ListSource> WindowedListFetcher<Src> {
    /// # Errors
    /// Returns an error if the page size or increment would produce a
    /// window with `to <= from`.
    pub fn new(
        source: Arc<Src>,
        coordinator: AggregateCoordinator,
        pagination: &PaginationConfig,
    ) -> Result<Self, WindowError> {
        let initial = Window::initial(pagination.page_size)?;
        let increment = Window::check_increment(pagination.increment)?;
        Ok(Self {
            source,
            coordinator,
            initial,
            increment,
            window: initial,
            items: Vec::new(),
            filters: None,
        })
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn items(&self) -> &[Src::Item] {
        &self.items
    }

    /// Filters applied by the last successful [`filter_all`](Self::filter_all).
    pub fn active_filters(&self) -> Option<&FilterSet> {
        self.filters.as_ref()
    }

    pub fn controller(&self) -> &Arc<StateController> {
        self.coordinator.controller()
    }

    /// Fetch the first page, allowing cached data.
    pub async fn load_initial(&mut self) -> Result<LifecycleState, CoordinatorError> {
        self.replace_from_start(CachePolicy::UseCache).await
    }

    /// Fetch the first page bypassing the cache and replace the list.
    ///
    /// Clears any active filters on success.
    pub async fn refresh(&mut self) -> Result<LifecycleState, CoordinatorError> {
        self.replace_from_start(CachePolicy::BypassCache).await
    }

    /// Fetch the window after the current one and append it.
    ///
    /// Does not announce `Loading`. Active filters apply to the new page.
    pub async fn load_more(&mut self) -> Result<LifecycleState, CoordinatorError> {
        let next = self.window.advanced(self.increment);
        let filters = self.filters.clone();
        let task = self.range_task(
            next.from,
            next.to,
            CachePolicy::BypassCache,
            move |items, page| match &filters {
                Some(filters) => items.extend(filters.apply(page)),
                None => items.extend(page),
            },
        );

        let report = self
            .coordinator
            .run_silent(self.items.clone(), vec![task])
            .await?;

        if report.is_ready() {
            tracing::debug!(from = next.from, to = next.to, "Window advanced");
            self.window = next;
            self.items = report.snapshot;
        } else {
            tracing::debug!(
                from = self.window.from,
                to = self.window.to,
                "Load more failed, keeping previous window"
            );
        }
        Ok(report.state)
    }

    /// Fetch the whole list and keep only items matching `filters`.
    ///
    /// Asks the source for its size first. If that fails, falls back to a
    /// plain initial load. On success the window covers every fetched
    /// position, so a later `load_more` continues after the last item.
    pub async fn filter_all(
        &mut self,
        filters: FilterSet,
    ) -> Result<LifecycleState, CoordinatorError> {
        let count = match self.source.total_count().await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(
                    code = err.code,
                    error = %err,
                    "Item count unavailable, falling back to initial load"
                );
                return self.load_initial().await;
            }
        };

        let tasks = if count == 0 {
            Vec::new()
        } else {
            let criteria = filters.clone();
            vec![self.range_task(1, count, CachePolicy::UseCache, move |items, page| {
                *items = criteria.apply(page)
            })]
        };

        let report = self.coordinator.run(Vec::new(), tasks).await?;
        if report.is_ready() {
            tracing::debug!(
                total = count,
                kept = report.snapshot.len(),
                "Filtered full list"
            );
            self.window = self.initial.covering(count);
            self.items = report.snapshot;
            self.filters = Some(filters);
        }
        Ok(report.state)
    }

    async fn replace_from_start(
        &mut self,
        cache: CachePolicy,
    ) -> Result<LifecycleState, CoordinatorError> {
        let window = self.initial;
        let task = self.range_task(window.from, window.to, cache, |items, page| *items = page);

        let report = self.coordinator.run(Vec::new(), vec![task]).await?;
        if report.is_ready() {
            self.window = window;
            self.items = report.snapshot;
            self.filters = None;
        }
        Ok(report.state)
    }

    fn range_task<F>(
        &self,
        from: usize,
        to: usize,
        cache: CachePolicy,
        merge: F,
    ) -> FetchTask<Items<Src>>
    where
        F: FnOnce(&mut Items<Src>, Items<Src>) + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        FetchTask::new(
            "list_range",
            async move { source.fetch_range(from, to, cache).await },
            merge,
        )
    }
}
