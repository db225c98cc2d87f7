//! News feed screen: the current user plus the news list.

use std::sync::Arc;

use crate::fetch::{AggregateCoordinator, CoordinatorError, CoordinatorOptions, FetchTask};
use crate::service::{CachePolicy, NewsService, UserService};
use crate::state::{LifecycleState, StateController};

use super::view_models::{NewsViewModel, UserViewModel};
use super::SnapshotError;

#[derive(Debug, Default)]
struct NewsSnapshot {
    user: Option<UserViewModel>,
    news: Vec<NewsViewModel>,
}

/// Fully loaded feed, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFeed {
    pub user: UserViewModel,
    pub news: Vec<NewsViewModel>,
}

pub struct NewsScreen {
    coordinator: AggregateCoordinator,
    users: Arc<dyn UserService>,
    news_service: Arc<dyn NewsService>,
    user: Option<UserViewModel>,
    news: Vec<NewsViewModel>,
}

impl NewsScreen {
    pub fn new(
        users: Arc<dyn UserService>,
        news_service: Arc<dyn NewsService>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            coordinator: AggregateCoordinator::new(Arc::new(StateController::new()), options),
            users,
            news_service,
            user: None,
            news: Vec::new(),
        }
    }

    pub fn controller(&self) -> &Arc<StateController> {
        self.coordinator.controller()
    }

    pub fn user(&self) -> Option<&UserViewModel> {
        self.user.as_ref()
    }

    pub fn news(&self) -> &[NewsViewModel] {
        &self.news
    }

    /// The feed with its required user present.
    pub fn feed(&self) -> Result<NewsFeed, SnapshotError> {
        let user = self
            .user
            .clone()
            .ok_or(SnapshotError::MissingField("user"))?;
        Ok(NewsFeed {
            user,
            news: self.news.clone(),
        })
    }

    /// Load user and news together, allowing cached data.
    pub async fn obtain_news_with_user(&mut self) -> Result<LifecycleState, CoordinatorError> {
        self.obtain_feed(CachePolicy::UseCache).await
    }

    /// Reload user and news, bypassing the cache.
    pub async fn refresh_news_with_user(&mut self) -> Result<LifecycleState, CoordinatorError> {
        self.obtain_feed(CachePolicy::BypassCache).await
    }

    /// Reload only the news list, without announcing `Loading`.
    pub async fn obtain_only_news(&mut self) -> Result<LifecycleState, CoordinatorError> {
        let task = self.news_task(CachePolicy::BypassCache, |news: &mut Vec<_>, loaded| {
            *news = loaded
        });
        let report = self.coordinator.run_silent(Vec::new(), vec![task]).await?;
        if report.is_ready() {
            self.news = report.snapshot;
        }
        Ok(report.state)
    }

    /// Delete a news entry, then reload the list in a follow-up cycle.
    pub async fn delete_news(&mut self, id: u64) -> Result<LifecycleState, CoordinatorError> {
        let news_service = Arc::clone(&self.news_service);
        let task = FetchTask::new(
            "delete_news",
            async move { news_service.delete_news(id).await },
            |_: &mut (), ()| {},
        );

        let report = self.coordinator.run((), vec![task]).await?;
        if !report.is_ready() {
            return Ok(report.state);
        }
        tracing::info!(news_id = id, "News deleted, reloading list");
        self.obtain_only_news().await
    }

    async fn obtain_feed(&mut self, cache: CachePolicy) -> Result<LifecycleState, CoordinatorError> {
        let users = Arc::clone(&self.users);
        let user_task = FetchTask::new(
            "user_info",
            async move { users.obtain_user_info(cache).await },
            |snapshot: &mut NewsSnapshot, user| snapshot.user = Some(user.into()),
        );
        let news_task = self.news_task(cache, |snapshot: &mut NewsSnapshot, news| {
            snapshot.news = news
        });

        let report = self
            .coordinator
            .run(NewsSnapshot::default(), vec![user_task, news_task])
            .await?;
        if report.is_ready() {
            self.user = report.snapshot.user;
            self.news = report.snapshot.news;
        }
        Ok(report.state)
    }

    fn news_task<S, F>(&self, cache: CachePolicy, merge: F) -> FetchTask<S>
    where
        S: 'static,
        F: FnOnce(&mut S, Vec<NewsViewModel>) + Send + 'static,
    {
        let news_service = Arc::clone(&self.news_service);
        FetchTask::new(
            "news",
            async move {
                news_service.obtain_news(cache).await.map(|list| {
                    list.news
                        .into_iter()
                        .map(NewsViewModel::from)
                        .collect::<Vec<_>>()
                })
            },
            merge,
        )
    }
}
