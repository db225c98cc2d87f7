//! Games list screen: paging, refresh and filtering over the games service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::PaginationConfig;
use crate::fetch::{
    AggregateCoordinator, CoordinatorError, CoordinatorOptions, FilterSet, ListSource, Window,
    WindowError, WindowedListFetcher,
};
use crate::service::{CachePolicy, GamesService, ServiceError};
use crate::state::{LifecycleState, StateController};

use super::view_models::GameViewModel;

/// Exposes a [`GamesService`] as a pageable list of view models.
pub struct GamesSource {
    service: Arc<dyn GamesService>,
}

impl GamesSource {
    pub fn new(service: Arc<dyn GamesService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ListSource for GamesSource {
    type Item = GameViewModel;

    async fn fetch_range(
        &self,
        from: usize,
        to: usize,
        cache: CachePolicy,
    ) -> Result<Vec<GameViewModel>, ServiceError> {
        let page = self.service.obtain_games(from, to, cache).await?;
        Ok(page.games.into_iter().map(GameViewModel::from).collect())
    }

    async fn total_count(&self) -> Result<usize, ServiceError> {
        Ok(self.service.obtain_games_count().await?.count)
    }
}

pub struct GamesScreen {
    fetcher: WindowedListFetcher<GamesSource>,
}

impl GamesScreen {
    pub fn new(
        service: Arc<dyn GamesService>,
        options: CoordinatorOptions,
        pagination: &PaginationConfig,
    ) -> Result<Self, WindowError> {
        let coordinator = AggregateCoordinator::new(Arc::new(StateController::new()), options);
        let fetcher =
            WindowedListFetcher::new(Arc::new(GamesSource::new(service)), coordinator, pagination)?;
        Ok(Self { fetcher })
    }

    pub fn controller(&self) -> &Arc<StateController> {
        self.fetcher.controller()
    }

    pub fn games(&self) -> &[GameViewModel] {
        self.fetcher.items()
    }

    pub fn window(&self) -> Window {
        self.fetcher.window()
    }

    pub fn active_filters(&self) -> Option<&FilterSet> {
        self.fetcher.active_filters()
    }

    pub async fn obtain_games(&mut self) -> Result<LifecycleState, CoordinatorError> {
        self.fetcher.load_initial().await
    }

    pub async fn obtain_more_games(&mut self) -> Result<LifecycleState, CoordinatorError> {
        self.fetcher.load_more().await
    }

    pub async fn refresh_games(&mut self) -> Result<LifecycleState, CoordinatorError> {
        self.fetcher.refresh().await
    }

    pub async fn obtain_all_games(
        &mut self,
        filters: FilterSet,
    ) -> Result<LifecycleState, CoordinatorError> {
        self.fetcher.filter_all(filters).await
    }
}
