//! Service client interfaces consumed by fetch tasks.
//!
//! Request construction and decoding live behind these traits. Screens get
//! their clients injected at construction time, so tests can swap in
//! [`ScriptedService`] or their own fakes.

mod error;
mod models;
mod scripted;

use async_trait::async_trait;

pub use error::{
    ErrorKind, ServiceError, NOT_CONNECTED_CODE, TASK_PANICKED_CODE, TIMED_OUT_CODE,
    VALIDATION_CODE,
};
pub use models::{
    Comment, CommentList, Game, GameInfo, GamesCount, GamesPage, News, NewsList, Tournament,
    User,
};
pub use scripted::{Operation, ScriptedCall, ScriptedService};

/// Whether a call may be answered from the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    UseCache,
    BypassCache,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn obtain_user_info(&self, cache: CachePolicy) -> Result<User, ServiceError>;
}

#[async_trait]
pub trait NewsService: Send + Sync {
    async fn obtain_news(&self, cache: CachePolicy) -> Result<NewsList, ServiceError>;

    async fn delete_news(&self, id: u64) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait GamesService: Send + Sync {
    /// Fetch games with 1-based positions `from..=to`.
    async fn obtain_games(
        &self,
        from: usize,
        to: usize,
        cache: CachePolicy,
    ) -> Result<GamesPage, ServiceError>;

    async fn obtain_games_count(&self) -> Result<GamesCount, ServiceError>;
}

#[async_trait]
pub trait GameInfoService: Send + Sync {
    async fn obtain_game_info(&self, game_id: u64) -> Result<GameInfo, ServiceError>;

    async fn obtain_comments(&self, game_id: u64) -> Result<CommentList, ServiceError>;

    async fn obtain_tournament(&self, stage: u64) -> Result<Tournament, ServiceError>;
}
