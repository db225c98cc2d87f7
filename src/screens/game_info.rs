//! Game details screen.

use std::sync::Arc;

use crate::fetch::{AggregateCoordinator, CoordinatorError, CoordinatorOptions, FetchTask};
use crate::service::{CachePolicy, GameInfoService, ServiceError, UserService};
use crate::state::{LifecycleState, StateController};

use super::view_models::{
    CommentViewModel, GameInfoViewModel, GameViewModel, TournamentViewModel, UserViewModel,
};
use super::SnapshotError;

#[derive(Debug, Default)]
struct GameSnapshot {
    user: Option<UserViewModel>,
    info: Option<GameInfoViewModel>,
    comments: Vec<CommentViewModel>,
    tournament: Option<TournamentViewModel>,
}

/// Everything the game screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDetails {
    pub game: GameViewModel,
    pub user: UserViewModel,
    pub info: GameInfoViewModel,
    pub comments: Vec<CommentViewModel>,
    pub tournament: TournamentViewModel,
}

pub struct GameInfoScreen {
    coordinator: AggregateCoordinator,
    users: Arc<dyn UserService>,
    games: Arc<dyn GameInfoService>,
    game: GameViewModel,
    user: Option<UserViewModel>,
    info: Option<GameInfoViewModel>,
    comments: Vec<CommentViewModel>,
    tournament: Option<TournamentViewModel>,
}

impl GameInfoScreen {
    pub fn new(
        game: GameViewModel,
        users: Arc<dyn UserService>,
        games: Arc<dyn GameInfoService>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            coordinator: AggregateCoordinator::new(Arc::new(StateController::new()), options),
            users,
            games,
            game,
            user: None,
            info: None,
            comments: Vec::new(),
            tournament: None,
        }
    }

    pub fn controller(&self) -> &Arc<StateController> {
        self.coordinator.controller()
    }

    pub fn game(&self) -> &GameViewModel {
        &self.game
    }

    pub fn comments(&self) -> &[CommentViewModel] {
        &self.comments
    }

    pub fn tournament(&self) -> Option<&TournamentViewModel> {
        self.tournament.as_ref()
    }

    /// All screen data, or the first required field still missing.
    pub fn details(&self) -> Result<GameDetails, SnapshotError> {
        Ok(GameDetails {
            game: self.game.clone(),
            user: self.user.clone().ok_or(SnapshotError::MissingField("user"))?,
            info: self.info.clone().ok_or(SnapshotError::MissingField("info"))?,
            comments: self.comments.clone(),
            tournament: self
                .tournament
                .clone()
                .ok_or(SnapshotError::MissingField("tournament"))?,
        })
    }

    /// Load user, game info, comments and, for tournament games, the
    /// tournament in one cycle.
    ///
    /// Games outside a tournament get the friendly-match title without a
    /// service call.
    pub async fn obtain_game(&mut self) -> Result<LifecycleState, CoordinatorError> {
        let mut seed = GameSnapshot::default();
        let mut tasks = vec![
            self.user_task(),
            self.info_task(),
            self.comments_task(|snapshot: &mut GameSnapshot, comments| {
                snapshot.comments = comments
            }),
        ];

        if self.game.in_tournament() {
            tasks.push(self.tournament_task());
        } else {
            seed.tournament = Some(TournamentViewModel::friendly());
        }

        let report = self.coordinator.run(seed, tasks).await?;
        if report.is_ready() {
            let snapshot = report.snapshot;
            self.user = snapshot.user;
            self.info = snapshot.info;
            self.comments = snapshot.comments;
            self.tournament = snapshot.tournament;
        }
        Ok(report.state)
    }

    /// Reload only the comments, e.g. after posting one.
    pub async fn obtain_only_comments(&mut self) -> Result<LifecycleState, CoordinatorError> {
        let task = self.comments_task(|comments: &mut Vec<_>, loaded| *comments = loaded);
        let report = self.coordinator.run(Vec::new(), vec![task]).await?;
        if report.is_ready() {
            self.comments = report.snapshot;
        }
        Ok(report.state)
    }

    fn game_id(&self) -> Result<u64, ServiceError> {
        self.game.id.parse().map_err(|_| {
            ServiceError::invalid_input(format!("malformed game id '{}'", self.game.id))
        })
    }

    fn stage_id(&self) -> Result<u64, ServiceError> {
        self.game.stage.parse().map_err(|_| {
            ServiceError::invalid_input(format!("malformed stage id '{}'", self.game.stage))
        })
    }

    fn user_task(&self) -> FetchTask<GameSnapshot> {
        let users = Arc::clone(&self.users);
        FetchTask::new(
            "user_info",
            async move { users.obtain_user_info(CachePolicy::UseCache).await },
            |snapshot: &mut GameSnapshot, user| snapshot.user = Some(user.into()),
        )
    }

    fn info_task(&self) -> FetchTask<GameSnapshot> {
        let game_id = match self.game_id() {
            Ok(id) => id,
            Err(err) => return FetchTask::failing("game_info", err),
        };
        let games = Arc::clone(&self.games);
        FetchTask::new(
            "game_info",
            async move { games.obtain_game_info(game_id).await },
            |snapshot: &mut GameSnapshot, info| snapshot.info = Some(info.into()),
        )
    }

    fn comments_task<S, F>(&self, merge: F) -> FetchTask<S>
    where
        S: 'static,
        F: FnOnce(&mut S, Vec<CommentViewModel>) + Send + 'static,
    {
        let game_id = match self.game_id() {
            Ok(id) => id,
            Err(err) => return FetchTask::failing("comments", err),
        };
        let games = Arc::clone(&self.games);
        FetchTask::new(
            "comments",
            async move {
                games.obtain_comments(game_id).await.map(|list| {
                    list.comments
                        .into_iter()
                        .map(CommentViewModel::from)
                        .collect::<Vec<_>>()
                })
            },
            merge,
        )
    }

    fn tournament_task(&self) -> FetchTask<GameSnapshot> {
        let stage = match self.stage_id() {
            Ok(stage) => stage,
            Err(err) => return FetchTask::failing("tournament", err),
        };
        let games = Arc::clone(&self.games);
        FetchTask::new(
            "tournament",
            async move { games.obtain_tournament(stage).await },
            |snapshot: &mut GameSnapshot, tournament| {
                snapshot.tournament = Some(tournament.into())
            },
        )
    }
}
