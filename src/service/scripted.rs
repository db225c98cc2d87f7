//! In-memory service implementation with scripted latency and failures.
//!
//! Backs the `makub-sim` driver and the test suites. Every call is recorded
//! so callers can assert on cache policy and requested ranges.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;

use super::{
    CachePolicy, Comment, CommentList, Game, GameInfo, GameInfoService, GamesCount, GamesPage,
    GamesService, News, NewsList, NewsService, ServiceError, Tournament, User, UserService,
};

/// Service operations that can be scripted.
///
/// Config files name them in snake case, e.g. `games_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    UserInfo,
    News,
    DeleteNews,
    Games,
    GamesCount,
    GameInfo,
    Comments,
    Tournament,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::UserInfo => "user_info",
            Operation::News => "news",
            Operation::DeleteNews => "delete_news",
            Operation::Games => "games",
            Operation::GamesCount => "games_count",
            Operation::GameInfo => "game_info",
            Operation::Comments => "comments",
            Operation::Tournament => "tournament",
        }
    }
}

/// A recorded call against the scripted service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedCall {
    pub operation: Operation,
    pub cache: Option<CachePolicy>,
    /// Requested `(from, to)` positions for paged calls.
    pub range: Option<(usize, usize)>,
}

impl ScriptedCall {
    fn plain(operation: Operation) -> Self {
        Self {
            operation,
            cache: None,
            range: None,
        }
    }

    fn cached(operation: Operation, cache: CachePolicy) -> Self {
        Self {
            operation,
            cache: Some(cache),
            range: None,
        }
    }
}

#[derive(Default)]
pub struct ScriptedService {
    user: User,
    news: Mutex<Vec<News>>,
    games: Vec<Game>,
    game_info: HashMap<u64, GameInfo>,
    comments: HashMap<u64, Vec<Comment>>,
    tournaments: HashMap<u64, Tournament>,
    failures: Mutex<HashMap<Operation, i32>>,
    latencies: Mutex<HashMap<Operation, Duration>>,
    default_latency: Duration,
    calls: Mutex<Vec<ScriptedCall>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small fixture set used by the simulator.
    pub fn demo() -> Self {
        let games = vec![
            demo_game("101", "Friendly", "finished", "0", "Ivanov", "Petrov"),
            demo_game("102", "Ranked", "finished", "3", "Sidorov", "Orlov"),
            demo_game("103", "friendly", "scheduled", "0", "Smirnov", "Kuznetsov"),
            demo_game("104", "Ranked", "scheduled", "3", "Popov", "Volkov"),
            demo_game("105", "Cup", "finished", "4", "Lebedev", "Kozlov"),
        ];

        Self::new()
            .with_user(User {
                id: "7".to_string(),
                name: Some("Elena".to_string()),
                surname: Some("Ivanova".to_string()),
                photo: Some("/upload/users/7.jpg".to_string()),
            })
            .with_news(vec![
                News {
                    id: "1".to_string(),
                    author: Some("7".to_string()),
                    title: Some("Season opening".to_string()),
                    text: Some("<p>The new season starts on <b>Saturday</b>.</p>".to_string()),
                    tag: Some("club".to_string()),
                    date: Some("2018-03-24".to_string()),
                    image: Some("/upload/news/opening.jpg".to_string()),
                    photo: Some("/upload/users/7.jpg".to_string()),
                    name: Some("Elena".to_string()),
                    surname: Some("Ivanova".to_string()),
                },
                News {
                    id: "2".to_string(),
                    author: Some("9".to_string()),
                    title: Some("Ranking update".to_string()),
                    text: Some("Ratings were recalculated.".to_string()),
                    ..News::default()
                },
            ])
            .with_games(games)
            .with_game_info(
                102,
                GameInfo {
                    id: "102".to_string(),
                    description: Some("Quarter final".to_string()),
                    place: Some("Main hall".to_string()),
                    referee: Some("Morozov".to_string()),
                },
            )
            .with_comments(
                102,
                vec![Comment {
                    id: "1".to_string(),
                    author: Some("Orlov".to_string()),
                    text: Some("Good game!".to_string()),
                    date: Some("2018-04-14".to_string()),
                }],
            )
            .with_tournament(
                3,
                Tournament {
                    id: "3".to_string(),
                    name: Some("Spring Cup".to_string()),
                    place: Some("Moscow".to_string()),
                    ..Tournament::default()
                },
            )
            .with_latency(Duration::from_millis(20))
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    pub fn with_news(self, news: Vec<News>) -> Self {
        *self.news.lock() = news;
        self
    }

    pub fn with_games(mut self, games: Vec<Game>) -> Self {
        self.games = games;
        self
    }

    pub fn with_game_info(mut self, game_id: u64, info: GameInfo) -> Self {
        self.game_info.insert(game_id, info);
        self
    }

    pub fn with_comments(mut self, game_id: u64, comments: Vec<Comment>) -> Self {
        self.comments.insert(game_id, comments);
        self
    }

    pub fn with_tournament(mut self, stage: u64, tournament: Tournament) -> Self {
        self.tournaments.insert(stage, tournament);
        self
    }

    /// Latency applied to every operation without an explicit override.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.default_latency = latency;
        self
    }

    /// Apply latency and failure scripts from the simulation config.
    pub fn configured(mut self, simulation: &SimulationConfig) -> Self {
        self.default_latency = Duration::from_millis(simulation.latency_ms);
        for (op, code) in &simulation.failures {
            self.fail(*op, *code);
        }
        self
    }

    /// Make every subsequent call to `op` fail with `code`.
    pub fn fail(&self, op: Operation, code: i32) {
        self.failures.lock().insert(op, code);
    }

    /// Clear a scripted failure for `op`.
    pub fn recover(&self, op: Operation) {
        self.failures.lock().remove(&op);
    }

    pub fn set_latency(&self, op: Operation, latency: Duration) {
        self.latencies.lock().insert(op, latency);
    }

    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, op: Operation) -> Vec<ScriptedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.operation == op)
            .cloned()
            .collect()
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    async fn simulate(&self, call: ScriptedCall) -> Result<(), ServiceError> {
        let op = call.operation;
        self.calls.lock().push(call);

        let latency = self
            .latencies
            .lock()
            .get(&op)
            .copied()
            .unwrap_or(self.default_latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let failure = self.failures.lock().get(&op).copied();
        match failure {
            Some(code) => Err(ServiceError::new(
                code,
                format!("scripted failure for {}", op.name()),
            )),
            None => Ok(()),
        }
    }
}

fn demo_game(
    id: &str,
    game_type: &str,
    status: &str,
    stage: &str,
    player1: &str,
    player2: &str,
) -> Game {
    Game {
        id: id.to_string(),
        game_type: game_type.to_string(),
        status: status.to_string(),
        stage: stage.to_string(),
        player1: player1.to_string(),
        player2: player2.to_string(),
        score: None,
        date: None,
    }
}

#[async_trait]
impl UserService for ScriptedService {
    async fn obtain_user_info(&self, cache: CachePolicy) -> Result<User, ServiceError> {
        self.simulate(ScriptedCall::cached(Operation::UserInfo, cache))
            .await?;
        Ok(self.user.clone())
    }
}

#[async_trait]
impl NewsService for ScriptedService {
    async fn obtain_news(&self, cache: CachePolicy) -> Result<NewsList, ServiceError> {
        self.simulate(ScriptedCall::cached(Operation::News, cache))
            .await?;
        Ok(NewsList {
            news: self.news.lock().clone(),
        })
    }

    async fn delete_news(&self, id: u64) -> Result<(), ServiceError> {
        self.simulate(ScriptedCall::plain(Operation::DeleteNews))
            .await?;
        let key = id.to_string();
        let mut news = self.news.lock();
        let before = news.len();
        news.retain(|item| item.id != key);
        if news.len() == before {
            return Err(ServiceError::server(404, format!("news {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl GamesService for ScriptedService {
    async fn obtain_games(
        &self,
        from: usize,
        to: usize,
        cache: CachePolicy,
    ) -> Result<GamesPage, ServiceError> {
        self.simulate(ScriptedCall {
            operation: Operation::Games,
            cache: Some(cache),
            range: Some((from, to)),
        })
        .await?;

        if from == 0 || from > to {
            return Err(ServiceError::invalid_input(format!(
                "invalid games range {}..={}",
                from, to
            )));
        }

        let start = from - 1;
        let end = to.min(self.games.len());
        let games = if start >= end {
            Vec::new()
        } else {
            self.games[start..end].to_vec()
        };
        Ok(GamesPage { games })
    }

    async fn obtain_games_count(&self) -> Result<GamesCount, ServiceError> {
        self.simulate(ScriptedCall::plain(Operation::GamesCount))
            .await?;
        Ok(GamesCount {
            count: self.games.len(),
        })
    }
}

#[async_trait]
impl GameInfoService for ScriptedService {
    async fn obtain_game_info(&self, game_id: u64) -> Result<GameInfo, ServiceError> {
        self.simulate(ScriptedCall::plain(Operation::GameInfo))
            .await?;
        self.game_info
            .get(&game_id)
            .cloned()
            .ok_or_else(|| ServiceError::server(404, format!("game {} not found", game_id)))
    }

    async fn obtain_comments(&self, game_id: u64) -> Result<CommentList, ServiceError> {
        self.simulate(ScriptedCall::plain(Operation::Comments))
            .await?;
        Ok(CommentList {
            comments: self.comments.get(&game_id).cloned().unwrap_or_default(),
        })
    }

    async fn obtain_tournament(&self, stage: u64) -> Result<Tournament, ServiceError> {
        self.simulate(ScriptedCall::plain(Operation::Tournament))
            .await?;
        self.tournaments
            .get(&stage)
            .cloned()
            .ok_or_else(|| ServiceError::server(404, format!("stage {} not found", stage)))
    }
}
