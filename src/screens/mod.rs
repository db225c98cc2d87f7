//! Screen drivers and their view models.
//!
//! Each screen owns one coordinator and one state controller, and keeps the
//! view data from its last successful cycle. A failed cycle leaves the
//! previous data in place.

mod game_info;
mod games;
mod news;
mod view_models;

use thiserror::Error;

pub use game_info::{GameDetails, GameInfoScreen};
pub use games::{GamesScreen, GamesSource};
pub use news::{NewsFeed, NewsScreen};
pub use view_models::{
    CommentViewModel, GameInfoViewModel, GameViewModel, NewsViewModel, TournamentViewModel,
    UserViewModel, BASE_URL, FRIENDLY_MATCH_TITLE,
};

/// A view-ready object was requested before its required data loaded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("required field '{0}' has not been loaded")]
    MissingField(&'static str),
}
