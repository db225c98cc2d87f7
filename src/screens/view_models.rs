//! View models: raw service models mapped for display.
//!
//! Every conversion here is pure and synchronous.

use crate::fetch::Filterable;
use crate::service::{Comment, Game, GameInfo, News, Tournament, User};

/// Prefix for relative media paths returned by the backend.
pub const BASE_URL: &str = "https://makub.ru";

/// Title shown for games played outside any tournament.
pub const FRIENDLY_MATCH_TITLE: &str = "Friendly match";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserViewModel {
    pub id: String,
    pub full_name: String,
    pub photo_url: Option<String>,
}

impl From<User> for UserViewModel {
    fn from(user: User) -> Self {
        Self {
            full_name: full_name(user.name.as_deref(), user.surname.as_deref()),
            photo_url: media_url(user.photo.as_deref()),
            id: user.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsViewModel {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub text: String,
    pub date: String,
    pub tag: String,
    pub full_name: String,
    pub image_url: Option<String>,
    pub photo_url: Option<String>,
}

impl From<News> for NewsViewModel {
    fn from(news: News) -> Self {
        Self {
            author_id: news.author.unwrap_or_default(),
            title: news.title.unwrap_or_default(),
            text: news.text.as_deref().map(strip_tags).unwrap_or_default(),
            date: news.date.unwrap_or_default(),
            tag: news.tag.unwrap_or_default(),
            full_name: full_name(news.name.as_deref(), news.surname.as_deref()),
            image_url: media_url(news.image.as_deref()),
            photo_url: media_url(news.photo.as_deref()),
            id: news.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameViewModel {
    pub id: String,
    pub game_type: String,
    pub status: String,
    pub stage: String,
    pub player1: String,
    pub player2: String,
    pub score: String,
    pub date: String,
}

impl GameViewModel {
    /// Whether the game belongs to a tournament stage.
    pub fn in_tournament(&self) -> bool {
        self.stage != "0"
    }
}

impl From<Game> for GameViewModel {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            game_type: game.game_type,
            status: game.status,
            stage: game.stage,
            player1: game.player1,
            player2: game.player2,
            score: game.score.unwrap_or_default(),
            date: game.date.unwrap_or_default(),
        }
    }
}

impl Filterable for GameViewModel {
    fn attribute(&self, key: &str) -> Option<&str> {
        match key {
            "type" => Some(&self.game_type),
            "status" => Some(&self.status),
            "stage" => Some(&self.stage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfoViewModel {
    pub id: String,
    pub description: String,
    pub place: String,
    pub referee: String,
}

impl From<GameInfo> for GameInfoViewModel {
    fn from(info: GameInfo) -> Self {
        Self {
            id: info.id,
            description: info.description.as_deref().map(strip_tags).unwrap_or_default(),
            place: info.place.unwrap_or_default(),
            referee: info.referee.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentViewModel {
    pub id: String,
    pub author: String,
    pub text: String,
    pub date: String,
}

impl From<Comment> for CommentViewModel {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author: comment.author.unwrap_or_default(),
            text: comment.text.as_deref().map(strip_tags).unwrap_or_default(),
            date: comment.date.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentViewModel {
    pub title: String,
    pub place: Option<String>,
    pub date: Option<String>,
}

impl TournamentViewModel {
    pub fn friendly() -> Self {
        Self {
            title: FRIENDLY_MATCH_TITLE.to_string(),
            place: None,
            date: None,
        }
    }
}

impl From<Tournament> for TournamentViewModel {
    fn from(tournament: Tournament) -> Self {
        Self {
            title: tournament.name.unwrap_or_default(),
            place: tournament.place,
            date: tournament.date,
        }
    }
}

fn full_name(name: Option<&str>, surname: Option<&str>) -> String {
    match (name, surname) {
        (Some(name), Some(surname)) => format!("{} {}", name, surname),
        _ => String::new(),
    }
}

/// Absolute URL for a backend media path, `None` when absent or empty.
fn media_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", BASE_URL, p).replace(' ', "%20"))
}

/// Remove markup tags, keeping the text between them.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}
