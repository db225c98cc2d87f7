//! Raw models as delivered by the backend services.
//!
//! Optional fields mirror what the backend may omit; view models decide how
//! to render a missing value.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct News {
    pub id: String,
    pub author: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub tag: Option<String>,
    pub date: Option<String>,
    pub image: Option<String>,
    pub photo: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsList {
    pub news: Vec<News>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Game {
    pub id: String,
    /// Game type as labelled by the backend (e.g. "Friendly", "Ranked").
    pub game_type: String,
    pub status: String,
    /// Tournament stage id; `"0"` marks a game outside any tournament.
    pub stage: String,
    pub player1: String,
    pub player2: String,
    pub score: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamesPage {
    pub games: Vec<Game>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamesCount {
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInfo {
    pub id: String,
    pub description: Option<String>,
    pub place: Option<String>,
    pub referee: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    pub text: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentList {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tournament {
    pub id: String,
    pub name: Option<String>,
    pub smalldesc: Option<String>,
    pub club: Option<String>,
    pub status: Option<String>,
    pub tournament_type: Option<String>,
    pub place: Option<String>,
    pub date: Option<String>,
}
