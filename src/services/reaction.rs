use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
        }
    }

    /// Toast shown when the reaction is set.
    pub fn feedback(self) -> &'static str {
        match self {
            Reaction::Like => "Thanks for the feedback! 😊",
            Reaction::Dislike => "We'll work on improving that 🙏",
        }
    }
}

impl std::str::FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" => Ok(Reaction::Like),
            "dislike" => Ok(Reaction::Dislike),
            other => Err(format!("unknown reaction: {other}")),
        }
    }
}

/// Clicking the active reaction clears it; clicking the other one replaces it.
pub fn toggle(current: Option<Reaction>, clicked: Reaction) -> Option<Reaction> {
    if current == Some(clicked) { None } else { Some(clicked) }
}
