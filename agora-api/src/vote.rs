use bolero::generator::TypeGenerator;
use std::{fmt, str::FromStr};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    #[default]
    None,
    Up,
    Down,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::None => "none",
            Vote::Up => "up",
            Vote::Down => "down",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vote {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Vote> {
        match s {
            "none" => Ok(Vote::None),
            "up" => Ok(Vote::Up),
            "down" => Ok(Vote::Down),
            _ => Err(anyhow::anyhow!("unknown vote {s:?}")),
        }
    }
}

/// The vote-related state of a post or comment, as seen by the current user.
///
/// Counters are signed: the store does not clamp them, so a record whose
/// counters drifted below zero still reads, and is only refused on the next
/// vote.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct Tally {
    pub vote: Vote,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl Tally {
    pub fn new(vote: Vote, upvotes: i64, downvotes: i64) -> Tally {
        Tally {
            vote,
            upvotes,
            downvotes,
        }
    }

    pub fn score(&self) -> i64 {
        self.upvotes.saturating_sub(self.downvotes)
    }

    /// Whether a counter went below zero
    pub fn is_drifted(&self) -> bool {
        self.upvotes < 0 || self.downvotes < 0
    }
}
