use std::{cmp::Ordering, fmt, str::FromStr};

use crate::api::{Comment, Tally};

/// Ordering of the top-level comments of a thread. Replies are always shown
/// oldest first.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    #[default]
    Best,
    New,
    Old,
    Top,
    Controversial,
}

impl CommentSort {
    pub const ALL: [CommentSort; 5] = [
        CommentSort::Best,
        CommentSort::New,
        CommentSort::Old,
        CommentSort::Top,
        CommentSort::Controversial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSort::Best => "best",
            CommentSort::New => "new",
            CommentSort::Old => "old",
            CommentSort::Top => "top",
            CommentSort::Controversial => "controversial",
        }
    }

    /// Like `from_str`, but unknown names select the default order
    pub fn from_name_or_default(name: &str) -> CommentSort {
        CommentSort::from_str(name).unwrap_or_default()
    }

    /// `Ordering::Less` means `a` is displayed before `b`
    pub fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        match self {
            CommentSort::New => b.created_at.cmp(&a.created_at),
            CommentSort::Old => a.created_at.cmp(&b.created_at),
            CommentSort::Top => b.score().cmp(&a.score()),
            CommentSort::Controversial => {
                controversy(&b.tally()).total_cmp(&controversy(&a.tally()))
            }
            CommentSort::Best => best_score(&b.tally()).total_cmp(&best_score(&a.tally())),
        }
    }

    /// Stable: comments that compare equal keep their relative order
    pub fn sort(&self, comments: &mut [Comment]) {
        comments.sort_by(|a, b| self.compare(a, b))
    }
}

impl fmt::Display for CommentSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<CommentSort> {
        CommentSort::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown comment sort {s:?}"))
    }
}

// Drifted counters count as no votes at all
fn counts(t: &Tally) -> (f64, f64) {
    (t.upvotes.max(0) as f64, t.downvotes.max(0) as f64)
}

/// 1.0 for perfectly split votes, 0.0 for unanimous ones
pub fn controversy(t: &Tally) -> f64 {
    let (up, down) = counts(t);
    up.min(down) / up.max(down).max(1.0)
}

/// Score with a small bonus for engagement
pub fn best_score(t: &Tally) -> f64 {
    let (up, down) = counts(t);
    t.score() as f64 + 0.1 * (up + down)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::api::{CommentId, PostId, Vote};

    fn comment(id: u64, upvotes: i64, downvotes: i64, minute: i64) -> Comment {
        Comment {
            id: CommentId(id),
            post_id: PostId(1),
            parent_id: None,
            content: format!("comment {id}"),
            author_username: String::from("alice"),
            upvotes,
            downvotes,
            created_at: Utc.timestamp_opt(1_600_000_000, 0).unwrap() + Duration::minutes(minute),
            user_vote: Vote::None,
            is_collapsed: false,
            replies: Vec::new(),
        }
    }

    fn ids(comments: &[Comment]) -> Vec<u64> {
        comments.iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn names() {
        for o in CommentSort::ALL {
            assert_eq!(CommentSort::from_str(o.as_str()).unwrap(), o);
        }
        assert_eq!(CommentSort::from_name_or_default("hot"), CommentSort::Best);
        assert_eq!(CommentSort::from_name_or_default("old"), CommentSort::Old);
    }

    #[test]
    fn formulas() {
        assert_eq!(controversy(&Tally::new(Vote::None, 0, 0)), 0.0);
        assert_eq!(controversy(&Tally::new(Vote::None, 4, 4)), 1.0);
        assert_eq!(controversy(&Tally::new(Vote::None, 1, 4)), 0.25);
        assert!((best_score(&Tally::new(Vote::None, 5, 1)) - 4.6).abs() < 1e-9);
        assert!((best_score(&Tally::new(Vote::None, 0, 2)) - -1.8).abs() < 1e-9);
        assert_eq!(controversy(&Tally::new(Vote::None, -3, 2)), 0.0);
        assert!((best_score(&Tally::new(Vote::None, 1, -1)) - 2.1).abs() < 1e-9);
    }

    #[test]
    fn each_order() {
        let base = vec![
            comment(1, 5, 1, 0),
            comment(2, 2, 2, 2),
            comment(3, 10, 9, 1),
            comment(4, 0, 3, 3),
        ];
        let sorted = |o: CommentSort| {
            let mut c = base.clone();
            o.sort(&mut c);
            ids(&c)
        };
        assert_eq!(sorted(CommentSort::New), vec![4, 2, 3, 1]);
        assert_eq!(sorted(CommentSort::Old), vec![1, 3, 2, 4]);
        assert_eq!(sorted(CommentSort::Top), vec![1, 3, 2, 4]);
        assert_eq!(sorted(CommentSort::Controversial), vec![2, 3, 1, 4]);
        // 1: 4.6, 2: 0.4, 3: 2.9, 4: -2.7
        assert_eq!(sorted(CommentSort::Best), vec![1, 3, 2, 4]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut c = vec![
            comment(7, 3, 1, 5),
            comment(3, 9, 0, 0),
            comment(5, 3, 1, 1),
            comment(1, 3, 1, 9),
        ];
        CommentSort::Best.sort(&mut c);
        assert_eq!(ids(&c), vec![3, 7, 5, 1]);
        CommentSort::Top.sort(&mut c);
        assert_eq!(ids(&c), vec![3, 7, 5, 1]);
    }
}
