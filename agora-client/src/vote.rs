use std::{cell::RefCell, future::Future, time::Duration};

use crate::{
    api::{Error, RecordId, RecordStore, Table, Tally, Vote},
    schema, Session,
};

/// How long the vote buttons stay locked after a vote was accepted
pub const SETTLE_WINDOW: Duration = Duration::from_millis(200);

/// Returns the tally resulting from the user pressing `requested`.
///
/// Pressing the button of the current vote withdraws it. Counters are never
/// clamped: a drifted tally, or one whose vote is not reflected in its
/// counters, is reported as `Error::InconsistentTally`.
pub fn apply_vote(current: Tally, requested: Vote) -> Result<Tally, Error> {
    let inconsistent = || Error::InconsistentTally(current);
    if current.is_drifted() {
        return Err(inconsistent());
    }
    let undo = |n: i64| n.checked_sub(1).filter(|n| *n >= 0).ok_or_else(inconsistent);
    let mut next = current;
    match current.vote {
        Vote::Up => next.upvotes = undo(next.upvotes)?,
        Vote::Down => next.downvotes = undo(next.downvotes)?,
        Vote::None => (),
    }
    if requested == current.vote {
        next.vote = Vote::None;
        return Ok(next);
    }
    next.vote = requested;
    match requested {
        Vote::Up => next.upvotes = next.upvotes.checked_add(1).ok_or_else(inconsistent)?,
        Vote::Down => next.downvotes = next.downvotes.checked_add(1).ok_or_else(inconsistent)?,
        Vote::None => (),
    }
    Ok(next)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Idle,
    InFlight { snapshot: Tally },
    Settling,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoteAction {
    /// The user pressed a vote button
    Request(Vote),
    /// The store accepted the submitted vote
    Confirmed,
    /// The store rejected the submitted vote, or could not be reached
    Failed,
    /// `SETTLE_WINDOW` elapsed after a confirmation
    Settled,
    /// A fresher tally came from the store
    Refresh(Tally),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoteEffect {
    /// The displayed tally already changed, and this vote must now be sent
    Submit(Vote),
    Done,
}

/// Locally-displayed vote state of one post or comment.
///
/// Only one vote can be in flight at a time: any request made while a vote is
/// being submitted, or during the settle window that follows, is rejected with
/// `Error::VotePending` and leaves the state untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoteState {
    tally: Tally,
    phase: Phase,
}

impl VoteState {
    pub fn new(tally: Tally) -> VoteState {
        VoteState {
            tally,
            phase: Phase::Idle,
        }
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Votes on behalf of the session's user. Anonymous requests fail with
    /// `Error::NotAuthenticated` and leave the state untouched.
    pub fn request(&mut self, session: &Session, v: Vote) -> Result<VoteEffect, Error> {
        if let Err(e) = session.require_user() {
            tracing::debug!(vote = %v, "anonymous vote refused");
            return Err(e);
        }
        self.update(VoteAction::Request(v))
    }

    pub fn update(&mut self, action: VoteAction) -> Result<VoteEffect, Error> {
        match (action, self.phase) {
            (VoteAction::Request(_), Phase::InFlight { .. } | Phase::Settling) => {
                tracing::debug!(?action, "ignoring vote request while another is pending");
                Err(Error::VotePending)
            }
            (VoteAction::Request(v), Phase::Idle) => {
                let next = apply_vote(self.tally, v)?;
                self.phase = Phase::InFlight {
                    snapshot: self.tally,
                };
                self.tally = next;
                Ok(VoteEffect::Submit(v))
            }
            (VoteAction::Confirmed, Phase::InFlight { .. }) => {
                self.phase = Phase::Settling;
                Ok(VoteEffect::Done)
            }
            (VoteAction::Failed, Phase::InFlight { snapshot }) => {
                self.tally = snapshot;
                self.phase = Phase::Idle;
                Ok(VoteEffect::Done)
            }
            (VoteAction::Confirmed | VoteAction::Failed, phase) => {
                tracing::warn!(?action, ?phase, "vote outcome received with no vote in flight");
                Ok(VoteEffect::Done)
            }
            (VoteAction::Settled, Phase::Settling) => {
                self.phase = Phase::Idle;
                Ok(VoteEffect::Done)
            }
            (VoteAction::Settled, _) => Ok(VoteEffect::Done),
            (VoteAction::Refresh(tally), _) => {
                self.tally = tally;
                Ok(VoteEffect::Done)
            }
        }
    }
}

/// Drives one vote through the optimistic protocol.
///
/// `submit` is only called for a signed-in session. The tally in `state`
/// changes before `submit` is even polled, and is restored if `submit` fails.
/// On success the state is left in its settle window: the caller is expected
/// to send `VoteAction::Settled` after `SETTLE_WINDOW`.
pub async fn run_vote<F, Fut>(
    state: &RefCell<VoteState>,
    session: &Session,
    requested: Vote,
    submit: F,
) -> Result<Tally, Error>
where
    F: FnOnce(Vote) -> Fut,
    Fut: Future<Output = Result<Tally, Error>>,
{
    let effect = state.borrow_mut().request(session, requested)?;
    let vote = match effect {
        VoteEffect::Submit(v) => v,
        VoteEffect::Done => return Ok(state.borrow().tally()),
    };
    match submit(vote).await {
        Ok(_) => {
            state.borrow_mut().update(VoteAction::Confirmed)?;
            Ok(state.borrow().tally())
        }
        Err(err) => {
            tracing::error!(?err, "vote submission failed, rolling back");
            state.borrow_mut().update(VoteAction::Failed)?;
            Err(err)
        }
    }
}

/// Applies the vote toggle rule to the tally currently in the store, and
/// writes the result back.
pub(crate) async fn store_vote<S: RecordStore>(
    store: &S,
    table: Table,
    id: RecordId,
    requested: Vote,
) -> Result<Tally, Error> {
    let record = store
        .get_record_by_id(table, id, &schema::field_list(schema::TALLY_FIELDS))
        .await?
        .ok_or(Error::NotFound { table, id })?;
    let current = schema::tally(&record)?;
    let next = apply_vote(current, requested)?;
    tracing::debug!(%table, %id, ?current, ?next, "storing vote");
    store
        .update_records(table, vec![schema::tally_record(id, next)])
        .await?;
    Ok(next)
}
