use agora_client::{
    api::{Error, Tally, Vote},
    Session, VoteAction, VoteEffect, VoteState, SETTLE_WINDOW,
};
use yew::prelude::*;

use crate::api::{Backend, VoteTarget};

#[derive(Clone, PartialEq, Properties)]
pub struct VoteButtonsProps {
    pub backend: Backend,
    pub target: VoteTarget,
    pub tally: Tally,
    pub session: Session,
    pub on_auth_required: Callback<()>,
    pub on_error: Callback<String>,
}

pub enum VoteMsg {
    Vote(Vote),
    Confirmed,
    Failed(Error),
    Settled,
}

pub struct VoteButtons {
    state: VoteState,
}

impl VoteButtons {
    fn handle(&mut self, action: VoteAction) -> Result<VoteEffect, Error> {
        let res = self.state.update(action);
        tracing::trace!(?action, ?res, state = ?self.state, "vote buttons transition");
        res
    }
}

impl Component for VoteButtons {
    type Message = VoteMsg;
    type Properties = VoteButtonsProps;

    fn create(ctx: &Context<Self>) -> Self {
        VoteButtons {
            state: VoteState::new(ctx.props().tally),
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let p = ctx.props();
        if p.target != old_props.target {
            self.state = VoteState::new(p.tally);
        } else if p.tally != old_props.tally {
            // Cannot fail
            let _ = self.handle(VoteAction::Refresh(p.tally));
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let p = ctx.props();
        match msg {
            VoteMsg::Vote(v) => match self.state.request(&p.session, v) {
                Ok(VoteEffect::Submit(v)) => {
                    let backend = p.backend.clone();
                    let target = p.target;
                    ctx.link().send_future(async move {
                        match backend.vote(target, v).await {
                            Ok(_) => VoteMsg::Confirmed,
                            Err(e) => VoteMsg::Failed(e),
                        }
                    });
                    true
                }
                Ok(VoteEffect::Done) | Err(Error::VotePending) => false,
                Err(Error::NotAuthenticated) => {
                    p.on_auth_required.emit(());
                    false
                }
                Err(e) => {
                    tracing::error!(?e, target = ?p.target, "vote rejected locally");
                    p.on_error.emit(e.to_string());
                    false
                }
            },
            VoteMsg::Confirmed => {
                let _ = self.handle(VoteAction::Confirmed);
                ctx.link().send_future(async {
                    if let Err(err) = wasm_timer::Delay::new(SETTLE_WINDOW).await {
                        tracing::warn!(?err, "settle timer failed, unlocking votes now");
                    }
                    VoteMsg::Settled
                });
                true
            }
            VoteMsg::Failed(e) => {
                let _ = self.handle(VoteAction::Failed);
                p.on_error.emit(format!("Failed to vote: {e}"));
                true
            }
            VoteMsg::Settled => {
                let _ = self.handle(VoteAction::Settled);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let tally = self.state.tally();
        let pending = self.state.is_pending();
        let button = |v: Vote, icon: &'static str, label: &'static str| {
            html! {
                <button
                    type="button"
                    class={ classes!(
                        "btn", "bi-btn", icon,
                        (tally.vote == v).then(|| "active")
                    ) }
                    aria-label={ label }
                    aria-pressed={ if tally.vote == v { "true" } else { "false" } }
                    disabled={ pending }
                    onclick={ ctx.link().callback(move |_| VoteMsg::Vote(v)) }
                >
                </button>
            }
        };
        html! {
            <div class="vote-buttons d-flex flex-column align-items-center">
                { button(Vote::Up, "bi-arrow-up", "Upvote") }
                <span class="score">{ tally.score() }</span>
                { button(Vote::Down, "bi-arrow-down", "Downvote") }
            </div>
        }
    }
}
