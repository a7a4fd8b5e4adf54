use std::rc::Rc;

use agora_client::{api::Comment, Session};
use yew::prelude::*;

use crate::{
    api::{Backend, VoteTarget},
    ui,
};

#[derive(Clone, PartialEq, Properties)]
pub struct CommentThreadProps {
    pub backend: Backend,
    pub comments: Rc<Vec<Comment>>,
    pub session: Session,
    pub on_auth_required: Callback<()>,
    pub on_error: Callback<String>,
}

#[function_component(CommentThread)]
pub fn comment_thread(p: &CommentThreadProps) -> Html {
    if p.comments.is_empty() {
        return html! {};
    }
    html! {
        <ul class="comment-thread list-unstyled">
            { for p.comments.iter().map(|c| html! {
                <CommentItem
                    key={ c.id.0 }
                    comment={ c.clone() }
                    backend={ p.backend.clone() }
                    session={ p.session.clone() }
                    on_auth_required={ p.on_auth_required.clone() }
                    on_error={ p.on_error.clone() }
                />
            }) }
        </ul>
    }
}

#[derive(Clone, PartialEq, Properties)]
struct CommentItemProps {
    comment: Comment,
    backend: Backend,
    session: Session,
    on_auth_required: Callback<()>,
    on_error: Callback<String>,
}

#[function_component(CommentItem)]
fn comment_item(p: &CommentItemProps) -> Html {
    let c = &p.comment;
    let collapsed = use_state(|| c.is_collapsed);
    let toggle = {
        let collapsed = collapsed.clone();
        Callback::from(move |_| collapsed.set(!*collapsed))
    };
    let hidden = c.thread_size() - 1;
    html! {
        <li class="comment d-flex">
            <ui::VoteButtons
                backend={ p.backend.clone() }
                target={ VoteTarget::Comment(c.id) }
                tally={ c.tally() }
                session={ p.session.clone() }
                on_auth_required={ p.on_auth_required.clone() }
                on_error={ p.on_error.clone() }
            />
            <div class="flex-fill">
                <div class="comment-meta">
                    <span class="author">{ &c.author_username }</span>
                    <span class="date">{ c.created_at.format("%Y-%m-%d %H:%M").to_string() }</span>
                    <button type="button" class="btn btn-link btn-sm" onclick={ toggle }>
                        { match (*collapsed, hidden) {
                            (true, 0) => String::from("[+]"),
                            (true, n) => format!("[+] {n} more"),
                            (false, _) => String::from("[-]"),
                        } }
                    </button>
                </div>
                if !*collapsed {
                    <div class="comment-content">{ &c.content }</div>
                    <CommentThread
                        backend={ p.backend.clone() }
                        comments={ Rc::new(c.replies.clone()) }
                        session={ p.session.clone() }
                        on_auth_required={ p.on_auth_required.clone() }
                        on_error={ p.on_error.clone() }
                    />
                }
            </div>
        </li>
    }
}
