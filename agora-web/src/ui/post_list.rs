use std::rc::Rc;

use agora_client::{
    api::{Post, PostId, PostType},
    Session,
};
use yew::prelude::*;

use crate::{
    api::{Backend, VoteTarget},
    ui,
};

#[derive(Clone, PartialEq, Properties)]
pub struct PostListProps {
    pub backend: Backend,
    pub posts: Rc<Vec<Post>>,
    pub session: Session,
    pub on_select: Callback<PostId>,
    pub on_auth_required: Callback<()>,
    pub on_error: Callback<String>,
}

#[function_component(PostList)]
pub fn post_list(p: &PostListProps) -> Html {
    html! {
        <ul class="list-group post-list">
            { for p.posts.iter().map(|post| post_item(p, post)) }
        </ul>
    }
}

fn post_item(p: &PostListProps, post: &Post) -> Html {
    let id = post.id;
    html! {
        <li class="list-group-item d-flex align-items-stretch" key={ id.0 }>
            <ui::VoteButtons
                backend={ p.backend.clone() }
                target={ VoteTarget::Post(id) }
                tally={ post.tally() }
                session={ p.session.clone() }
                on_auth_required={ p.on_auth_required.clone() }
                on_error={ p.on_error.clone() }
            />
            <div class="flex-fill" onclick={ p.on_select.reform(move |_| id) }>
                <div class="post-meta">
                    { format!("r/{} - posted by {}", post.community_name, post.author_username) }
                    if post.is_pinned {
                        <span class="badge bg-secondary ms-2">{ "pinned" }</span>
                    }
                </div>
                <h5>{ &post.title }</h5>
                { post_body(post) }
                <div class="post-comments">{ format!("{} comments", post.comment_count) }</div>
            </div>
        </li>
    }
}

pub fn post_body(post: &Post) -> Html {
    match (post.post_type, &post.image_url, &post.link_url) {
        (PostType::Image, Some(url), _) => html! {
            <img class="img-fluid" src={ url.clone() } alt={ post.title.clone() } />
        },
        (PostType::Link, _, Some(url)) => html! {
            <a href={ url.clone() } target="_blank" rel="noopener">{ url }</a>
        },
        _ => html! { <p>{ &post.content }</p> },
    }
}
