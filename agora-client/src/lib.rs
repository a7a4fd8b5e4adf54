mod access;

mod comment;
pub use comment::build_tree;

mod order;
pub use order::{best_score, controversy, CommentSort};

pub mod schema;

mod session;
pub use session::Session;

mod vote;
pub use vote::{apply_vote, run_vote, VoteAction, VoteEffect, VoteState, SETTLE_WINDOW};

mod comments;
pub use comments::CommentService;

mod communities;
pub use communities::CommunityService;

mod posts;
pub use posts::{PostFilter, PostService, DEFAULT_PAGE_SIZE};

mod remote;
pub use remote::RemoteStore;

mod users;
pub use users::UserService;

pub mod api {
    pub use agora_api::*;
}
