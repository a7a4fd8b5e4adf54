mod app;
pub use app::App;

mod comment_thread;
pub use comment_thread::CommentThread;

mod login;
pub use login::Login;

mod notification;
pub use notification::{Notification, Toast, NOTIFICATION_TIMEOUT};

mod post_list;
pub use post_list::PostList;

mod vote_buttons;
pub use vote_buttons::VoteButtons;
