use std::{cell::RefCell, rc::Rc};

use agora_client::{
    api::{Comment, CommentId, PostId, PostType, Tally, Vote},
    run_vote, CommentService, CommentSort, CommunityService, PostFilter, PostService,
    RemoteStore, Session, UserService, VoteState,
};
use anyhow::Context;

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, env = "AGORA_HOST")]
    host: String,

    /// Username to act as, required for voting
    #[structopt(short, long, env = "AGORA_USER")]
    user: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List posts, newest first
    Posts {
        #[structopt(long)]
        community: Option<String>,

        /// One of text, image or link
        #[structopt(long = "type")]
        post_type: Option<PostType>,

        #[structopt(long)]
        page: Option<usize>,

        #[structopt(long)]
        limit: Option<usize>,
    },

    /// Show the comment thread of a post
    Thread {
        post: u64,

        /// One of best, new, old, top or controversial
        #[structopt(long, default_value = "best", parse(from_str = CommentSort::from_name_or_default))]
        sort: CommentSort,
    },

    /// Vote on a post or a comment; voting twice the same way withdraws the vote
    Vote {
        #[structopt(subcommand)]
        target: VoteTarget,
    },

    /// List communities, or search them
    Communities { search: Option<String> },

    /// Join or leave a community
    Subscribe {
        name: String,

        #[structopt(long)]
        leave: bool,
    },

    /// Rank users by karma
    Leaderboard {
        #[structopt(long)]
        search: Option<String>,
    },

    /// Adjust the karma of a user
    Karma {
        username: String,

        #[structopt(allow_hyphen_values = true)]
        post_delta: i64,

        #[structopt(allow_hyphen_values = true)]
        comment_delta: i64,
    },

    /// Create a user
    CreateUser { name: String },
}

#[derive(structopt::StructOpt)]
enum VoteTarget {
    Post { id: u64, vote: Vote },
    Comment { id: u64, vote: Vote },
}

fn print_tally(t: &Tally) {
    println!(
        "score {} (+{} -{}), your vote: {}",
        t.score(),
        t.upvotes,
        t.downvotes,
        t.vote
    );
}

fn print_thread(comments: &[Comment], depth: usize) {
    for c in comments {
        println!(
            "{:indent$}[{}] {} ({}): {}",
            "",
            c.id,
            c.author_username,
            c.score(),
            c.content,
            indent = depth * 2
        );
        print_thread(&c.replies, depth + 1);
    }
}

async fn vote(store: Rc<RemoteStore>, session: &Session, target: VoteTarget) -> anyhow::Result<()> {
    let user = session.require_user()?;
    let (current, id) = match target {
        VoteTarget::Post { id, .. } => {
            let p = PostService::new(store.clone())
                .get_by_id(PostId(id))
                .await
                .with_context(|| format!("fetching post {id}"))?;
            (p.tally(), id)
        }
        VoteTarget::Comment { id, .. } => {
            let c = CommentService::new(store.clone())
                .get_by_id(CommentId(id))
                .await
                .with_context(|| format!("fetching comment {id}"))?;
            (c.tally(), id)
        }
    };
    tracing::info!(%user, id, ?current, "voting");
    let state = RefCell::new(VoteState::new(current));
    let res = match target {
        VoteTarget::Post { vote, .. } => {
            let posts = PostService::new(store);
            run_vote(&state, session, vote, |v| async move {
                posts.vote(PostId(id), v).await
            })
            .await
        }
        VoteTarget::Comment { vote, .. } => {
            let comments = CommentService::new(store);
            run_vote(&state, session, vote, |v| async move {
                comments.vote(CommentId(id), v).await
            })
            .await
        }
    };
    let tally = res.context("submitting vote")?;
    print_tally(&tally);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let store = Rc::new(RemoteStore::new(opt.host));
    let session = Session::from(opt.user);

    match opt.cmd {
        Command::Posts {
            community,
            post_type,
            page,
            limit,
        } => {
            let filter = PostFilter {
                community,
                post_type,
                page,
                limit,
            };
            let posts = PostService::new(store)
                .get_all(&filter)
                .await
                .context("listing posts")?;
            for p in posts {
                println!(
                    "[{}] {:>5} r/{} {} (by {}, {} comments)",
                    p.id,
                    p.score(),
                    p.community_name,
                    p.title,
                    p.author_username,
                    p.comment_count
                );
            }
        }
        Command::Thread { post, sort } => {
            let tree = CommentService::new(store)
                .get_by_post(PostId(post), sort)
                .await
                .with_context(|| format!("fetching comments of post {post}"))?;
            print_thread(&tree, 0);
        }
        Command::Vote { target } => vote(store, &session, target).await?,
        Command::Communities { search } => {
            let communities = CommunityService::new(store);
            let res = match search {
                Some(q) => communities.search(&q).await,
                None => communities.get_all().await,
            };
            for c in res.context("listing communities")? {
                println!("r/{} ({} members): {}", c.name, c.member_count, c.description);
            }
        }
        Command::Subscribe { name, leave } => {
            let communities = CommunityService::new(store);
            let c = communities
                .get_by_name(&name)
                .await
                .with_context(|| format!("looking up community {name:?}"))?;
            let c = communities
                .subscribe(c.id, !leave)
                .await
                .context("updating subscription")?;
            println!("r/{} now has {} members", c.name, c.member_count);
        }
        Command::Leaderboard { search } => {
            let users = UserService::new(store);
            let res = match search {
                Some(q) => users.search(&q).await,
                None => users.get_all().await,
            };
            for (i, u) in res.context("listing users")?.iter().enumerate() {
                println!(
                    "{:>3}. {} {} (post {}, comment {})",
                    i + 1,
                    u.username,
                    u.total_karma(),
                    u.post_karma,
                    u.comment_karma
                );
            }
        }
        Command::Karma {
            username,
            post_delta,
            comment_delta,
        } => {
            let u = UserService::new(store)
                .update_karma(&username, post_delta, comment_delta)
                .await
                .with_context(|| format!("updating karma of {username:?}"))?;
            println!("{}: post {}, comment {}", u.username, u.post_karma, u.comment_karma);
        }
        Command::CreateUser { name } => {
            let u = UserService::new(store)
                .create(&name)
                .await
                .with_context(|| format!("creating user {name:?}"))?;
            println!("created user {} with id {}", u.username, u.id);
        }
    }

    Ok(())
}
