use std::rc::Rc;

use agora_client::{
    api::{Comment, CommentId, Error, Post, PostId, Tally, Vote},
    CommentService, CommentSort, PostFilter, PostService, RemoteStore,
};

/// What a vote button acts on
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoteTarget {
    Post(PostId),
    Comment(CommentId),
}

/// Handle on the record store, cheap to clone into callbacks
#[derive(Clone, Debug)]
pub struct Backend(Rc<RemoteStore>);

impl PartialEq for Backend {
    fn eq(&self, other: &Backend) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Backend {
    pub fn new(host: String) -> Backend {
        Backend(Rc::new(RemoteStore::new(host)))
    }

    pub fn host(&self) -> &str {
        self.0.host()
    }

    pub async fn posts(&self) -> Result<Vec<Post>, Error> {
        PostService::new(self.0.clone())
            .get_all(&PostFilter::default())
            .await
    }

    pub async fn thread(&self, post: PostId, sort: CommentSort) -> Result<(Post, Vec<Comment>), Error> {
        let p = PostService::new(self.0.clone()).get_by_id(post).await?;
        let comments = CommentService::new(self.0.clone())
            .get_by_post(post, sort)
            .await?;
        Ok((p, comments))
    }

    /// Sends the button the user pressed, the store applies the toggle rule
    pub async fn vote(&self, target: VoteTarget, requested: Vote) -> Result<Tally, Error> {
        match target {
            VoteTarget::Post(id) => PostService::new(self.0.clone()).vote(id, requested).await,
            VoteTarget::Comment(id) => {
                CommentService::new(self.0.clone())
                    .vote(id, requested)
                    .await
            }
        }
    }
}
