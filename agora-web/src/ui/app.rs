use std::rc::Rc;

use agora_client::{
    api::{Comment, Error, Post, PostId},
    CommentSort, Session,
};
use yew::prelude::*;

use crate::{
    api::{Backend, VoteTarget},
    ui::{self, Toast, NOTIFICATION_TIMEOUT},
    LoginInfo,
};

#[derive(Clone, PartialEq, Properties)]
pub struct AppProps {
    pub login: LoginInfo,
    pub on_login: Callback<LoginInfo>,
    pub on_logout: Callback<()>,
}

pub enum AppMsg {
    ReceivedPosts(Result<Vec<Post>, Error>),
    OpenPost(PostId),
    ReceivedThread(Result<(Post, Vec<Comment>), Error>),
    SetSort(CommentSort),
    BackToList,

    AuthRequired,
    CloseSignIn,
    Logout,

    Notify(String),
    NotificationExpired(u64),
    DismissNotification,
}

pub struct App {
    backend: Backend,
    session: Session,
    posts: Rc<Vec<Post>>,
    thread: Option<(Post, Rc<Vec<Comment>>)>,
    sort: CommentSort,
    show_sign_in: bool,
    toast: Toast,
}

impl App {
    fn fetch_posts(&self, ctx: &Context<Self>) {
        let backend = self.backend.clone();
        ctx.link()
            .send_future(async move { AppMsg::ReceivedPosts(backend.posts().await) });
    }

    fn notify(&mut self, ctx: &Context<Self>, message: String) {
        let generation = self.toast.show(message);
        ctx.link().send_future(async move {
            if let Err(err) = wasm_timer::Delay::new(NOTIFICATION_TIMEOUT).await {
                tracing::warn!(?err, "notification timer failed, hiding it now");
            }
            AppMsg::NotificationExpired(generation)
        });
    }

    fn fetch_thread(&self, ctx: &Context<Self>, post: PostId) {
        let backend = self.backend.clone();
        let sort = self.sort;
        ctx.link().send_future(async move {
            AppMsg::ReceivedThread(backend.thread(post, sort).await)
        });
    }
}

impl Component for App {
    type Message = AppMsg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        let login = &ctx.props().login;
        let this = App {
            backend: Backend::new(login.host.clone()),
            session: Session::from(login.user.clone()),
            posts: Rc::new(Vec::new()),
            thread: None,
            sort: CommentSort::default(),
            show_sign_in: false,
            toast: Toast::default(),
        };
        this.fetch_posts(ctx);
        this
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let login = &ctx.props().login;
        if login.host != old_props.login.host {
            self.backend = Backend::new(login.host.clone());
            self.thread = None;
            self.fetch_posts(ctx);
        }
        self.session = Session::from(login.user.clone());
        self.show_sign_in = false;
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::ReceivedPosts(Ok(posts)) => self.posts = Rc::new(posts),
            AppMsg::ReceivedPosts(Err(e)) => {
                tracing::error!(?e, "failed fetching posts");
                self.notify(ctx, format!("Failed to load posts: {e}"));
            }
            AppMsg::OpenPost(id) => self.fetch_thread(ctx, id),
            AppMsg::ReceivedThread(Ok((post, comments))) => {
                self.thread = Some((post, Rc::new(comments)))
            }
            AppMsg::ReceivedThread(Err(e)) => {
                tracing::error!(?e, "failed fetching thread");
                self.notify(ctx, format!("Failed to load comments: {e}"));
            }
            AppMsg::SetSort(sort) => {
                self.sort = sort;
                match &self.thread {
                    Some((post, _)) => self.fetch_thread(ctx, post.id),
                    None => return false,
                }
            }
            AppMsg::BackToList => {
                self.thread = None;
                self.fetch_posts(ctx);
            }
            AppMsg::AuthRequired => self.show_sign_in = true,
            AppMsg::CloseSignIn => self.show_sign_in = false,
            AppMsg::Logout => {
                ctx.props().on_logout.emit(());
                return false;
            }
            AppMsg::Notify(msg) => self.notify(ctx, msg),
            AppMsg::NotificationExpired(generation) => return self.toast.expire(generation),
            AppMsg::DismissNotification => self.toast.dismiss(),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let on_auth_required = link.callback(|_| AppMsg::AuthRequired);
        let on_error = link.callback(AppMsg::Notify);

        let header = html! {
            <nav class="navbar d-flex">
                <span class="navbar-brand flex-fill">{ self.backend.host() }</span>
                { match self.session.user() {
                    Some(user) => html! {<>
                        <span class="me-2">{ user }</span>
                        <button class="btn btn-outline-secondary" onclick={ link.callback(|_| AppMsg::Logout) }>
                            { "Sign out" }
                        </button>
                    </>},
                    None => html! {
                        <button class="btn btn-primary" onclick={ link.callback(|_| AppMsg::AuthRequired) }>
                            { "Sign in" }
                        </button>
                    },
                } }
            </nav>
        };

        let sign_in = self.show_sign_in.then(|| {
            html! {
                <div class="modal d-block" role="dialog">
                    <div class="modal-dialog">
                        <div class="modal-content p-3">
                            <button
                                type="button"
                                class="btn-close ms-auto"
                                aria-label="Close"
                                onclick={ link.callback(|_| AppMsg::CloseSignIn) }
                            >
                            </button>
                            <ui::Login info={ Some(ctx.props().login.clone()) } on_submit={ ctx.props().on_login.clone() } />
                        </div>
                    </div>
                </div>
            }
        });

        let body = match &self.thread {
            None => html! {
                <ui::PostList
                    backend={ self.backend.clone() }
                    posts={ self.posts.clone() }
                    session={ self.session.clone() }
                    on_select={ link.callback(AppMsg::OpenPost) }
                    on_auth_required={ on_auth_required.clone() }
                    on_error={ on_error.clone() }
                />
            },
            Some((post, comments)) => {
                let on_sort = link.callback(|e: Event| {
                    let input: web_sys::HtmlSelectElement = e.target_unchecked_into();
                    AppMsg::SetSort(CommentSort::from_name_or_default(&input.value()))
                });
                html! {<>
                    <button class="btn btn-link" onclick={ link.callback(|_| AppMsg::BackToList) }>
                        { "Back to posts" }
                    </button>
                    <div class="post d-flex">
                        <ui::VoteButtons
                            backend={ self.backend.clone() }
                            target={ VoteTarget::Post(post.id) }
                            tally={ post.tally() }
                            session={ self.session.clone() }
                            on_auth_required={ on_auth_required.clone() }
                            on_error={ on_error.clone() }
                        />
                        <div class="flex-fill">
                            <h3>{ &post.title }</h3>
                            { super::post_list::post_body(post) }
                        </div>
                    </div>
                    <select class="form-select w-auto my-2" onchange={ on_sort }>
                        { for CommentSort::ALL.into_iter().map(|s| html! {
                            <option value={ s.as_str() } selected={ s == self.sort }>{ s.as_str() }</option>
                        }) }
                    </select>
                    <ui::CommentThread
                        backend={ self.backend.clone() }
                        comments={ comments.clone() }
                        session={ self.session.clone() }
                        { on_auth_required }
                        { on_error }
                    />
                </>}
            }
        };

        html! {
            <div class="container">
                { header }
                { for sign_in }
                { body }
                <ui::Notification
                    message={ self.toast.message().map(String::from) }
                    on_dismiss={ link.callback(|_| AppMsg::DismissNotification) }
                />
            </div>
        }
    }
}
