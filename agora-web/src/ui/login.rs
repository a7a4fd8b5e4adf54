use yew::prelude::*;

use crate::LoginInfo;

#[derive(Clone, PartialEq, Properties)]
pub struct LoginProps {
    pub info: Option<LoginInfo>,
    pub on_submit: Callback<LoginInfo>,
}

pub struct Login {
    host: String,
    user: String,
}

pub enum LoginMsg {
    HostChanged(String),
    UserChanged(String),
    SubmitClicked,
}

impl Component for Login {
    type Message = LoginMsg;
    type Properties = LoginProps;

    fn create(ctx: &Context<Self>) -> Self {
        let (host, user) = match &ctx.props().info {
            Some(i) => (i.host.clone(), i.user.clone().unwrap_or_default()),
            None => (String::new(), String::new()),
        };
        Self { host, user }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LoginMsg::HostChanged(h) => self.host = h,
            LoginMsg::UserChanged(u) => self.user = u,
            LoginMsg::SubmitClicked => {
                let user = self.user.trim();
                ctx.props().on_submit.emit(LoginInfo {
                    host: self.host.trim_end_matches('/').to_string(),
                    user: (!user.is_empty()).then(|| user.to_string()),
                });
                return false;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link().callback(|e: web_sys::Event| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    LoginMsg::$msg(input.value())
                })
            };
        }
        html! {<>
            <div class="text-center my-4">
                <h1>{ "Sign in" }</h1>
            </div>
            <form class="login-form" onsubmit={ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                LoginMsg::SubmitClicked
            })}>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="host">{ "Host" }</label>
                    <input
                        type="url"
                        class="form-control form-control-lg"
                        id="host"
                        placeholder="https://example.org"
                        value={self.host.clone()}
                        onchange={callback_for!(HostChanged)}
                    />
                </div>
                <div class="input-group mb-3">
                    <label class="input-group-text col-xl-1" for="user">{ "Username" }</label>
                    <input
                        type="text"
                        class="form-control form-control-lg"
                        id="user"
                        placeholder="leave empty to browse anonymously"
                        value={self.user.clone()}
                        onchange={callback_for!(UserChanged)}
                    />
                </div>
                <button type="submit" class="btn btn-primary">
                    { "Connect" }
                </button>
            </form>
        </>}
    }
}
