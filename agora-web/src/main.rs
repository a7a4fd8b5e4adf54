use gloo_storage::{LocalStorage, Storage};
use yew::prelude::*;

mod api;
mod ui;

const KEY_LOGIN: &str = "login";

fn main() {
    tracing_wasm::set_as_global_default();
    yew::Renderer::<Root>::new().render();
}

/// Where the record store lives, and who is browsing it
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoginInfo {
    pub host: String,
    /// `None` when browsing anonymously
    pub user: Option<String>,
}

enum RootMsg {
    Login(LoginInfo),
    Logout,
}

struct Root {
    login: Option<LoginInfo>,
}

impl Component for Root {
    type Message = RootMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Root {
            login: LocalStorage::get(KEY_LOGIN).ok(),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            RootMsg::Login(login) => {
                if let Err(err) = LocalStorage::set(KEY_LOGIN, &login) {
                    tracing::error!(?err, "failed saving login info to local storage");
                }
                self.login = Some(login);
            }
            RootMsg::Logout => {
                // Keep browsing the same host, anonymously
                let login = self.login.take().map(|l| LoginInfo {
                    host: l.host,
                    user: None,
                });
                match &login {
                    Some(l) => {
                        if let Err(err) = LocalStorage::set(KEY_LOGIN, l) {
                            tracing::error!(?err, "failed saving login info to local storage");
                        }
                    }
                    None => LocalStorage::delete(KEY_LOGIN),
                }
                self.login = login;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        match &self.login {
            None => html! {
                <div class="container">
                    <ui::Login info={None::<LoginInfo>} on_submit={ctx.link().callback(RootMsg::Login)} />
                </div>
            },
            Some(login) => html! {
                <ui::App
                    login={login.clone()}
                    on_login={ctx.link().callback(RootMsg::Login)}
                    on_logout={ctx.link().callback(|_| RootMsg::Logout)}
                />
            },
        }
    }
}
