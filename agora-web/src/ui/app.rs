use agora_client::{
    view::{self, Field},
    Action, Controller, Navigator, Outcome, ReqwestBackend, Screen, SessionManager, Ticket,
};
use yew::prelude::*;

use crate::{store::LocalStore, ui};

pub enum AppMsg {
    Dispatch(Action),
    FieldChanged(Field, String),
    Completed(Ticket, Outcome),
    DismissNotice,
}

pub struct App {
    controller: Controller<ReqwestBackend, LocalStore>,
    nav: Navigator,
    /// Set while a request-backed action is in flight
    pending: bool,
}

impl App {
    fn run(&mut self, ctx: &Context<Self>, action: Action) {
        let ticket = self.nav.issue();
        self.pending = !action.is_local();
        let controller = self.controller.clone();
        let screen = self.nav.screen().clone();
        let form = self.nav.form().clone();
        ctx.link().send_future(async move {
            let out = controller.dispatch(&screen, action, &form).await;
            AppMsg::Completed(ticket, out)
        });
    }
}

fn confirmed(question: &str) -> bool {
    match web_sys::window().map(|w| w.confirm_with_message(question)) {
        Some(Ok(answer)) => answer,
        Some(Err(err)) => {
            tracing::warn!(?err, "failed asking for confirmation");
            false
        }
        None => false,
    }
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = crate::config();
        let controller = Controller::new(
            ReqwestBackend::new(config.backend_url.clone()),
            SessionManager::new(LocalStore),
            config,
        );
        let mut this = App {
            controller,
            nav: Navigator::new(Screen::Login),
            pending: false,
        };

        // Returning users go straight to their dashboard
        if this.controller.session().is_some() {
            let ticket = this.nav.issue();
            this.pending = true;
            let controller = this.controller.clone();
            ctx.link().send_future(async move {
                AppMsg::Completed(ticket, controller.initial_screen().await)
            });
        }
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::Dispatch(action) => {
                if let Some(question) = action.confirmation() {
                    if !confirmed(question) {
                        return false;
                    }
                }
                tracing::debug!(?action, "user action");
                self.run(ctx, action);
                true
            }
            AppMsg::FieldChanged(field, value) => {
                self.nav.form_mut().set(field, value);
                false
            }
            AppMsg::Completed(ticket, out) => {
                // Superseded outcomes leave `pending` for the latest action
                // to clear
                let applied = self.nav.apply(ticket, out);
                if applied {
                    self.pending = false;
                }
                applied
            }
            AppMsg::DismissNotice => {
                self.nav.dismiss_notice();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let session = self.controller.session();
        let page = view::render(self.nav.screen(), session.as_ref(), chrono::Utc::now());
        let form = self.nav.form();
        html! {
            <div class="container my-4">
                if let Some(n) = self.nav.notice() {
                    <div
                        class="notice d-flex align-items-center"
                        onclick={ ctx.link().callback(|_| AppMsg::DismissNotice) }
                    >
                        { ui::to_html(&view::notice(n), form, ctx.link()) }
                    </div>
                }
                if self.pending {
                    <div class="spinner-border spinner-border-sm m-2" role="status"></div>
                }
                { ui::to_html(&page, form, ctx.link()) }
            </div>
        }
    }
}
