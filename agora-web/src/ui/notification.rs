use std::time::Duration;

use yew::prelude::*;

/// How long a notification stays up unless dismissed earlier
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// The message currently shown, if any.
///
/// Every `show` starts a new generation, so that the timer of a replaced
/// message cannot hide its successor.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Toast {
    message: Option<String>,
    generation: u64,
}

impl Toast {
    /// Returns the generation to pass to `expire` once the timeout elapsed
    pub fn show(&mut self, message: String) -> u64 {
        self.generation += 1;
        self.message = Some(message);
        self.generation
    }

    /// Returns whether the message was hidden
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.message.is_none() {
            return false;
        }
        self.message = None;
        true
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[derive(Clone, PartialEq, Properties)]
pub struct NotificationProps {
    pub message: Option<String>,
    pub on_dismiss: Callback<()>,
}

#[function_component(Notification)]
pub fn notification(p: &NotificationProps) -> Html {
    let shown = p.message.is_some();
    html! {
        <div
            class={ classes!(
                "notification", (!shown).then(|| "is-hidden"),
                "d-flex", "align-items-center"
            ) }
            role="alert"
            aria-hidden={ if shown { "false" } else { "true" } }
        >
            <div class="flex-fill m-2">{ p.message.clone().unwrap_or_default() }</div>
            <button
                type="button"
                class="btn-close m-2"
                aria-label="Dismiss"
                onclick={ p.on_dismiss.reform(|_| ()) }
            >
            </button>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_its_own_timeout() {
        let mut t = Toast::default();
        let g = t.show(String::from("Failed to vote"));
        assert_eq!(t.message(), Some("Failed to vote"));
        assert!(t.expire(g));
        assert_eq!(t.message(), None);
        assert!(!t.expire(g));
    }

    #[test]
    fn stale_timers_keep_newer_messages() {
        let mut t = Toast::default();
        let first = t.show(String::from("one"));
        let second = t.show(String::from("two"));
        assert!(!t.expire(first));
        assert_eq!(t.message(), Some("two"));
        assert!(t.expire(second));
    }

    #[test]
    fn dismissed_early() {
        let mut t = Toast::default();
        let g = t.show(String::from("one"));
        t.dismiss();
        assert_eq!(t.message(), None);
        assert!(!t.expire(g));
    }
}
