//! Auth actions
//!
//! Each action brackets its provider call with `LoadingStart`/`LoadingEnd`
//! and reports provider failures as `AuthEvent::Error` with the provider's
//! message. Password confirmation is checked locally before any call.

use super::session::SessionStore;
use crate::api::IdentityProvider;
use crate::state::{AppState, AuthPage, AuthState, Dispatch, FormState, Roles, View};
use crate::state::{ForgotPasswordForm, ForgotPasswordSubmitForm, SignInForm, SignUpForm};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// Session cache key holding the signed-in user's token
pub const FEDERATED_INFO_KEY: &str = "federatedInfo";
/// Local store key remembering the last email used to sign in
const LAST_EMAIL_KEY: &str = "lastEmail";

const SIGN_UP_COMPLETE: &str = "Account creation complete. Please check your email for a confirmation link to confirm your email address, then sign in below. If you don't see the email, please check your spam folder.";
const RESET_CODE_SENT: &str = "Verification email sent. Please check your email for a code and enter the code below to change your password. If you don't see the email, please check your spam folder.";
const PASSWORD_CHANGED: &str = "Password changed successfully! Please log in with your new password:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Passwords do not match.")]
    PasswordMismatch,
}

/// State changes requested by auth actions
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    LoadingStart,
    LoadingEnd,
    LoggedIn {
        user_id: String,
        attributes: HashMap<String, String>,
        groups: Vec<String>,
    },
    LoggedOut,
    /// Switch auth page, replacing its message and error lines
    SetAuthPage {
        page: AuthPage,
        message: String,
        error: String,
    },
    SetMessage(String),
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub password2: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForgotPasswordInput {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub password: String,
    pub password2: String,
}

fn check_passwords(password: &str, password2: &str) -> Result<(), AuthError> {
    if password == password2 {
        Ok(())
    } else {
        Err(AuthError::PasswordMismatch)
    }
}

/// Ask the provider who is signed in. No user is not an error.
pub async fn check_login_status<I, D>(identity: &mut I, dispatch: &mut D)
where
    I: IdentityProvider + ?Sized,
    D: Dispatch<AuthEvent>,
{
    dispatch.dispatch(AuthEvent::LoadingStart);
    match identity.current_authenticated_user().await {
        Ok(Some(user)) => {
            tracing::info!("Signed in as {}", user.username);
            dispatch.dispatch(AuthEvent::LoggedIn {
                user_id: user.username,
                attributes: user.attributes,
                groups: user.groups,
            });
        }
        Ok(None) => tracing::debug!("No credentials"),
        Err(e) => dispatch.dispatch(AuthEvent::Error(e.to_string())),
    }
    dispatch.dispatch(AuthEvent::LoadingEnd);
}

/// Resume a session cached by a previous run
pub async fn restore_session<I, D>(identity: &mut I, cache: &SessionStore, dispatch: &mut D)
where
    I: IdentityProvider + ?Sized,
    D: Dispatch<AuthEvent>,
{
    let token = cache
        .get_item(FEDERATED_INFO_KEY)
        .and_then(|info| serde_json::from_str::<serde_json::Value>(info).ok())
        .and_then(|info| info.get("token").and_then(|t| t.as_str()).map(str::to_string));

    if let Some(token) = token {
        identity.restore_session(&token);
        check_login_status(identity, dispatch).await;
    }
}

pub async fn sign_in<I, D>(
    identity: &mut I,
    cache: &mut SessionStore,
    local: &mut SessionStore,
    dispatch: &mut D,
    input: &SignInInput,
) where
    I: IdentityProvider + ?Sized,
    D: Dispatch<AuthEvent>,
{
    dispatch.dispatch(AuthEvent::LoadingStart);
    match identity.sign_in(&input.email, &input.password).await {
        Ok(token) => {
            let info = json!({ "username": input.email, "token": token }).to_string();
            if let Err(e) = cache.set_item(FEDERATED_INFO_KEY, info) {
                tracing::warn!("Could not cache session: {e}");
            }
            if let Err(e) = local.set_item(LAST_EMAIL_KEY, input.email.clone()) {
                tracing::warn!("Could not remember email: {e}");
            }
            check_login_status(identity, dispatch).await;
        }
        Err(e) => dispatch.dispatch(AuthEvent::Error(e.to_string())),
    }
    dispatch.dispatch(AuthEvent::LoadingEnd);
}

pub async fn sign_up<I, D>(
    identity: &mut I,
    dispatch: &mut D,
    input: &SignUpInput,
    confirmation_url: &str,
) where
    I: IdentityProvider + ?Sized,
    D: Dispatch<AuthEvent>,
{
    if let Err(e) = check_passwords(&input.password, &input.password2) {
        dispatch.dispatch(AuthEvent::Error(e.to_string()));
        return;
    }

    dispatch.dispatch(AuthEvent::LoadingStart);
    let attributes = HashMap::from([
        ("email".to_string(), input.email.clone()),
        ("name".to_string(), "User".to_string()),
        // Link for the confirmation email
        ("website".to_string(), confirmation_url.to_string()),
    ]);
    match identity
        .sign_up(&input.email, &input.password, attributes)
        .await
    {
        Ok(()) => dispatch.dispatch(AuthEvent::SetAuthPage {
            page: AuthPage::SignIn,
            message: SIGN_UP_COMPLETE.to_string(),
            error: String::new(),
        }),
        Err(e) => dispatch.dispatch(AuthEvent::Error(e.to_string())),
    }
    dispatch.dispatch(AuthEvent::LoadingEnd);
}

pub async fn forgot_password<I, D>(identity: &mut I, dispatch: &mut D, input: &ForgotPasswordInput)
where
    I: IdentityProvider + ?Sized,
    D: Dispatch<AuthEvent>,
{
    dispatch.dispatch(AuthEvent::LoadingStart);
    match identity.forgot_password(&input.email).await {
        Ok(()) => dispatch.dispatch(AuthEvent::SetAuthPage {
            page: AuthPage::ForgotPasswordSubmit,
            message: RESET_CODE_SENT.to_string(),
            error: String::new(),
        }),
        Err(e) => dispatch.dispatch(AuthEvent::Error(e.to_string())),
    }
    dispatch.dispatch(AuthEvent::LoadingEnd);
}

pub async fn forgot_password_submit<I, D>(
    identity: &mut I,
    dispatch: &mut D,
    input: &ResetPasswordInput,
) where
    I: IdentityProvider + ?Sized,
    D: Dispatch<AuthEvent>,
{
    if let Err(e) = check_passwords(&input.password, &input.password2) {
        dispatch.dispatch(AuthEvent::Error(e.to_string()));
        return;
    }

    dispatch.dispatch(AuthEvent::LoadingStart);
    match identity
        .forgot_password_submit(&input.email, &input.code, &input.password)
        .await
    {
        Ok(()) => dispatch.dispatch(AuthEvent::SetAuthPage {
            page: AuthPage::SignIn,
            message: PASSWORD_CHANGED.to_string(),
            error: String::new(),
        }),
        Err(e) => dispatch.dispatch(AuthEvent::Error(e.to_string())),
    }
    dispatch.dispatch(AuthEvent::LoadingEnd);
}

/// Drop the cached session and local data, then sign out with the provider
pub async fn logout<I, D>(
    identity: &mut I,
    cache: &mut SessionStore,
    local: &mut SessionStore,
    dispatch: &mut D,
) where
    I: IdentityProvider + ?Sized,
    D: Dispatch<AuthEvent>,
{
    dispatch.dispatch(AuthEvent::LoadingStart);
    tracing::info!("Signing out");
    if let Err(e) = cache.remove_item(FEDERATED_INFO_KEY) {
        tracing::warn!("Could not remove cached session: {e}");
    }
    if let Err(e) = local.clear() {
        tracing::warn!("Could not clear local store: {e}");
    }
    tracing::debug!("Session cache keys after sign out: {:?}", cache.keys());

    let result = identity.sign_out().await;
    dispatch.dispatch(AuthEvent::LoadingEnd);
    match result {
        Ok(()) => dispatch.dispatch(AuthEvent::LoggedOut),
        Err(e) => dispatch.dispatch(AuthEvent::Error(e.to_string())),
    }
}

/// Email typed into whichever auth form is open
fn current_email(form: &FormState) -> String {
    let email = match form {
        FormState::SignIn(f) => f.email.as_text(),
        FormState::SignUp(f) => f.email.as_text(),
        FormState::ForgotPassword(f) => f.email.as_text(),
        FormState::ForgotPasswordSubmit(f) => f.email.as_text(),
        _ => "",
    };
    email.trim().to_string()
}

/// Fresh form for an auth page
pub(crate) fn form_for_page(page: AuthPage, email: &str) -> FormState {
    match page {
        AuthPage::SignIn => FormState::SignIn(SignInForm::new(email)),
        AuthPage::SignUp => FormState::SignUp(SignUpForm::new()),
        AuthPage::ForgotPassword => FormState::ForgotPassword(ForgotPasswordForm::new(email)),
        AuthPage::ForgotPasswordSubmit => {
            FormState::ForgotPasswordSubmit(ForgotPasswordSubmitForm::new(email))
        }
    }
}

impl Dispatch<AuthEvent> for AppState {
    fn dispatch(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::LoadingStart => self.loading += 1,
            AuthEvent::LoadingEnd => self.loading = self.loading.saturating_sub(1),
            AuthEvent::LoggedIn {
                user_id,
                attributes,
                groups,
            } => {
                self.auth.logged_in = true;
                self.auth.user_id = Some(user_id);
                self.auth.attributes = attributes;
                self.auth.roles = Roles::from_groups(&groups);
                self.auth.message.clear();
                self.auth.error.clear();
                self.form = FormState::None;
                if self.current_view == View::Auth {
                    self.current_view = View::Dashboard;
                    self.view_history.clear();
                }
            }
            AuthEvent::LoggedOut => {
                self.auth = AuthState::default();
                self.current_view = View::Auth;
                self.view_params = Default::default();
                self.view_history.clear();
                self.form = form_for_page(AuthPage::SignIn, "");
            }
            AuthEvent::SetAuthPage {
                page,
                message,
                error,
            } => {
                let email = current_email(&self.form);
                self.auth.page = page;
                self.auth.message = message;
                self.auth.error = error;
                self.form = form_for_page(page, &email);
            }
            AuthEvent::SetMessage(message) => self.auth.message = message,
            AuthEvent::Error(error) => {
                if self.auth.logged_in {
                    self.push_error(error);
                } else {
                    self.auth.error = error;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthUser, MockIdentityProvider};
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;

    fn mismatched_sign_up() -> SignUpInput {
        SignUpInput {
            email: "ada@example.com".into(),
            password: "a".into(),
            password2: "b".into(),
        }
    }

    fn reset(password2: &str) -> ResetPasswordInput {
        ResetPasswordInput {
            email: "ada@example.com".into(),
            code: "123456".into(),
            password: "a".into(),
            password2: password2.into(),
        }
    }

    mod password_confirmation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_sign_up_mismatch_makes_no_call() {
            let mut identity = MockIdentityProvider::new();
            identity.expect_sign_up().times(0);
            let mut events = Vec::new();

            sign_up(&mut identity, &mut events, &mismatched_sign_up(), "https://x").await;

            assert_eq!(events, vec![AuthEvent::Error("Passwords do not match.".into())]);
        }

        #[tokio::test]
        async fn test_sign_up_match_calls_provider() {
            let mut identity = MockIdentityProvider::new();
            identity
                .expect_sign_up()
                .withf(|username, password, attributes| {
                    username == "ada@example.com"
                        && password == "a"
                        && attributes.get("name").map(String::as_str) == Some("User")
                        && attributes.get("website").map(String::as_str) == Some("https://x")
                })
                .times(1)
                .returning(|_, _, _| Ok(()));
            let mut events = Vec::new();
            let input = SignUpInput {
                password2: "a".into(),
                ..mismatched_sign_up()
            };

            sign_up(&mut identity, &mut events, &input, "https://x").await;

            assert_eq!(events.first(), Some(&AuthEvent::LoadingStart));
            assert_eq!(events.last(), Some(&AuthEvent::LoadingEnd));
            assert!(matches!(
                &events[1],
                AuthEvent::SetAuthPage { page: AuthPage::SignIn, message, .. }
                    if message.starts_with("Account creation complete.")
            ));
        }

        #[tokio::test]
        async fn test_reset_mismatch_makes_no_call() {
            let mut identity = MockIdentityProvider::new();
            identity.expect_forgot_password_submit().times(0);
            let mut events = Vec::new();

            forgot_password_submit(&mut identity, &mut events, &reset("b")).await;

            assert_eq!(events, vec![AuthEvent::Error("Passwords do not match.".into())]);
        }

        #[tokio::test]
        async fn test_reset_match_calls_provider() {
            let mut identity = MockIdentityProvider::new();
            identity
                .expect_forgot_password_submit()
                .withf(|email, code, password| {
                    email == "ada@example.com" && code == "123456" && password == "a"
                })
                .times(1)
                .returning(|_, _, _| Ok(()));
            let mut events = Vec::new();

            forgot_password_submit(&mut identity, &mut events, &reset("a")).await;

            assert_eq!(
                events[1],
                AuthEvent::SetAuthPage {
                    page: AuthPage::SignIn,
                    message: PASSWORD_CHANGED.into(),
                    error: String::new(),
                }
            );
        }
    }

    #[tokio::test]
    async fn test_provider_error_message_is_dispatched() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_forgot_password()
            .returning(|_| Err(anyhow!("Username/client id combination not found.")));
        let mut events = Vec::new();

        forgot_password(
            &mut identity,
            &mut events,
            &ForgotPasswordInput {
                email: "nobody@example.com".into(),
            },
        )
        .await;

        assert_eq!(
            events,
            vec![
                AuthEvent::LoadingStart,
                AuthEvent::Error("Username/client id combination not found.".into()),
                AuthEvent::LoadingEnd,
            ]
        );
    }

    #[tokio::test]
    async fn test_sign_in_caches_session_and_checks_status() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .returning(|_, _| Ok("token-1".to_string()));
        identity.expect_current_authenticated_user().returning(|| {
            Ok(Some(AuthUser {
                username: "ada".into(),
                attributes: HashMap::new(),
                groups: vec!["admin".into()],
            }))
        });
        let mut cache = SessionStore::in_memory();
        let mut local = SessionStore::in_memory();
        let mut events = Vec::new();
        let input = SignInInput {
            email: "ada@example.com".into(),
            password: "pw".into(),
        };

        sign_in(&mut identity, &mut cache, &mut local, &mut events, &input).await;

        assert!(cache.get_item(FEDERATED_INFO_KEY).unwrap().contains("token-1"));
        assert_eq!(local.get_item(LAST_EMAIL_KEY), Some("ada@example.com"));
        assert!(events.iter().any(|e| matches!(e, AuthEvent::LoggedIn { user_id, .. } if user_id == "ada")));
        let starts = events.iter().filter(|e| **e == AuthEvent::LoadingStart).count();
        let ends = events.iter().filter(|e| **e == AuthEvent::LoadingEnd).count();
        assert_eq!(starts, ends);
    }

    #[tokio::test]
    async fn test_check_login_status_without_user_is_silent() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_current_authenticated_user()
            .returning(|| Ok(None));
        let mut events = Vec::new();

        check_login_status(&mut identity, &mut events).await;

        assert_eq!(events, vec![AuthEvent::LoadingStart, AuthEvent::LoadingEnd]);
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_local_store() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_sign_out().times(1).returning(|| Ok(()));
        let mut cache = SessionStore::in_memory();
        cache.set_item(FEDERATED_INFO_KEY, "{}").unwrap();
        cache.set_item("other", "kept").unwrap();
        let mut local = SessionStore::in_memory();
        local.set_item("lastEmail", "ada@example.com").unwrap();
        let mut events = Vec::new();

        logout(&mut identity, &mut cache, &mut local, &mut events).await;

        assert!(cache.get_item(FEDERATED_INFO_KEY).is_none());
        assert_eq!(cache.get_item("other"), Some("kept"));
        assert!(local.keys().is_empty());
        assert_eq!(
            events,
            vec![AuthEvent::LoadingStart, AuthEvent::LoadingEnd, AuthEvent::LoggedOut]
        );
    }

    #[tokio::test]
    async fn test_restore_session_uses_cached_token() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_restore_session()
            .withf(|token| token == "token-9")
            .times(1)
            .return_const(());
        identity
            .expect_current_authenticated_user()
            .returning(|| Ok(None));
        let mut cache = SessionStore::in_memory();
        cache
            .set_item(FEDERATED_INFO_KEY, r#"{"username":"ada","token":"token-9"}"#)
            .unwrap();
        let mut events = Vec::new();

        restore_session(&mut identity, &cache, &mut events).await;
    }

    mod reducer {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_logged_in_moves_to_dashboard_with_roles() {
            let mut state = AppState::default();
            state.dispatch(AuthEvent::LoggedIn {
                user_id: "ada".into(),
                attributes: HashMap::new(),
                groups: vec!["sponsor".into()],
            });
            assert!(state.auth.logged_in);
            assert!(state.auth.roles.sponsor);
            assert!(!state.auth.roles.applicant);
            assert_eq!(state.current_view, View::Dashboard);
        }

        #[test]
        fn test_error_goes_to_auth_page_when_signed_out() {
            let mut state = AppState::default();
            state.dispatch(AuthEvent::Error("bad".into()));
            assert_eq!(state.auth.error, "bad");
            assert!(!state.has_errors());
        }

        #[test]
        fn test_error_goes_to_dialog_when_signed_in() {
            let mut state = AppState::default();
            state.auth.logged_in = true;
            state.dispatch(AuthEvent::Error("bad".into()));
            assert_eq!(state.current_error(), Some("bad"));
        }

        #[test]
        fn test_set_auth_page_keeps_email() {
            let mut state = AppState::default();
            state.form = form_for_page(AuthPage::ForgotPassword, "ada@example.com");
            state.dispatch(AuthEvent::SetAuthPage {
                page: AuthPage::ForgotPasswordSubmit,
                message: RESET_CODE_SENT.into(),
                error: String::new(),
            });
            assert_eq!(state.auth.page, AuthPage::ForgotPasswordSubmit);
            match &state.form {
                FormState::ForgotPasswordSubmit(f) => {
                    assert_eq!(f.email.as_text(), "ada@example.com")
                }
                _ => panic!("expected the reset form"),
            }
        }

        #[test]
        fn test_logged_out_resets_auth() {
            let mut state = AppState::default();
            state.auth.logged_in = true;
            state.current_view = View::Admin;
            state.dispatch(AuthEvent::LoggedOut);
            assert!(!state.auth.logged_in);
            assert_eq!(state.current_view, View::Auth);
            assert!(matches!(state.form, FormState::SignIn(_)));
        }
    }
}
