//! Authentication against the managed identity provider

mod actions;
mod session;

pub use actions::{
    check_login_status, forgot_password, forgot_password_submit, logout, restore_session, sign_in,
    sign_up, AuthError, AuthEvent, ForgotPasswordInput, ResetPasswordInput, SignInInput,
    SignUpInput, FEDERATED_INFO_KEY,
};
pub(crate) use actions::form_for_page;
pub use session::SessionStore;
