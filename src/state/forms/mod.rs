//! Form domain layer
//!
//! Local forms typed by the user (auth pages, sponsor and admin editors) and
//! the schema-driven application form.

mod application_form;
mod field;
mod form_state;

pub use application_form::{ApplicationForm, FieldEntry, FormButton};
pub use field::{FieldValue, FormField};
pub use form_state::{
    AdminCreateForm, BulkStatusForm, ForgotPasswordForm, ForgotPasswordSubmitForm, Form,
    FormState, SignInForm, SignUpForm, SponsorForm,
};
