//! Form state management and form structs

use super::field::FormField;
use crate::auth::{ForgotPasswordInput, ResetPasswordInput, SignInInput, SignUpInput};
use crate::state::{ApplicationStatus, Sponsor, SponsorInput};

/// Trait for common form operations. The last index is the submit row.
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn fields(&self) -> Vec<&FormField>;
    fn fields_mut(&mut self) -> Vec<&mut FormField>;

    fn next_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        self.fields().into_iter().nth(index)
    }
    /// `None` while the submit row is active
    fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        let index = self.active_field();
        self.fields_mut().into_iter().nth(index)
    }
    fn is_buttons_row_active(&self) -> bool {
        self.active_field() + 1 == self.field_count()
    }
}

macro_rules! impl_form {
    ($form:ident: $($field:ident),+) => {
        impl Form for $form {
            fn field_count(&self) -> usize {
                [$(stringify!($field)),+].len() + 1
            }
            fn active_field(&self) -> usize {
                self.active_field_index
            }
            fn set_active_field(&mut self, index: usize) {
                self.active_field_index = index.min(self.field_count() - 1);
            }
            fn fields(&self) -> Vec<&FormField> {
                vec![$(&self.$field),+]
            }
            fn fields_mut(&mut self) -> Vec<&mut FormField> {
                vec![$(&mut self.$field),+]
            }
        }
    };
}

/// Enum representing all possible local form states
#[derive(Debug, Clone, Default)]
pub enum FormState {
    #[default]
    None,
    SignIn(SignInForm),
    SignUp(SignUpForm),
    ForgotPassword(ForgotPasswordForm),
    ForgotPasswordSubmit(ForgotPasswordSubmitForm),
    Sponsor(SponsorForm),
    AdminCreate(AdminCreateForm),
    BulkStatus(BulkStatusForm),
}

impl FormState {
    pub fn as_form(&self) -> Option<&dyn Form> {
        match self {
            FormState::None => None,
            FormState::SignIn(f) => Some(f),
            FormState::SignUp(f) => Some(f),
            FormState::ForgotPassword(f) => Some(f),
            FormState::ForgotPasswordSubmit(f) => Some(f),
            FormState::Sponsor(f) => Some(f),
            FormState::AdminCreate(f) => Some(f),
            FormState::BulkStatus(f) => Some(f),
        }
    }

    pub fn as_form_mut(&mut self) -> Option<&mut dyn Form> {
        match self {
            FormState::None => None,
            FormState::SignIn(f) => Some(f),
            FormState::SignUp(f) => Some(f),
            FormState::ForgotPassword(f) => Some(f),
            FormState::ForgotPasswordSubmit(f) => Some(f),
            FormState::Sponsor(f) => Some(f),
            FormState::AdminCreate(f) => Some(f),
            FormState::BulkStatus(f) => Some(f),
        }
    }

    pub fn next_field(&mut self) {
        if let Some(form) = self.as_form_mut() {
            form.next_field();
        }
    }

    pub fn prev_field(&mut self) {
        if let Some(form) = self.as_form_mut() {
            form.prev_field();
        }
    }

    pub fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        self.as_form_mut().and_then(|f| f.get_active_field_mut())
    }

    pub fn is_active_field_multiline(&self) -> bool {
        self.as_form()
            .and_then(|f| f.get_field(f.active_field()))
            .is_some_and(|f| f.is_multiline)
    }

    pub fn is_buttons_row_active(&self) -> bool {
        self.as_form().is_some_and(|f| f.is_buttons_row_active())
    }
}

// Sign In Form
#[derive(Debug, Clone)]
pub struct SignInForm {
    pub email: FormField,
    pub password: FormField,
    pub active_field_index: usize,
}

impl SignInForm {
    pub fn new(email: &str) -> Self {
        Self {
            email: FormField::text_with_value("email", "Email", email.to_string()),
            password: FormField::secret("password", "Password"),
            active_field_index: if email.is_empty() { 0 } else { 1 },
        }
    }

    pub fn to_input(&self) -> SignInInput {
        SignInInput {
            email: self.email.as_text().trim().to_string(),
            password: self.password.as_text().to_string(),
        }
    }
}

impl_form!(SignInForm: email, password);

// Sign Up Form
#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub email: FormField,
    pub password: FormField,
    pub password2: FormField,
    pub active_field_index: usize,
}

impl SignUpForm {
    pub fn new() -> Self {
        Self {
            email: FormField::text("email", "Email"),
            password: FormField::secret("password", "Password"),
            password2: FormField::secret("password2", "Confirm password"),
            active_field_index: 0,
        }
    }

    pub fn to_input(&self) -> SignUpInput {
        SignUpInput {
            email: self.email.as_text().trim().to_string(),
            password: self.password.as_text().to_string(),
            password2: self.password2.as_text().to_string(),
        }
    }
}

impl Default for SignUpForm {
    fn default() -> Self {
        Self::new()
    }
}

impl_form!(SignUpForm: email, password, password2);

// Forgot Password Form
#[derive(Debug, Clone)]
pub struct ForgotPasswordForm {
    pub email: FormField,
    pub active_field_index: usize,
}

impl ForgotPasswordForm {
    pub fn new(email: &str) -> Self {
        Self {
            email: FormField::text_with_value("email", "Email", email.to_string()),
            active_field_index: 0,
        }
    }

    pub fn to_input(&self) -> ForgotPasswordInput {
        ForgotPasswordInput {
            email: self.email.as_text().trim().to_string(),
        }
    }
}

impl_form!(ForgotPasswordForm: email);

// Forgot Password Submit Form
#[derive(Debug, Clone)]
pub struct ForgotPasswordSubmitForm {
    pub email: FormField,
    pub code: FormField,
    pub password: FormField,
    pub password2: FormField,
    pub active_field_index: usize,
}

impl ForgotPasswordSubmitForm {
    pub fn new(email: &str) -> Self {
        Self {
            email: FormField::text_with_value("email", "Email", email.to_string()),
            code: FormField::text("code", "Verification code"),
            password: FormField::secret("password", "New password"),
            password2: FormField::secret("password2", "Confirm new password"),
            active_field_index: if email.is_empty() { 0 } else { 1 },
        }
    }

    pub fn to_input(&self) -> ResetPasswordInput {
        ResetPasswordInput {
            email: self.email.as_text().trim().to_string(),
            code: self.code.as_text().trim().to_string(),
            password: self.password.as_text().to_string(),
            password2: self.password2.as_text().to_string(),
        }
    }
}

impl_form!(ForgotPasswordSubmitForm: email, code, password, password2);

const ADMIN_EMAILS_LABEL: &str = "Admin emails (comma or newline separated)";

// Sponsor Form (create when `sponsor_id` is None)
#[derive(Debug, Clone)]
pub struct SponsorForm {
    pub sponsor_id: Option<String>,
    pub name: FormField,
    pub admin_emails: FormField,
    pub active_field_index: usize,
}

impl SponsorForm {
    pub fn new() -> Self {
        Self {
            sponsor_id: None,
            name: FormField::text("name", "Sponsor name"),
            admin_emails: FormField::multiline("admin_emails", ADMIN_EMAILS_LABEL, String::new()),
            active_field_index: 0,
        }
    }

    pub fn from_sponsor(sponsor: &Sponsor) -> Self {
        let mut form = Self::new();
        form.sponsor_id = Some(sponsor.id.clone());
        form.name = FormField::text_with_value("name", "Sponsor name", sponsor.name.clone());
        form.admin_emails = FormField::multiline(
            "admin_emails",
            ADMIN_EMAILS_LABEL,
            sponsor.admin_emails.join("\n"),
        );
        form
    }

    pub fn to_input(&self) -> SponsorInput {
        SponsorInput {
            name: self.name.as_text().trim().to_string(),
            admin_emails: split_list(self.admin_emails.as_text()),
        }
    }
}

impl Default for SponsorForm {
    fn default() -> Self {
        Self::new()
    }
}

impl_form!(SponsorForm: name, admin_emails);

// Admin Create Form
#[derive(Debug, Clone)]
pub struct AdminCreateForm {
    pub email: FormField,
    pub active_field_index: usize,
}

impl AdminCreateForm {
    pub fn new() -> Self {
        Self {
            email: FormField::text("email", "Admin email"),
            active_field_index: 0,
        }
    }

    pub fn email(&self) -> &str {
        self.email.as_text().trim()
    }
}

impl Default for AdminCreateForm {
    fn default() -> Self {
        Self::new()
    }
}

impl_form!(AdminCreateForm: email);

// Bulk Status Form
#[derive(Debug, Clone)]
pub struct BulkStatusForm {
    pub user_ids: FormField,
    pub status: FormField,
    pub active_field_index: usize,
}

impl BulkStatusForm {
    pub fn new() -> Self {
        let options = ApplicationStatus::ALL
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        Self {
            user_ids: FormField::multiline(
                "user_ids",
                "User ids (comma or newline separated)",
                String::new(),
            ),
            status: FormField::choice("status", "New status", options, 0),
            active_field_index: 0,
        }
    }

    pub fn user_ids(&self) -> Vec<String> {
        split_list(self.user_ids.as_text())
    }

    pub fn target_status(&self) -> ApplicationStatus {
        ApplicationStatus::parse(self.status.as_text())
    }
}

impl Default for BulkStatusForm {
    fn default() -> Self {
        Self::new()
    }
}

impl_form!(BulkStatusForm: user_ids, status);

/// Split a comma/whitespace separated list, dropping empty items
fn split_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
