//! Trait abstraction for the portal and identity services to enable mocking in tests

use crate::schema::{FormData, Schema, UiSchema};
use crate::state::{ApplicationStatus, ApplicationSummary, Sponsor, SponsorInput, UserProfile};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// A named form's documents as served by the API
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchemaDoc {
    pub form_name: String,
    pub schema: Schema,
    pub ui_schema: UiSchema,
    /// `None` shows every field
    pub shown_fields: Option<Vec<String>>,
}

/// The user behind the current session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthUser {
    pub username: String,
    pub attributes: HashMap<String, String>,
    pub groups: Vec<String>,
}

/// Portal operations: applicant forms, admin review, sponsor management
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Profile of the signed-in user, including application status
    async fn get_user_profile(&mut self) -> Result<UserProfile>;

    /// Saved answers for a form (empty when nothing was saved)
    async fn load_data(&mut self, form_name: &str) -> Result<FormData>;

    /// Persist answers without submitting
    async fn save_data(&mut self, form_name: &str, data: &FormData) -> Result<()>;

    /// Finalize the application; returns the new status
    async fn submit_form(&mut self, form_name: &str, idempotency_key: &str) -> Result<ApplicationStatus>;

    /// Schema, uiSchema and shown fields of a named form
    async fn get_form_schema(&mut self, form_name: &str) -> Result<FormSchemaDoc>;

    async fn list_sponsors(&mut self) -> Result<Vec<Sponsor>>;

    async fn get_sponsor_detail(&mut self, id: &str) -> Result<Sponsor>;

    async fn create_sponsor(&mut self, input: &SponsorInput) -> Result<Sponsor>;

    async fn update_sponsor(&mut self, id: &str, input: &SponsorInput) -> Result<Sponsor>;

    /// Create an admin account; returns its user id
    async fn create_admin(&mut self, email: &str) -> Result<String>;

    async fn list_applications(&mut self, form_name: &str) -> Result<Vec<ApplicationSummary>>;

    /// Set the status of several applications; returns how many changed
    async fn bulk_change_status(
        &mut self,
        form_name: &str,
        user_ids: &[String],
        status: ApplicationStatus,
    ) -> Result<u32>;
}

/// Managed identity provider. Errors carry the provider's message verbatim.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the session token
    async fn sign_in(&mut self, email: &str, password: &str) -> Result<String>;

    async fn sign_up(
        &mut self,
        username: &str,
        password: &str,
        attributes: HashMap<String, String>,
    ) -> Result<()>;

    /// Send a verification code for a password reset
    async fn forgot_password(&mut self, email: &str) -> Result<()>;

    async fn forgot_password_submit(&mut self, email: &str, code: &str, password: &str) -> Result<()>;

    async fn sign_out(&mut self) -> Result<()>;

    /// `None` when no user is signed in
    async fn current_authenticated_user(&mut self) -> Result<Option<AuthUser>>;

    /// Reuse a token from a previous run
    fn restore_session(&mut self, token: &str);
}
