//! Application state definitions

use super::dispatch::{Dispatch, PortalEvent};
use super::forms::FormState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Current view in the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// Sign in, sign up and password reset pages
    #[default]
    Auth,
    Dashboard,
    /// A named form page (`ViewParams::form_name`)
    Form,
    Admin,
    Sponsors,
    SponsorDetail,
    SponsorEdit,
    AdminCreate,
}

impl View {
    /// Check if this view edits a local form
    pub fn is_form_view(&self) -> bool {
        matches!(self, View::SponsorEdit | View::AdminCreate)
    }
}

/// View parameters for navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewParams {
    pub form_name: Option<String>,
    pub sponsor_id: Option<String>,
}

impl ViewParams {
    pub fn form(name: &str) -> Self {
        Self {
            form_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn sponsor(id: &str) -> Self {
        Self {
            sponsor_id: Some(id.to_string()),
            ..Default::default()
        }
    }
}

/// Where an application stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Draft,
    Submitted,
    Admitted,
    Waitlisted,
    Rejected,
    /// A status this client does not know; kept read-only
    Unknown,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        Self::Draft,
        Self::Submitted,
        Self::Admitted,
        Self::Waitlisted,
        Self::Rejected,
    ];

    /// Parse the API's status string. Empty means draft; anything unrecognised
    /// is `Unknown`, which locks the form like any other non-draft status.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "submitted" => Self::Submitted,
            "admitted" => Self::Admitted,
            "waitlisted" => Self::Waitlisted,
            "rejected" => Self::Rejected,
            "draft" | "incomplete" | "" => Self::Draft,
            other => {
                tracing::warn!("Unknown application status `{other}`, locking the form");
                Self::Unknown
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Admitted => "admitted",
            Self::Waitlisted => "waitlisted",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Admitted => "Admitted",
            Self::Waitlisted => "Waitlisted",
            Self::Rejected => "Rejected",
            Self::Unknown => "Unknown",
        }
    }

    /// Anything past draft locks the application for the applicant
    pub fn is_submitted(&self) -> bool {
        !matches!(self, Self::Draft)
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Draft => Self::Submitted,
            Self::Submitted => Self::Admitted,
            Self::Admitted => Self::Waitlisted,
            Self::Waitlisted => Self::Rejected,
            Self::Rejected | Self::Unknown => Self::Draft,
        }
    }
}

/// Signed-in user's profile for the current form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub status: ApplicationStatus,
    pub groups: Vec<String>,
}

/// Navigation links a user may see
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Roles {
    pub applicant: bool,
    pub admin: bool,
    pub reviewer: bool,
    pub sponsor: bool,
    pub judge: bool,
}

impl Roles {
    /// Users without a staff group are applicants
    pub fn from_groups(groups: &[String]) -> Self {
        let has = |name: &str| groups.iter().any(|g| g.eq_ignore_ascii_case(name));
        let admin = has("admin");
        let reviewer = has("reviewer");
        let sponsor = has("sponsor");
        let judge = has("judge");
        Self {
            applicant: has("applicant") || !(admin || reviewer || sponsor || judge),
            admin,
            reviewer,
            sponsor,
            judge,
        }
    }
}

/// Which auth page is shown while signed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPage {
    #[default]
    SignIn,
    SignUp,
    ForgotPassword,
    ForgotPasswordSubmit,
}

impl AuthPage {
    pub fn title(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign in",
            Self::SignUp => "Create an account",
            Self::ForgotPassword => "Forgot password",
            Self::ForgotPasswordSubmit => "Reset password",
        }
    }
}

/// Identity state
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub logged_in: bool,
    pub user_id: Option<String>,
    pub attributes: HashMap<String, String>,
    pub roles: Roles,
    pub page: AuthPage,
    /// Informational line on the auth page
    pub message: String,
    /// Error line on the auth page
    pub error: String,
}

/// Sponsor organisation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    pub name: String,
    pub admin_emails: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Editable sponsor fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SponsorInput {
    pub name: String,
    pub admin_emails: Vec<String>,
}

/// One row of the admin application table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub university: String,
    pub status: ApplicationStatus,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApplicationSummary {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Message shown above the application form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Banner {
    #[default]
    None,
    Saved,
    Submitted,
}

impl Banner {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Saved => Some(
                "Your application progress has been saved. Make sure you finalize and submit before the deadline.",
            ),
            Self::Submitted => Some(
                "Thanks for applying! Check your dashboard for updates on your application, and email us if any of the information submitted changes.",
            ),
        }
    }
}

/// Progress of a save or submit request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Done,
}

/// Tabs of the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Table,
    Stats,
    BulkStatus,
}

impl AdminTab {
    pub const ALL: [AdminTab; 3] = [Self::Table, Self::Stats, Self::BulkStatus];

    pub fn next(&self) -> Self {
        match self {
            Self::Table => Self::Stats,
            Self::Stats => Self::BulkStatus,
            Self::BulkStatus => Self::Table,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Table => "Application Table",
            Self::Stats => "View Stats",
            Self::BulkStatus => "Bulk change status",
        }
    }
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub view_params: ViewParams,
    pub view_history: Vec<(View, ViewParams)>,
    pub nav_index: usize,

    // Identity
    pub auth: AuthState,

    // Data
    /// Signed-in user's profile, shown on the dashboard
    pub profile: Option<UserProfile>,
    pub sponsors: Vec<Sponsor>,
    pub sponsor_detail: Option<Sponsor>,
    pub applications: Vec<ApplicationSummary>,

    // Selection
    pub selected_index: usize,
    pub admin_tab: AdminTab,

    // UI state
    pub scroll_offset: usize,
    pub api_connected: bool,
    /// Outstanding requests; the spinner shows while non-zero
    pub loading: usize,
    error_queue: VecDeque<String>,
    /// Blocking alert (e.g. a rejected upload), dismissed like an error
    pub alert: Option<String>,
    pub status_message: Option<String>,

    // Local forms (auth pages, sponsor and admin editors)
    pub form: FormState,
}

impl AppState {
    /// Move selection down
    pub fn move_selection_down(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up
    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Reset selection
    pub fn reset_selection(&mut self) {
        self.selected_index = 0;
        self.scroll_offset = 0;
    }

    pub fn is_loading(&self) -> bool {
        self.loading > 0
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.error_queue.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.error_queue.is_empty()
    }

    /// Error currently shown in the modal dialog
    pub fn current_error(&self) -> Option<&str> {
        self.error_queue.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.error_queue.pop_front();
    }

    /// Applications counted by status, every status present
    pub fn status_counts(&self) -> BTreeMap<ApplicationStatus, usize> {
        let mut counts: BTreeMap<_, _> = ApplicationStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for app in &self.applications {
            *counts.entry(app.status).or_default() += 1;
        }
        counts
    }

    /// Currently selected sponsor in the list
    pub fn selected_sponsor(&self) -> Option<&Sponsor> {
        self.sponsors.get(self.selected_index)
    }
}

impl Dispatch<PortalEvent> for AppState {
    fn dispatch(&mut self, event: PortalEvent) {
        match event {
            PortalEvent::LoadingStart => self.loading += 1,
            PortalEvent::LoadingEnd => self.loading = self.loading.saturating_sub(1),
            PortalEvent::Error(message) => self.push_error(message),
            PortalEvent::Notice(message) => self.status_message = Some(message),
        }
    }
}
