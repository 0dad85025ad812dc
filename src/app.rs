//! Application state and core logic

use crate::api::PortalClient;
use crate::auth::{self, AuthEvent, SessionStore};
use crate::config::PortalConfig;
use crate::controller::{self, admin, sponsors, FormPageController, SubmitOutcome};
use crate::platform::COPY_MODIFIER;
use crate::state::{
    nav_items, AdminCreateForm, AdminTab, AppState, AuthPage, BulkStatusForm, Dispatch, FormButton,
    FormState, NavItem, SponsorForm, View, ViewParams,
};
use crate::widgets::{WidgetError, WidgetInput, NOT_PDF_ALERT};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Window for the second Ctrl+C press
const QUIT_WINDOW: Duration = Duration::from_secs(1);

/// Outcome of a key press in a local form
#[derive(Debug, PartialEq, Eq)]
enum LocalFormKey {
    Handled,
    Submit,
    Cancel,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Portal and identity client
    pub api: PortalClient,
    pub config: PortalConfig,
    /// The open application form, if any
    pub form_page: FormPageController,
    /// Identity provider session cache
    cache: SessionStore,
    /// Client-side preferences, cleared on sign out
    local: SessionStore,
    /// Whether the app should quit
    quit: bool,
    /// Copy feedback message
    pub copy_message: Option<String>,
    /// Timestamp of last Ctrl+C press for double-tap quit
    pub last_ctrl_c: Option<Instant>,
}

impl App {
    /// Create a new App instance and resume any cached session
    pub async fn new() -> Result<Self> {
        let config = PortalConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {e:#}");
            PortalConfig::default()
        });
        let api = PortalClient::new(&config.api_address).await?;
        let (cache, local) = match PortalConfig::data_dir() {
            Some(dir) => (
                SessionStore::open(&dir.join("session.json")),
                SessionStore::open(&dir.join("local.json")),
            ),
            None => (SessionStore::in_memory(), SessionStore::in_memory()),
        };

        let mut app = Self::with_parts(api, config, cache, local);
        app.state.api_connected = app.api.is_connected();
        tracing::info!(
            "Portal API {} ({})",
            app.api.address(),
            if app.state.api_connected { "connected" } else { "offline" }
        );

        auth::restore_session(&mut app.api, &app.cache, &mut app.state).await;
        if app.state.auth.logged_in {
            app.after_login().await;
        }
        Ok(app)
    }

    /// Assemble an app from its parts, showing the sign-in page
    pub fn with_parts(
        api: PortalClient,
        config: PortalConfig,
        cache: SessionStore,
        local: SessionStore,
    ) -> Self {
        let mut state = AppState::default();
        let last_email = local.get_item("lastEmail").unwrap_or_default();
        state.form = auth::form_for_page(AuthPage::SignIn, last_email);

        Self {
            state,
            api,
            config,
            form_page: FormPageController::new(),
            cache,
            local,
            quit: false,
            copy_message: None,
            last_ctrl_c: None,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Navigation entries for the signed-in user
    pub fn nav_items(&self) -> Vec<NavItem> {
        if !self.state.auth.logged_in {
            return Vec::new();
        }
        nav_items(&self.state.auth.roles, self.config.show_travel)
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Blocking alert (modal)
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.alert = None;
            }
            return Ok(());
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_ctrl_c();
            return Ok(());
        }

        // Clear any status messages on key press
        self.copy_message = None;
        self.state.status_message = None;

        // Navigation bar shortcuts (F1, F2, ...)
        if let KeyCode::F(n) = key.code {
            let index = usize::from(n).checked_sub(1);
            let item = index.and_then(|i| self.nav_items().get(i).copied());
            if let (Some(index), Some(item)) = (index, item) {
                self.state.nav_index = index;
                self.select_nav_item(item).await;
            }
            return Ok(());
        }

        match self.state.current_view {
            View::Auth => self.handle_auth_key(key).await,
            View::Dashboard => self.handle_dashboard_key(key).await,
            View::Form => self.handle_form_key(key).await,
            View::Admin => self.handle_admin_key(key).await,
            View::Sponsors => self.handle_sponsors_key(key).await,
            View::SponsorDetail => self.handle_sponsor_detail_key(key),
            View::SponsorEdit => self.handle_sponsor_edit_key(key).await,
            View::AdminCreate => self.handle_admin_create_key(key).await,
        }
        self.state.api_connected = self.api.is_connected();
        Ok(())
    }

    fn handle_ctrl_c(&mut self) {
        let now = Instant::now();
        match self.last_ctrl_c {
            Some(last) if now.duration_since(last) < QUIT_WINDOW => self.quit = true,
            _ => {
                self.last_ctrl_c = Some(now);
                self.copy_message = Some("Press Ctrl+C again to quit".to_string());
            }
        }
    }

    /// Navigate to a new view
    pub fn navigate(&mut self, view: View, params: ViewParams) {
        self.state.view_history.push((
            self.state.current_view.clone(),
            self.state.view_params.clone(),
        ));
        self.state.current_view = view;
        self.state.view_params = params;
        self.state.reset_selection();
    }

    /// Go back to previous view
    pub fn go_back(&mut self) {
        // Skip form views in history to go back to the last non-form view
        while let Some((view, params)) = self.state.view_history.pop() {
            if view.is_form_view() {
                continue;
            }
            self.state.current_view = view;
            self.state.view_params = params;
            self.state.form = FormState::None;
            if self.state.current_view == View::Admin {
                self.set_admin_tab(self.state.admin_tab);
            }
            return;
        }
    }

    /// Navigate and load what the view shows
    pub async fn open(&mut self, view: View, params: ViewParams) {
        self.navigate(view.clone(), params.clone());
        self.state.form = FormState::None;

        match view {
            View::Auth => {}
            View::Dashboard => {
                if let Some(profile) = controller::load_profile(&mut self.api, &mut self.state).await
                {
                    self.state.profile = Some(profile);
                }
            }
            View::Form => {
                let form_name = params
                    .form_name
                    .unwrap_or_else(|| self.config.form_name.clone());
                self.form_page
                    .mount(&mut self.api, &mut self.state, &form_name)
                    .await;
            }
            View::Admin => {
                if self.state.admin_tab == AdminTab::BulkStatus {
                    self.state.form = FormState::BulkStatus(BulkStatusForm::new());
                }
                self.refresh_applications().await;
            }
            View::Sponsors => self.refresh_sponsors().await,
            View::SponsorDetail => {
                self.state.sponsor_detail = None;
                if let Some(id) = params.sponsor_id {
                    self.state.sponsor_detail =
                        sponsors::detail(&mut self.api, &mut self.state, &id).await;
                }
            }
            View::SponsorEdit => {
                let form = match (&params.sponsor_id, &self.state.sponsor_detail) {
                    (Some(id), Some(sponsor)) if sponsor.id == *id => {
                        SponsorForm::from_sponsor(sponsor)
                    }
                    _ => SponsorForm::new(),
                };
                self.state.form = FormState::Sponsor(form);
            }
            View::AdminCreate => {
                self.state.form = FormState::AdminCreate(AdminCreateForm::new());
            }
        }
    }

    async fn refresh_applications(&mut self) {
        let form_name = self.config.form_name.clone();
        if let Some(apps) = admin::applications(&mut self.api, &mut self.state, &form_name).await {
            self.state.applications = apps;
            let len = self.state.applications.len();
            if self.state.selected_index >= len {
                self.state.selected_index = len.saturating_sub(1);
            }
        }
    }

    async fn refresh_sponsors(&mut self) {
        if let Some(list) = sponsors::list(&mut self.api, &mut self.state).await {
            self.state.sponsors = list;
            let len = self.state.sponsors.len();
            if self.state.selected_index >= len {
                self.state.selected_index = len.saturating_sub(1);
            }
        }
    }

    async fn select_nav_item(&mut self, item: NavItem) {
        match item.target(&self.config.form_name) {
            Some((view, params)) => {
                // Leaving the nav history flat: each entry starts a fresh trail
                self.state.view_history.clear();
                self.open(view, params).await;
            }
            None => self.logout().await,
        }
    }

    async fn logout(&mut self) {
        auth::logout(&mut self.api, &mut self.cache, &mut self.local, &mut self.state).await;
        if !self.state.auth.logged_in {
            self.form_page = FormPageController::new();
            self.state.profile = None;
            self.state.sponsors.clear();
            self.state.sponsor_detail = None;
            self.state.applications.clear();
        }
    }

    /// Pick the landing view for the signed-in roles
    async fn after_login(&mut self) {
        let roles = self.state.auth.roles;
        let view = if roles.applicant {
            View::Dashboard
        } else if roles.admin {
            View::Admin
        } else if roles.sponsor {
            View::Sponsors
        } else {
            View::Dashboard
        };
        self.state.view_history.clear();
        self.open(view, ViewParams::default()).await;
        self.state.view_history.clear();
    }

    // ---- local forms ----

    fn handle_local_form_key(&mut self, key: KeyEvent) -> LocalFormKey {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let form = &mut self.state.form;
        match key.code {
            KeyCode::Esc => return LocalFormKey::Cancel,
            KeyCode::Char('s') if ctrl => return LocalFormKey::Submit,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Enter => {
                if form.is_buttons_row_active() {
                    return LocalFormKey::Submit;
                }
                if form.is_active_field_multiline() {
                    if let Some(field) = form.get_active_field_mut() {
                        field.push_char('\n');
                    }
                } else {
                    form.next_field();
                }
            }
            KeyCode::Left | KeyCode::Right => {
                if let Some(field) = form.get_active_field_mut() {
                    field.cycle(key.code == KeyCode::Right);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = form.get_active_field_mut() {
                    field.pop_char();
                }
            }
            KeyCode::Char(c) if !ctrl => {
                if let Some(field) = form.get_active_field_mut() {
                    field.push_char(c);
                }
            }
            _ => {}
        }
        LocalFormKey::Handled
    }

    // ---- auth pages ----

    fn set_auth_page(&mut self, page: AuthPage) {
        self.state.dispatch(AuthEvent::SetAuthPage {
            page,
            message: String::new(),
            error: String::new(),
        });
    }

    async fn handle_auth_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => return self.set_auth_page(AuthPage::SignUp),
                KeyCode::Char('f') => return self.set_auth_page(AuthPage::ForgotPassword),
                KeyCode::Char('b') => return self.set_auth_page(AuthPage::SignIn),
                _ => {}
            }
        }

        match self.handle_local_form_key(key) {
            LocalFormKey::Submit => self.submit_auth_form().await,
            LocalFormKey::Cancel => {
                if self.state.auth.page != AuthPage::SignIn {
                    self.set_auth_page(AuthPage::SignIn);
                }
            }
            LocalFormKey::Handled => {}
        }
    }

    async fn submit_auth_form(&mut self) {
        self.state.auth.error.clear();
        match self.state.form.clone() {
            FormState::SignIn(form) => {
                auth::sign_in(
                    &mut self.api,
                    &mut self.cache,
                    &mut self.local,
                    &mut self.state,
                    &form.to_input(),
                )
                .await;
                if self.state.auth.logged_in {
                    self.after_login().await;
                }
            }
            FormState::SignUp(form) => {
                let url = self.config.confirmation_url.clone();
                auth::sign_up(&mut self.api, &mut self.state, &form.to_input(), &url).await;
            }
            FormState::ForgotPassword(form) => {
                auth::forgot_password(&mut self.api, &mut self.state, &form.to_input()).await;
            }
            FormState::ForgotPasswordSubmit(form) => {
                auth::forgot_password_submit(&mut self.api, &mut self.state, &form.to_input())
                    .await;
            }
            _ => {}
        }
    }

    // ---- dashboard ----

    async fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter if self.state.auth.roles.applicant => {
                let params = ViewParams::form(&self.config.form_name);
                self.open(View::Form, params).await;
            }
            KeyCode::Char('r') => {
                if let Some(profile) = controller::load_profile(&mut self.api, &mut self.state).await
                {
                    self.state.profile = Some(profile);
                }
            }
            _ => {}
        }
    }

    // ---- application form ----

    async fn handle_form_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shortcut = key.modifiers.contains(COPY_MODIFIER);
        let date_format = self.config.date_format.clone();

        match key.code {
            KeyCode::Char('s') if ctrl => return self.save_form(false).await,
            KeyCode::Char('d') if shortcut => return self.save_form(true).await,
            KeyCode::Char('y') if shortcut => return self.copy_focused_link(),
            KeyCode::Esc => return self.go_back(),
            _ => {}
        }

        let Some(form) = self.form_page.form.as_mut() else {
            return;
        };

        if form.is_buttons_row_active() {
            match key.code {
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                KeyCode::Left | KeyCode::Right => form.button = form.button.toggle(),
                KeyCode::Enter => {
                    let submit = form.button == FormButton::Submit;
                    self.save_form(submit).await;
                }
                _ => {}
            }
            return;
        }

        let Some(widget) = form.active_entry().map(|e| e.widget) else {
            match key.code {
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                _ => {}
            }
            return;
        };

        let mut upload = Ok(());
        let input = match key.code {
            KeyCode::Tab => {
                form.next_field();
                None
            }
            KeyCode::BackTab => {
                form.prev_field();
                None
            }
            KeyCode::Down | KeyCode::Up => {
                let down = key.code == KeyCode::Down;
                if !form.move_cursor(down) {
                    if down {
                        form.next_field();
                    } else {
                        form.prev_field();
                    }
                }
                None
            }
            KeyCode::Enter if widget.takes_pending_input() => {
                if !form.pending.trim().is_empty() {
                    upload = form.upload_pending();
                }
                None
            }
            KeyCode::Enter if widget.is_multiline() => Some(WidgetInput::Newline),
            KeyCode::Enter if widget.toggles_on_space() || form.cursor_len() > 0 => {
                Some(WidgetInput::Toggle)
            }
            KeyCode::Enter => {
                form.next_field();
                None
            }
            KeyCode::Char(' ') if widget.toggles_on_space() => Some(WidgetInput::Toggle),
            KeyCode::Char(c) if !ctrl && !shortcut && widget.takes_pending_input() => {
                form.pending.push(c);
                None
            }
            KeyCode::Backspace if widget.takes_pending_input() => {
                form.pending.pop();
                None
            }
            KeyCode::Char(c) if !ctrl && !shortcut => Some(WidgetInput::Char(c)),
            KeyCode::Backspace => Some(WidgetInput::Backspace),
            _ => None,
        };

        let result = match input {
            Some(input) => form.apply_input(input, &date_format),
            None => upload,
        };
        self.handle_widget_result(result);
    }

    fn handle_widget_result(&mut self, result: std::result::Result<(), WidgetError>) {
        match result {
            Ok(()) => {}
            Err(WidgetError::NotPdf) => self.state.alert = Some(NOT_PDF_ALERT.to_string()),
            Err(e) => self.state.push_error(e.to_string()),
        }
    }

    async fn save_form(&mut self, submit: bool) {
        let outcome = self
            .form_page
            .on_save(&mut self.api, &mut self.state, submit)
            .await;
        tracing::debug!("Form button outcome: {outcome:?}");
        if outcome == SubmitOutcome::Submitted {
            self.state.profile = self.form_page.profile.clone();
            self.state.view_history.clear();
            self.open(View::Dashboard, ViewParams::default()).await;
        }
    }

    fn copy_focused_link(&mut self) {
        let date_format = self.config.date_format.as_str();
        let link = self.form_page.form.as_ref().and_then(|form| {
            let entry = form.active_entry()?;
            let props = form.props(form.active, date_format)?;
            entry.widget.focused_link(&props)
        });
        let Some(link) = link else {
            return;
        };
        match self.copy_to_clipboard(&link.href) {
            Ok(()) => self.copy_message = Some(format!("Copied {}", link.href)),
            Err(e) => self.state.push_error(format!("Failed to copy link: {e}")),
        }
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        use arboard::Clipboard;
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }

    // ---- admin ----

    fn set_admin_tab(&mut self, tab: AdminTab) {
        self.state.admin_tab = tab;
        self.state.form = if tab == AdminTab::BulkStatus {
            FormState::BulkStatus(BulkStatusForm::new())
        } else {
            FormState::None
        };
    }

    async fn handle_admin_key(&mut self, key: KeyEvent) {
        if self.state.admin_tab == AdminTab::BulkStatus {
            match self.handle_local_form_key(key) {
                LocalFormKey::Submit => self.submit_bulk_status().await,
                LocalFormKey::Cancel => self.set_admin_tab(AdminTab::Table),
                LocalFormKey::Handled => {}
            }
            return;
        }

        match key.code {
            KeyCode::Tab => self.set_admin_tab(self.state.admin_tab.next()),
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.state.applications.len();
                self.state.move_selection_down(len);
            }
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection_up(),
            KeyCode::Char('r') => self.refresh_applications().await,
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    async fn submit_bulk_status(&mut self) {
        let FormState::BulkStatus(form) = &self.state.form else {
            return;
        };
        let ids = form.user_ids();
        let status = form.target_status();
        let form_name = self.config.form_name.clone();
        let changed =
            admin::bulk_change_status(&mut self.api, &mut self.state, &form_name, &ids, status)
                .await;
        if changed.is_some() {
            self.state.form = FormState::BulkStatus(BulkStatusForm::new());
            self.refresh_applications().await;
        }
    }

    async fn handle_admin_create_key(&mut self, key: KeyEvent) {
        match self.handle_local_form_key(key) {
            LocalFormKey::Submit => {
                let FormState::AdminCreate(form) = &self.state.form else {
                    return;
                };
                let email = form.email().to_string();
                if admin::create_admin(&mut self.api, &mut self.state, &email)
                    .await
                    .is_some()
                {
                    self.state.form = FormState::AdminCreate(AdminCreateForm::new());
                }
            }
            LocalFormKey::Cancel => self.go_back(),
            LocalFormKey::Handled => {}
        }
    }

    // ---- sponsors ----

    async fn handle_sponsors_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.state.sponsors.len();
                self.state.move_selection_down(len);
            }
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection_up(),
            KeyCode::Enter => {
                if let Some(id) = self.state.selected_sponsor().map(|s| s.id.clone()) {
                    self.open(View::SponsorDetail, ViewParams::sponsor(&id)).await;
                }
            }
            KeyCode::Char('n') if self.state.auth.roles.admin => {
                self.open(View::SponsorEdit, ViewParams::default()).await;
            }
            KeyCode::Char('r') => self.refresh_sponsors().await,
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn handle_sponsor_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('e') => {
                if let Some(sponsor) = &self.state.sponsor_detail {
                    let params = ViewParams::sponsor(&sponsor.id);
                    let form = SponsorForm::from_sponsor(sponsor);
                    self.navigate(View::SponsorEdit, params);
                    self.state.form = FormState::Sponsor(form);
                }
            }
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    async fn handle_sponsor_edit_key(&mut self, key: KeyEvent) {
        match self.handle_local_form_key(key) {
            LocalFormKey::Submit => {
                let FormState::Sponsor(form) = &self.state.form else {
                    return;
                };
                let id = form.sponsor_id.clone();
                let input = form.to_input();
                let saved =
                    sponsors::save(&mut self.api, &mut self.state, id.as_deref(), &input).await;
                if let Some(sponsor) = saved {
                    self.state.sponsor_detail = Some(sponsor);
                    self.go_back();
                    self.refresh_sponsors().await;
                }
            }
            LocalFormKey::Cancel => self.go_back(),
            LocalFormKey::Handled => {}
        }
    }
}
