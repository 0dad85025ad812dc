//! Application form page
//!
//! Loads a named form with the applicant's answers and profile, then saves
//! and submits it. Submits are guarded so one finished submit is never sent
//! again, and each carries an idempotency key.

use crate::api::PortalApi;
use crate::schema::FormData;
use crate::state::{
    ApplicationForm, ApplicationStatus, Banner, Dispatch, PortalEvent, RequestState, UserProfile,
};
use crate::widgets::WidgetSet;
use uuid::Uuid;

/// Result of pressing a form button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent (already submitted or a request is in flight)
    Ignored,
    /// Validation failed; the error list is shown
    Invalid,
    Saved,
    Submitted,
    /// A request failed; the error was dispatched
    Failed,
}

#[derive(Debug, Default)]
pub struct FormPageController {
    pub form_name: String,
    pub profile: Option<UserProfile>,
    pub form: Option<ApplicationForm>,
    saved: bool,
    save_state: RequestState,
    submit_state: RequestState,
    idempotency_key: String,
}

impl FormPageController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load answers, profile and schema for `form_name`.
    /// Returns false when any request failed.
    pub async fn mount<A, D>(&mut self, api: &mut A, dispatch: &mut D, form_name: &str) -> bool
    where
        A: PortalApi + ?Sized,
        D: Dispatch<PortalEvent>,
    {
        *self = Self {
            form_name: form_name.to_string(),
            idempotency_key: Uuid::new_v4().to_string(),
            ..Self::default()
        };
        tracing::info!("Loading form {form_name}");

        dispatch.dispatch(PortalEvent::LoadingStart);
        let loaded = Self::load(api, form_name).await;
        dispatch.dispatch(PortalEvent::LoadingEnd);

        match loaded {
            Ok((data, profile, doc)) => {
                self.form = Some(ApplicationForm::new(
                    &doc.schema,
                    &doc.ui_schema,
                    doc.shown_fields.as_deref(),
                    data,
                    profile.status,
                ));
                self.profile = Some(profile);
                true
            }
            Err(e) => {
                dispatch.dispatch(PortalEvent::Error(e.to_string()));
                false
            }
        }
    }

    async fn load<A>(
        api: &mut A,
        form_name: &str,
    ) -> anyhow::Result<(FormData, UserProfile, crate::api::FormSchemaDoc)>
    where
        A: PortalApi + ?Sized,
    {
        let data = api.load_data(form_name).await?;
        let profile = api.get_user_profile().await?;
        let doc = api.get_form_schema(form_name).await?;
        Ok((data, profile, doc))
    }

    pub fn status(&self) -> ApplicationStatus {
        self.profile
            .as_ref()
            .map(|p| p.status)
            .unwrap_or_default()
    }

    pub fn widget_set(&self) -> WidgetSet {
        WidgetSet::for_status(self.status())
    }

    pub fn banner(&self) -> Banner {
        if self.status() == ApplicationStatus::Submitted {
            Banner::Submitted
        } else if self.saved {
            Banner::Saved
        } else {
            Banner::None
        }
    }

    fn is_busy(&self) -> bool {
        self.save_state == RequestState::InFlight || self.submit_state == RequestState::InFlight
    }

    /// Save the answers and, when `submit` is set, validate and submit them
    pub async fn on_save<A, D>(&mut self, api: &mut A, dispatch: &mut D, submit: bool) -> SubmitOutcome
    where
        A: PortalApi + ?Sized,
        D: Dispatch<PortalEvent>,
    {
        if self.is_busy() || (submit && self.submit_state == RequestState::Done) {
            tracing::debug!("Ignoring form button while a request is pending or done");
            return SubmitOutcome::Ignored;
        }
        let already_submitted = self.status().is_submitted();
        let Some(form) = self.form.as_mut() else {
            return SubmitOutcome::Ignored;
        };
        if already_submitted {
            return SubmitOutcome::Ignored;
        }

        if submit && !form.validate() {
            return SubmitOutcome::Invalid;
        }
        if !submit {
            form.errors.clear();
        }

        self.save_state = RequestState::InFlight;
        dispatch.dispatch(PortalEvent::LoadingStart);
        let saved = api.save_data(&self.form_name, &form.data).await;
        dispatch.dispatch(PortalEvent::LoadingEnd);
        self.save_state = RequestState::Idle;
        if let Err(e) = saved {
            dispatch.dispatch(PortalEvent::Error(e.to_string()));
            return SubmitOutcome::Failed;
        }

        if !submit {
            self.saved = true;
            form.scroll_offset = 0;
            return SubmitOutcome::Saved;
        }

        self.submit_state = RequestState::InFlight;
        dispatch.dispatch(PortalEvent::LoadingStart);
        let submitted = api.submit_form(&self.form_name, &self.idempotency_key).await;
        dispatch.dispatch(PortalEvent::LoadingEnd);

        match submitted {
            Ok(status) => {
                tracing::info!("Submitted {} with status {}", self.form_name, status.as_str());
                // The applicant's status is submitted even if the API echoes a draft
                let status = if status.is_submitted() {
                    status
                } else {
                    ApplicationStatus::Submitted
                };
                self.submit_state = RequestState::Done;
                self.saved = false;
                form.set_status(status);
                if let Some(profile) = self.profile.as_mut() {
                    profile.status = status;
                }
                SubmitOutcome::Submitted
            }
            Err(e) => {
                self.submit_state = RequestState::Idle;
                dispatch.dispatch(PortalEvent::Error(e.to_string()));
                SubmitOutcome::Failed
            }
        }
    }
}
