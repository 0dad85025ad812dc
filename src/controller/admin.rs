//! Admin dashboard requests

use super::bracket;
use crate::api::PortalApi;
use crate::state::{ApplicationStatus, ApplicationSummary, Dispatch, PortalEvent};

pub const EMAIL_REQUIRED: &str = "Admin email is required.";
pub const USER_IDS_REQUIRED: &str = "Enter at least one user id.";

/// Create an admin account for `email`; returns the new user id
pub async fn create_admin<A, D>(api: &mut A, dispatch: &mut D, email: &str) -> Option<String>
where
    A: PortalApi + ?Sized,
    D: Dispatch<PortalEvent>,
{
    let email = email.trim();
    if email.is_empty() {
        dispatch.dispatch(PortalEvent::Error(EMAIL_REQUIRED.to_string()));
        return None;
    }
    let user_id = bracket(dispatch, api.create_admin(email)).await?;
    tracing::info!("Created admin {email}");
    dispatch.dispatch(PortalEvent::Notice(format!("Created admin {email}")));
    Some(user_id)
}

/// Applications for the table and stats tabs, most recently updated first
pub async fn applications<A, D>(
    api: &mut A,
    dispatch: &mut D,
    form_name: &str,
) -> Option<Vec<ApplicationSummary>>
where
    A: PortalApi + ?Sized,
    D: Dispatch<PortalEvent>,
{
    let mut applications = bracket(dispatch, api.list_applications(form_name)).await?;
    applications.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Some(applications)
}

pub async fn bulk_change_status<A, D>(
    api: &mut A,
    dispatch: &mut D,
    form_name: &str,
    user_ids: &[String],
    status: ApplicationStatus,
) -> Option<u32>
where
    A: PortalApi + ?Sized,
    D: Dispatch<PortalEvent>,
{
    if user_ids.is_empty() {
        dispatch.dispatch(PortalEvent::Error(USER_IDS_REQUIRED.to_string()));
        return None;
    }
    let changed = bracket(
        dispatch,
        api.bulk_change_status(form_name, user_ids, status),
    )
    .await?;
    dispatch.dispatch(PortalEvent::Notice(format!(
        "Changed {changed} application(s) to {}",
        status.label()
    )));
    Some(changed)
}
