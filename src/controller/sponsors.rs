//! Sponsor management

use super::bracket;
use crate::api::PortalApi;
use crate::state::{Dispatch, PortalEvent, Sponsor, SponsorInput};

pub const NAME_REQUIRED: &str = "Sponsor name is required.";

pub async fn list<A, D>(api: &mut A, dispatch: &mut D) -> Option<Vec<Sponsor>>
where
    A: PortalApi + ?Sized,
    D: Dispatch<PortalEvent>,
{
    let mut sponsors = bracket(dispatch, api.list_sponsors()).await?;
    sponsors.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    tracing::debug!("Loaded {} sponsors", sponsors.len());
    Some(sponsors)
}

pub async fn detail<A, D>(api: &mut A, dispatch: &mut D, id: &str) -> Option<Sponsor>
where
    A: PortalApi + ?Sized,
    D: Dispatch<PortalEvent>,
{
    bracket(dispatch, api.get_sponsor_detail(id)).await
}

/// Create a sponsor, or update it when `id` is given
pub async fn save<A, D>(
    api: &mut A,
    dispatch: &mut D,
    id: Option<&str>,
    input: &SponsorInput,
) -> Option<Sponsor>
where
    A: PortalApi + ?Sized,
    D: Dispatch<PortalEvent>,
{
    if input.name.trim().is_empty() {
        dispatch.dispatch(PortalEvent::Error(NAME_REQUIRED.to_string()));
        return None;
    }

    let sponsor = match id {
        Some(id) => bracket(dispatch, api.update_sponsor(id, input)).await?,
        None => bracket(dispatch, api.create_sponsor(input)).await?,
    };
    tracing::info!("Saved sponsor {} ({})", sponsor.name, sponsor.id);
    dispatch.dispatch(PortalEvent::Notice(format!("Saved sponsor {}", sponsor.name)));
    Some(sponsor)
}
