//! Page controllers: portal requests behind each view

pub mod admin;
pub mod form_page;
pub mod sponsors;

pub use form_page::{FormPageController, SubmitOutcome};

use crate::api::PortalApi;
use crate::state::{Dispatch, PortalEvent, UserProfile};
use std::future::Future;

/// Profile of the signed-in user for the dashboard
pub async fn load_profile<A, D>(api: &mut A, dispatch: &mut D) -> Option<UserProfile>
where
    A: PortalApi + ?Sized,
    D: Dispatch<PortalEvent>,
{
    bracket(dispatch, api.get_user_profile()).await
}

/// Await one request between `LoadingStart`/`LoadingEnd`, dispatching its error
async fn bracket<D, T, F>(dispatch: &mut D, request: F) -> Option<T>
where
    D: Dispatch<PortalEvent>,
    F: Future<Output = anyhow::Result<T>>,
{
    dispatch.dispatch(PortalEvent::LoadingStart);
    let result = request.await;
    dispatch.dispatch(PortalEvent::LoadingEnd);
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            dispatch.dispatch(PortalEvent::Error(e.to_string()));
            None
        }
    }
}
