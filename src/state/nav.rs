//! Navigation bar entries per role

use super::app_state::{Roles, View, ViewParams};
use crate::config::TRAVEL_FORM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Dashboard,
    Application,
    Travel,
    Admin,
    Sponsors,
    CreateAdmin,
    LogOut,
}

impl NavItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Application => "application",
            Self::Travel => "travel",
            Self::Admin => "admin",
            Self::Sponsors => "sponsors",
            Self::CreateAdmin => "new admin",
            Self::LogOut => "log out",
        }
    }

    /// Destination view; `None` for log out.
    /// `application_form` is the form behind the application page.
    pub fn target(&self, application_form: &str) -> Option<(View, ViewParams)> {
        match self {
            Self::Dashboard => Some((View::Dashboard, ViewParams::default())),
            Self::Application => Some((View::Form, ViewParams::form(application_form))),
            Self::Travel => Some((View::Form, ViewParams::form(TRAVEL_FORM))),
            Self::Admin => Some((View::Admin, ViewParams::default())),
            Self::Sponsors => Some((View::Sponsors, ViewParams::default())),
            Self::CreateAdmin => Some((View::AdminCreate, ViewParams::default())),
            Self::LogOut => None,
        }
    }

    /// Whether this entry is the active one for `view`
    pub fn is_active(&self, view: &View, params: &ViewParams, application_form: &str) -> bool {
        match self {
            Self::Application => {
                *view == View::Form && params.form_name.as_deref() == Some(application_form)
            }
            Self::Travel => *view == View::Form && params.form_name.as_deref() == Some(TRAVEL_FORM),
            Self::Sponsors => matches!(
                view,
                View::Sponsors | View::SponsorDetail | View::SponsorEdit
            ),
            Self::LogOut => false,
            _ => self
                .target(application_form)
                .is_some_and(|(v, _)| v == *view),
        }
    }
}

/// Entries shown for the signed-in user's roles
pub fn nav_items(roles: &Roles, show_travel: bool) -> Vec<NavItem> {
    let mut items = Vec::new();
    if roles.applicant {
        items.push(NavItem::Dashboard);
        items.push(NavItem::Application);
        if show_travel {
            items.push(NavItem::Travel);
        }
    }
    if roles.admin {
        items.push(NavItem::Admin);
    }
    if roles.sponsor || roles.admin {
        items.push(NavItem::Sponsors);
    }
    if roles.admin {
        items.push(NavItem::CreateAdmin);
    }
    items.push(NavItem::LogOut);
    items
}
