//! Application state module

mod app_state;
mod dispatch;
mod forms;
mod nav;

pub use app_state::*;
pub use dispatch::{Dispatch, PortalEvent};
pub use forms::*;
pub use nav::{nav_items, NavItem};
