//! Event dispatch
//!
//! Actions report progress and results as events instead of touching state
//! directly. The app state applies them; tests collect them in a `Vec`.

/// Something that accepts events of type `E`
pub trait Dispatch<E> {
    fn dispatch(&mut self, event: E);
}

impl<E> Dispatch<E> for Vec<E> {
    fn dispatch(&mut self, event: E) {
        self.push(event);
    }
}

/// Events raised by portal requests outside the auth pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalEvent {
    LoadingStart,
    LoadingEnd,
    /// Shown in the modal error dialog
    Error(String),
    /// Shown in the status bar
    Notice(String),
}
