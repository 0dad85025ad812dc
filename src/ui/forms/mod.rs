//! Form rendering
//!
//! - `field_renderer`: boxed local-form fields and schema field rows
//! - `application_form`: the schema-driven application page
//! - `local_form`: auth pages, sponsor and admin editors

mod application_form;
mod field_renderer;
mod local_form;

pub use application_form::draw as draw_application_form;
pub use local_form::draw_local_form;
