//! Portal API access over gRPC

mod client;
mod traits;

pub use client::{PortalClient, DEFAULT_ADDRESS};
pub use traits::{AuthUser, FormSchemaDoc, IdentityProvider, PortalApi};

#[cfg(test)]
pub use traits::{MockIdentityProvider, MockPortalApi};
