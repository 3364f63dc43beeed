//! Security collaborators
//!
//! Interfaces the search core consults to decide whether an object type
//! may be searched by the acting subject:
//!
//! - **Authorization**: `AuthorizationChecker` answers permission grants
//! - **Permissions**: `PermissionManager` exposes per-class permission configs
//! - **Organization**: `OrganizationalContext` tells whether an organization is active

pub mod authorization;
pub mod organization;
pub mod permission;

pub use authorization::{AuthorizationChecker, StaticAuthorization};
pub use organization::{OrganizationalContext, StaticOrganizationalContext};
pub use permission::{PermissionConfig, PermissionManager, PermissionRegistry};
