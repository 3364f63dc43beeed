//! Organizational context

/// Tells whether the current request acts on behalf of an organization
pub trait OrganizationalContext: Send + Sync {
    fn is_organization(&self) -> bool;
}

/// Organizational context with a fixed answer
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticOrganizationalContext {
    organization: bool,
}

impl StaticOrganizationalContext {
    pub fn new(organization: bool) -> Self {
        Self { organization }
    }

    pub fn organization() -> Self {
        Self::new(true)
    }

    pub fn user() -> Self {
        Self::new(false)
    }
}

impl OrganizationalContext for StaticOrganizationalContext {
    fn is_organization(&self) -> bool {
        self.organization
    }
}
