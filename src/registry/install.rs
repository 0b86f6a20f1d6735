//! Install/uninstall action state for a single extension.

use std::fmt;

use super::ExtensionSummary;

/// What a front end should offer for an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    /// Not installed, idle.
    Install,
    /// Installed, idle.
    Uninstall,
    /// Not installed, an install is in flight.
    Installing,
    /// Installed, an uninstall is in flight.
    Uninstalling,
}

/// The two operations a user can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    /// Deploy the extension.
    Install,
    /// Undeploy the extension.
    Uninstall,
}

impl InstallAction {
    /// Derive the action from the host's installed state and whether an
    /// operation is currently running.
    pub fn for_state(installed: bool, busy: bool) -> Self {
        match (installed, busy) {
            (false, false) => Self::Install,
            (true, false) => Self::Uninstall,
            (false, true) => Self::Installing,
            (true, true) => Self::Uninstalling,
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Install => "Install",
            Self::Uninstall => "Uninstall",
            Self::Installing => "Installing",
            Self::Uninstalling => "Uninstalling",
        }
    }

    /// Whether a new operation may be started.
    pub fn is_actionable(self) -> bool {
        matches!(self, Self::Install | Self::Uninstall)
    }

    /// Operation triggered from this state, if any.
    pub fn kind(self) -> Option<InstallKind> {
        match self {
            Self::Install => Some(InstallKind::Install),
            Self::Uninstall => Some(InstallKind::Uninstall),
            Self::Installing | Self::Uninstalling => None,
        }
    }
}

impl fmt::Display for InstallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl InstallKind {
    /// Progress message shown while the operation runs,
    /// e.g. `Installing Language Support for Java`.
    pub fn progress_message(self, extension: &ExtensionSummary) -> String {
        let verb = match self {
            Self::Install => "Installing",
            Self::Uninstall => "Uninstalling",
        };
        format!("{verb} {}", extension.label())
    }
}
