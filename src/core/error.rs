use std::fmt;

/// Errors surfaced by the navigator.
///
/// Unsaved edits are not an error: they go through the guard flow and come
/// out as `Notice::Unsaved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// A route or dependency names a module that was never registered.
    UnknownModule(String),
    /// `see` targeted a module outside the active main module's closure.
    /// Programming error: the module is missing from a `dependencies` list.
    SubmoduleNotLoaded { module: String, root: String },
    /// The same name was registered twice.
    DuplicateModule(String),
    /// An operation needed a main module before the first reconstruct.
    NoActiveModule,
    /// An operation needed a non-empty route.
    EmptyRoute,
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::UnknownModule(name) => write!(f, "unknown module '{name}'"),
            NavError::SubmoduleNotLoaded { module, root } => write!(
                f,
                "module '{module}' not loaded under '{root}'; add it to the dependencies"
            ),
            NavError::DuplicateModule(name) => write!(f, "module '{name}' registered twice"),
            NavError::NoActiveModule => write!(f, "no main module is active"),
            NavError::EmptyRoute => write!(f, "route is empty"),
        }
    }
}

impl std::error::Error for NavError {}
