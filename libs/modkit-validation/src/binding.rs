//! Request binding markers and their human-readable labels.

use std::fmt;

/// Declares how a handler parameter or bean field is populated from a request.
///
/// `Other` stands for any marker that does not bind request data (constraint
/// tags, documentation tags, ...). It never yields a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingMarker {
    Query(String),
    Path(String),
    Header(String),
    Cookie(String),
    Form(String),
    Matrix(String),
    Context,
    Other(String),
}

impl BindingMarker {
    /// Human label for this marker, e.g. `query param name`.
    ///
    /// Returns `None` for markers that do not describe request binding.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let (prefix, name) = match self {
            Self::Query(name) => ("query param ", name),
            Self::Path(name) => ("path param ", name),
            Self::Header(name) => ("header ", name),
            Self::Cookie(name) => ("cookie ", name),
            Self::Form(name) => ("form field ", name),
            Self::Matrix(name) => ("matrix param ", name),
            Self::Context => return Some("context".to_owned()),
            Self::Other(_) => return None,
        };
        Some(format!("{prefix}{name}"))
    }

    #[must_use]
    pub fn is_binding(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for BindingMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(name) => write!(f, "@Query({name})"),
            Self::Path(name) => write!(f, "@Path({name})"),
            Self::Header(name) => write!(f, "@Header({name})"),
            Self::Cookie(name) => write!(f, "@Cookie({name})"),
            Self::Form(name) => write!(f, "@Form({name})"),
            Self::Matrix(name) => write!(f, "@Matrix({name})"),
            Self::Context => f.write_str("@Context"),
            Self::Other(tag) => write!(f, "@{tag}"),
        }
    }
}

/// Label of the first recognized binding marker, in declaration order.
#[must_use]
pub fn describe(markers: &[BindingMarker]) -> Option<String> {
    markers.iter().find_map(BindingMarker::label)
}
