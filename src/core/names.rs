//! Names used as keys throughout the transition tables.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a string as a name.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_name! {
    /// Name of a state, as stored in a record's state field.
    StateName
}

string_name! {
    /// Name of an action dispatched against a state-bearing value.
    EventName
}

string_name! {
    /// Identity of a compiled rule-set.
    RuleSetId
}

/// Event key of a transition: either a concrete event or the wildcard.
///
/// Named events order before [`Event::Any`], so iterating a table slice for
/// one state yields exact matches first and the wildcard last.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Event {
    Named(EventName),
    Any,
}

impl Event {
    pub fn named(name: impl Into<EventName>) -> Self {
        Self::Named(name.into())
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn as_named(&self) -> Option<&EventName> {
        match self {
            Self::Named(name) => Some(name),
            Self::Any => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name.as_str()),
            Self::Any => f.write_str("*"),
        }
    }
}

impl From<&str> for Event {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<EventName> for Event {
    fn from(name: EventName) -> Self {
        Self::Named(name)
    }
}
