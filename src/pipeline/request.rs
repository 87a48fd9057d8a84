//! What to put in a profile.

use crate::model::{CharacterRef, Event, Reference};
use serde::{Deserialize, Serialize};

/// One profile to produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub characters: Vec<CharacterRef>,

    /// An event name to look up, or an inline event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Reference<Event>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ProfileRequest {
    /// A request for `characters`, looked up by key.
    pub fn for_characters<I, S>(characters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            characters: characters
                .into_iter()
                .map(|key| Reference::Key(key.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// An empty request tied to the event `name`.
    pub fn at_event(name: &str) -> Self {
        Self {
            event: Some(Reference::Key(name.to_owned())),
            ..Self::default()
        }
    }

    /// Name of the event directory the profile is written into.
    pub fn event_name(&self) -> Option<&str> {
        match self.event.as_ref()? {
            Reference::Key(name) => Some(name),
            Reference::Inline(event) => Some(&event.name),
        }
    }
}
