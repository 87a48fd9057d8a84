//! Record and resolved-entity types.
//!
//! Every entity kind exists in two shapes:
//!
//! - a **record** (`CharacterRecord`, `MakerRecord`, `ContactRecord`), the
//!   on-disk JSON shape where reference fields may be bare string keys and
//!   every field may be missing;
//! - a **resolved entity** (`Character`, `Maker`, `Performer`), the
//!   in-memory shape the renderer consumes, where references have been
//!   looked up and missing fields filled in.
//!
//! References between records are a [`Reference`]: either a key to look up
//! or an inline object. A reference that could not be found is kept as a
//! [`Resolved::Name`] so the original text can still be displayed.
//!
//! Resolved `Performer` and `Maker` values carry no reference fields of their
//! own. This is what bounds resolution: a performer is expanded exactly one
//! hop, and a maker's `is` back-reference is dropped on conversion.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Raw site handles keyed by site identifier, in authoring order.
pub type SiteMap = IndexMap<String, String>;

/// Tag appended to characters loaded from the character store.
pub const FURSUIT_TAG: &str = "fursuit";

/// Either a key naming another record, or that record written inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Key(String),
    Inline(T),
}

/// A field that accepts either a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// The result of resolving a reference: the entity, or the original text
/// when no record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resolved<T> {
    Entity(T),
    Name(String),
}

impl<T> Resolved<T> {
    pub fn entity(&self) -> Option<&T> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Name(_) => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Records
// ----------------------------------------------------------------------------

/// Contact fields shared by characters, performers and makers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<SiteMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbr: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale: Option<Vec<String>>,
}

/// On-disk character. Also the common base shape when a character lookup
/// lands in the performer or maker store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    #[serde(flatten)]
    pub contact: ContactRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker: Option<OneOrMany<Reference<MakerRecord>>>,
    /// A performer may itself be written as a character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer: Option<Reference<Box<CharacterRecord>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<OneOrMany<Reference<Species>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl From<ContactRecord> for CharacterRecord {
    fn from(contact: ContactRecord) -> Self {
        Self {
            contact,
            ..Self::default()
        }
    }
}

impl From<MakerRecord> for CharacterRecord {
    fn from(maker: MakerRecord) -> Self {
        Self {
            contact: maker.contact,
            tags: maker.tags,
            ..Self::default()
        }
    }
}

/// On-disk maker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakerRecord {
    #[serde(flatten)]
    pub contact: ContactRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// The maker's personal identity. Never followed during resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is: Option<Reference<Box<CharacterRecord>>>,
}

/// A species. Records and resolved values share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A convention or other event a photo was taken at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Event {
    /// The event used when no record exists: tagged with its own name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            tags: vec![name.to_owned()],
            ..Self::default()
        }
    }

    /// Use `key` as the name of a record stored without one.
    pub fn or_named(mut self, key: &str) -> Self {
        if self.name.is_empty() {
            key.clone_into(&mut self.name);
        }
        self
    }

    pub fn has_location(&self) -> bool {
        self.country.is_some() || self.province.is_some() || self.city.is_some()
    }
}

/// A character request: a lookup key plus fields overriding the stored
/// record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub record: CharacterRecord,
    /// Tags appended after the (overridden or stored) tag list.
    #[serde(
        rename = "addTags",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub add_tags: Option<Vec<String>>,
}

impl CharacterOverride {
    /// The lookup key: `key`, else `id`. Empty strings count as absent.
    pub fn lookup_key(&self) -> Option<&str> {
        [&self.key, &self.id]
            .into_iter()
            .find_map(|k| k.as_deref().filter(|k| !k.is_empty()))
    }
}

/// How callers name a character: a bare key, or a key plus overrides.
pub type CharacterRef = Reference<CharacterOverride>;

impl CharacterRef {
    /// A `key` reference with its performer replaced.
    pub fn with_performer(key: &str, performer: &str) -> Self {
        Self::Inline(CharacterOverride {
            key: Some(key.to_owned()),
            record: CharacterRecord {
                performer: Some(Reference::Key(performer.to_owned())),
                ..CharacterRecord::default()
            },
            ..CharacterOverride::default()
        })
    }
}

// ----------------------------------------------------------------------------
// Resolved entities
// ----------------------------------------------------------------------------

/// Anything with a display name and site handles.
pub trait Contactable {
    fn name(&self) -> Option<&str>;
    fn on(&self) -> &SiteMap;
    fn stale(&self) -> &[String];
}

/// A resolved performer. Holds contact data only; a performer's own
/// performer is never expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Performer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub on: SiteMap,
    pub abbr: Vec<String>,
    pub stale: Vec<String>,
}

impl From<ContactRecord> for Performer {
    fn from(contact: ContactRecord) -> Self {
        Self {
            name: contact.name,
            on: contact.on.unwrap_or_default(),
            abbr: contact.abbr.unwrap_or_default(),
            stale: contact.stale.unwrap_or_default(),
        }
    }
}

impl From<CharacterRecord> for Performer {
    fn from(record: CharacterRecord) -> Self {
        record.contact.into()
    }
}

impl Contactable for Performer {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn on(&self) -> &SiteMap {
        &self.on
    }
    fn stale(&self) -> &[String] {
        &self.stale
    }
}

/// A resolved maker: exactly name, contact fields and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Maker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub on: SiteMap,
    pub abbr: Vec<String>,
    pub stale: Vec<String>,
    pub tags: Vec<String>,
}

impl From<MakerRecord> for Maker {
    fn from(record: MakerRecord) -> Self {
        let MakerRecord { contact, tags, is: _ } = record;
        Self {
            name: contact.name,
            on: contact.on.unwrap_or_default(),
            abbr: contact.abbr.unwrap_or_default(),
            stale: contact.stale.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
        }
    }
}

impl Contactable for Maker {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn on(&self) -> &SiteMap {
        &self.on
    }
    fn stale(&self) -> &[String] {
        &self.stale
    }
}

/// A fully resolved character, ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Character {
    /// The key this character was looked up by, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: String,
    pub on: SiteMap,
    pub abbr: Vec<String>,
    pub stale: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub maker: Vec<Resolved<Maker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Resolved<Performer>>,
    pub species: Vec<Resolved<Species>>,
    pub tags: Vec<String>,
}

impl Character {
    /// A character with only a name, as used by tests and callers building
    /// entities by hand.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// The lookup key, falling back to the display name.
    pub fn key_or_name(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

impl Contactable for Character {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
    fn on(&self) -> &SiteMap {
        &self.on
    }
    fn stale(&self) -> &[String] {
        &self.stale
    }
}

/// Deduplicate tags in first-occurrence order, dropping empty strings.
pub fn dedup_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .filter(|tag| !tag.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_record_accepts_string_and_inline_references() {
        let json = r#"{
            "name": "Fizz",
            "on": {"fa": "fizz_buzz", "twitter": "@fizz"},
            "maker": ["Some Maker", {"name": "Inline Maker", "tags": ["toony"]}],
            "performer": "alex",
            "species": "fox",
            "tags": ["orange"]
        }"#;
        let record: CharacterRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.contact.name.as_deref(), Some("Fizz"));
        let on = record.contact.on.as_ref().unwrap();
        assert_eq!(on.keys().collect::<Vec<_>>(), ["fa", "twitter"]);
        assert_eq!(record.performer, Some(Reference::Key("alex".to_owned())));

        let makers = record.maker.unwrap().into_vec();
        assert_eq!(makers.len(), 2);
        assert_eq!(makers[0], Reference::Key("Some Maker".to_owned()));
        let Reference::Inline(inline) = &makers[1] else {
            panic!("second maker should be inline");
        };
        assert_eq!(inline.contact.name.as_deref(), Some("Inline Maker"));

        let species = record.species.unwrap().into_vec();
        assert_eq!(species, vec![Reference::Key("fox".to_owned())]);
    }

    #[test]
    fn test_inline_performer_may_be_a_character() {
        let json = r#"{"performer": {"name": "Alex", "performer": "someone-else"}}"#;
        let record: CharacterRecord = serde_json::from_str(json).unwrap();
        let Some(Reference::Inline(performer)) = record.performer else {
            panic!("performer should be inline");
        };
        assert_eq!(
            performer.performer,
            Some(Reference::Key("someone-else".to_owned()))
        );
    }

    #[test]
    fn test_override_reads_add_tags_and_id() {
        let json = r#"{"id": "fizz", "addTags": ["badge"], "gender": "male"}"#;
        let over: CharacterOverride = serde_json::from_str(json).unwrap();
        assert_eq!(over.lookup_key(), Some("fizz"));
        assert_eq!(over.add_tags, Some(vec!["badge".to_owned()]));
        assert_eq!(over.record.gender.as_deref(), Some("male"));
    }

    #[test]
    fn test_empty_key_falls_through_to_id() {
        let over: CharacterOverride = serde_json::from_str(r#"{"key": "", "id": "fizz"}"#).unwrap();
        assert_eq!(over.lookup_key(), Some("fizz"));

        let over: CharacterOverride = serde_json::from_str(r#"{"key": "", "id": ""}"#).unwrap();
        assert_eq!(over.lookup_key(), None);
    }

    #[test]
    fn test_character_ref_from_bare_string() {
        let reference: CharacterRef = serde_json::from_str(r#""fizz""#).unwrap();
        assert_eq!(reference, Reference::Key("fizz".to_owned()));
    }

    #[test]
    fn test_maker_conversion_drops_identity() {
        let record: MakerRecord = serde_json::from_str(
            r#"{"name": "Studio", "tags": ["studio"], "is": {"name": "Person", "performer": "x"}}"#,
        )
        .unwrap();
        assert!(record.is.is_some());
        let maker = Maker::from(record);
        assert_eq!(maker.name.as_deref(), Some("Studio"));
        assert_eq!(maker.tags, ["studio"]);
    }

    #[test]
    fn test_dedup_tags_keeps_first_occurrence_and_drops_empty() {
        let tags = ["b", "", "a", "b", "c", "a", ""].map(str::to_owned);
        assert_eq!(dedup_tags(tags), ["b", "a", "c"]);
    }

    #[test]
    fn test_nameless_event_takes_its_key() {
        let event: Event = serde_json::from_str(r#"{"tags": ["x"], "city": "Toronto"}"#).unwrap();
        let event = event.or_named("ExpoCon");
        assert_eq!(event.name, "ExpoCon");
        assert_eq!(event.tags, ["x"], "stored tags are kept");

        assert_eq!(Event::named("Expo Con").or_named("expocon").name, "Expo Con");
    }

    #[test]
    fn test_event_named_tags_itself() {
        let event = Event::named("ExpoCon");
        assert_eq!(event.tags, ["ExpoCon"]);
        assert!(!event.has_location());
    }
}
