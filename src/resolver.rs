//! Entity resolution: records and references in, resolved entities out.
//!
//! ## Character merge rules
//!
//! A character request is a key, or a key plus override fields. The key is
//! looked up in the character store, then the performer store, then the
//! maker store; the first hit is the base record. Each resolved field then
//! takes the override if present, else the base record:
//!
//! ```text
//! name                 override → record → key → "NOT FOUND"
//! on / abbr / stale    override → original performer's → record
//! gender               override → record
//! maker / species      override → record, each entry resolved
//! performer            override → record, resolved one hop
//! tags                 (override → record) + addTags (+ "fursuit")
//! ```
//!
//! The "original performer" step only applies when the request replaces the
//! performer of a record that has no contact info of its own but does name
//! a performer. The character then keeps the contact info it used to
//! inherit instead of ending up with none.
//!
//! Nothing here fails for missing data. Missing characters become
//! placeholders, missing makers and species stay as their names, missing
//! performers are dropped. Storage errors propagate unchanged.

use crate::error::Result;
use crate::model::{
    Character, CharacterOverride, CharacterRecord, CharacterRef, ContactRecord, Event,
    FURSUIT_TAG, Maker, MakerRecord, OneOrMany, Performer, Reference, Resolved, Species,
    dedup_tags,
};
use crate::source::DataSource;
use futures::future::try_join_all;

/// Name used when a character has neither a name nor a key.
pub const NOT_FOUND: &str = "NOT FOUND";

/// Where a character's base record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseOrigin {
    CharacterStore,
    PerformerStore,
    MakerStore,
    NotFound,
    /// No key was given; the request's own fields are all there is.
    Inline,
}

/// Resolves references against a [`DataSource`].
///
/// Every call performs fresh lookups; nothing is cached between calls.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    ds: &'a dyn DataSource,
}

impl<'a> Resolver<'a> {
    pub fn new(ds: &'a dyn DataSource) -> Self {
        Self { ds }
    }

    /// Resolve a batch of characters concurrently, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub async fn resolve_characters(&self, references: &[CharacterRef]) -> Result<Vec<Character>> {
        try_join_all(references.iter().map(|r| self.resolve_character(r))).await
    }

    /// Resolve one character request into a fully merged [`Character`].
    ///
    /// # Errors
    ///
    /// Only storage errors (unreadable or unparsable records) are returned;
    /// missing records never are.
    pub async fn resolve_character(&self, reference: &CharacterRef) -> Result<Character> {
        let default_override = CharacterOverride::default();
        let (key, over) = match reference {
            Reference::Key(key) => (Some(key.as_str()), &default_override),
            Reference::Inline(over) => (over.lookup_key(), over),
        };
        let over_record = &over.record;

        let (record, origin) = match key {
            Some(key) => self.load_base(key).await?,
            None => {
                if non_empty(over_record.contact.name.as_deref()).is_none() {
                    tracing::info!("character request has no key and no name");
                }
                (CharacterRecord::default(), BaseOrigin::Inline)
            }
        };

        // Only computed when the performer is being replaced on a record that
        // relied on its performer for contact info.
        let original_performer = match (&over_record.performer, &record.contact.on, &record.performer) {
            (Some(_), None, Some(original)) => self.resolve_performer(original).await?,
            _ => None,
        };

        let name = non_empty(over_record.contact.name.as_deref())
            .or_else(|| non_empty(record.contact.name.as_deref()))
            .or_else(|| non_empty(key))
            .unwrap_or(NOT_FOUND)
            .to_owned();

        let contact = &over_record.contact;
        let on = contact
            .on
            .clone()
            .or_else(|| original_performer.as_ref().map(|p| p.on.clone()))
            .or_else(|| record.contact.on.clone())
            .unwrap_or_default();
        let abbr = contact
            .abbr
            .clone()
            .or_else(|| original_performer.as_ref().map(|p| p.abbr.clone()))
            .or_else(|| record.contact.abbr.clone())
            .unwrap_or_default();
        let stale = contact
            .stale
            .clone()
            .or_else(|| original_performer.as_ref().map(|p| p.stale.clone()))
            .or_else(|| record.contact.stale.clone())
            .unwrap_or_default();

        let gender = over_record.gender.clone().or_else(|| record.gender.clone());

        let maker_refs = over_record.maker.as_ref().or(record.maker.as_ref());
        let performer_ref = over_record.performer.as_ref().or(record.performer.as_ref());
        let species_refs = over_record.species.as_ref().or(record.species.as_ref());

        let (maker, performer, species) = futures::try_join!(
            self.resolve_makers(maker_refs),
            async {
                match performer_ref {
                    Some(reference) => self.resolve_performer(reference).await,
                    None => Ok(None),
                }
            },
            self.resolve_species(species_refs),
        )?;

        let base_tags = over_record
            .tags
            .as_ref()
            .or(record.tags.as_ref())
            .into_iter()
            .flatten();
        let added_tags = over.add_tags.iter().flatten();
        let fursuit = (origin == BaseOrigin::CharacterStore).then(|| FURSUIT_TAG.to_owned());
        let tags = dedup_tags(base_tags.chain(added_tags).cloned().chain(fursuit));

        Ok(Character {
            key: key.map(str::to_owned),
            name,
            on,
            abbr,
            stale,
            gender,
            maker,
            performer: performer.map(Resolved::Entity),
            species,
            tags,
        })
    }

    /// Look a key up in the character, performer and maker stores, in that
    /// order. A miss everywhere yields a `"{key} NOT FOUND"` placeholder.
    async fn load_base(&self, key: &str) -> Result<(CharacterRecord, BaseOrigin)> {
        if let Some(record) = self.ds.load_character(key).await? {
            return Ok((record, BaseOrigin::CharacterStore));
        }
        if let Some(performer) = self.ds.load_performer(key).await? {
            return Ok((performer.into(), BaseOrigin::PerformerStore));
        }
        if let Some(maker) = self.ds.load_maker(key).await? {
            return Ok((maker.into(), BaseOrigin::MakerStore));
        }
        tracing::warn!("cannot load {key}");
        let placeholder = CharacterRecord::from(ContactRecord {
            name: Some(format!("{key} {NOT_FOUND}")),
            ..ContactRecord::default()
        });
        Ok((placeholder, BaseOrigin::NotFound))
    }

    /// Resolve a maker. Unknown names are kept as text; inline makers are
    /// projected to their contact fields and tags, dropping `is`.
    ///
    /// # Errors
    ///
    /// Returns storage errors only.
    pub async fn resolve_maker(&self, reference: &Reference<MakerRecord>) -> Result<Resolved<Maker>> {
        match reference {
            Reference::Key(name) => match self.ds.load_maker(name).await? {
                Some(record) => Ok(Resolved::Entity(record.into())),
                None => {
                    tracing::debug!("no maker record for '{name}', using it as free text");
                    Ok(Resolved::Name(name.clone()))
                }
            },
            Reference::Inline(record) => Ok(Resolved::Entity(record.clone().into())),
        }
    }

    /// Resolve every maker of a list concurrently, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub async fn resolve_makers(
        &self,
        references: Option<&OneOrMany<Reference<MakerRecord>>>,
    ) -> Result<Vec<Resolved<Maker>>> {
        let references = as_slice(references);
        try_join_all(references.iter().map(|r| self.resolve_maker(r))).await
    }

    /// Resolve one species entry. Unknown names pass through as text.
    ///
    /// # Errors
    ///
    /// Returns storage errors only.
    pub async fn resolve_one_species(&self, reference: &Reference<Species>) -> Result<Resolved<Species>> {
        match reference {
            Reference::Key(name) => match self.ds.load_species(name).await? {
                Some(species) => Ok(Resolved::Entity(species)),
                None => {
                    tracing::debug!("no species record for '{name}', using it as free text");
                    Ok(Resolved::Name(name.clone()))
                }
            },
            Reference::Inline(species) => Ok(Resolved::Entity(species.clone())),
        }
    }

    /// Resolve a species list concurrently, preserving order. Absent input
    /// is an empty list.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub async fn resolve_species(
        &self,
        references: Option<&OneOrMany<Reference<Species>>>,
    ) -> Result<Vec<Resolved<Species>>> {
        let references = as_slice(references);
        try_join_all(references.iter().map(|r| self.resolve_one_species(r))).await
    }

    /// Resolve a performer: performer store first, then character store.
    ///
    /// This is the single expansion hop for performers. The result holds
    /// contact fields only, so a performer's own performer is never
    /// followed.
    ///
    /// # Errors
    ///
    /// Returns storage errors only; an unknown performer is `Ok(None)`.
    pub async fn resolve_performer(
        &self,
        reference: &Reference<Box<CharacterRecord>>,
    ) -> Result<Option<Performer>> {
        match reference {
            Reference::Key(name) => {
                if let Some(contact) = self.ds.load_performer(name).await? {
                    return Ok(Some(contact.into()));
                }
                if let Some(record) = self.ds.load_character(name).await? {
                    return Ok(Some(Performer::from(record)));
                }
                tracing::info!("cannot load performer {name}");
                Ok(None)
            }
            Reference::Inline(record) => Ok(Some(Performer::from(record.as_ref().clone()))),
        }
    }

    /// Resolve an event reference. Missing events are synthesized by the
    /// data source.
    ///
    /// # Errors
    ///
    /// Returns storage errors only.
    pub async fn resolve_event(&self, reference: &Reference<Event>) -> Result<Event> {
        match reference {
            Reference::Key(name) => self.ds.load_event(name).await,
            Reference::Inline(event) => Ok(event.clone()),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn as_slice<T>(items: Option<&OneOrMany<T>>) -> &[T] {
    match items {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => std::slice::from_ref(item),
        None => &[],
    }
}
