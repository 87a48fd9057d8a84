//! Sidecar rendering for resolved characters.
//!
//! Produces the `.pp3` text RawTherapee reads its IPTC metadata from: a
//! caption crediting everyone in the photo, a headline, and a keyword list.
//!
//! ## Output Format
//!
//! ```text
//! [Exif]
//! Artist=Jo Photographer
//! Copyright=CC BY-NC 4.0
//!
//! [IPTC]
//! Caption=Alex ( https://twitter.com/alex ) as Fizz;
//! Headline=Fizz at ExpoCon;
//! Keywords=fox;canine;orange;fursuit;ExpoCon;
//! Author=Jo Photographer;
//! Copyright=CC BY-NC 4.0;
//! Country=Canada;
//! City=Toronto;
//! ```
//!
//! Lines are joined with `\n` and the text has no trailing newline. The
//! bracketed headers and the trailing semicolons on IPTC values are part of
//! the format, not decoration.

use crate::error::Result;
use crate::model::{Character, Contactable, Event, Resolved, dedup_tags};
use crate::sites::credit_url;
use regex::Regex;
use std::sync::LazyLock;

/// Runs of punctuation or symbol characters, collapsed to one `_` in
/// filenames.
static PUNCTUATION_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{P}\p{S}]+").expect("punctuation pattern is valid"));

/// Everything needed to render one sidecar.
#[derive(Debug, Clone, Default)]
pub struct ProfileOptions {
    pub artist: Option<String>,
    pub copyright: Option<String>,
    pub characters: Vec<Character>,
    pub event: Option<Event>,
    /// Overrides the filename derived from the characters.
    pub label: Option<String>,
    /// Tags placed ahead of every derived tag.
    pub tags: Vec<String>,
    /// Overrides the headline derived from the characters.
    pub title: Option<String>,
}

/// A rendered sidecar and the file stem it should be written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub filename: String,
    pub text: String,
}

/// Render the sidecar text and filename for `options`.
///
/// # Errors
///
/// Returns [`crate::error::Mkpp3Error::MalformedInput`] if a credited handle
/// cannot be turned into a URL.
pub fn render_profile(options: &ProfileOptions) -> Result<Profile> {
    Ok(Profile {
        filename: filename(options),
        text: render_sidecar(options)?,
    })
}

/// Render the `.pp3` body.
///
/// # Errors
///
/// Returns an error if a credited handle is malformed.
pub fn render_sidecar(options: &ProfileOptions) -> Result<String> {
    let caption = escape_caption(&attributions(&options.characters)?);
    let headline = title(options);
    let keywords = collect_tags(options).join(";");

    let mut lines = vec!["[Exif]".to_owned()];
    if let Some(artist) = &options.artist {
        lines.push(format!("Artist={artist}"));
    }
    if let Some(copyright) = &options.copyright {
        lines.push(format!("Copyright={copyright}"));
    }
    lines.push(String::new());

    lines.push("[IPTC]".to_owned());
    lines.push(format!("Caption={caption};"));
    lines.push(format!("Headline={headline};"));
    lines.push(format!("Keywords={keywords};"));
    if let Some(artist) = &options.artist {
        lines.push(format!("Author={artist};"));
    }
    if let Some(copyright) = &options.copyright {
        lines.push(format!("Copyright={copyright};"));
    }
    if let Some(event) = options.event.as_ref().filter(|e| e.has_location()) {
        let location = [
            ("Country", &event.country),
            ("Province", &event.province),
            ("City", &event.city),
        ];
        for (key, value) in location {
            if let Some(value) = value {
                lines.push(format!("{key}={value};"));
            }
        }
    }

    Ok(lines.join("\n"))
}

/// `"{name} ( {url} )"`, or whichever half exists.
///
/// # Errors
///
/// Returns an error if the chosen handle is malformed.
pub fn credit(someone: &(impl Contactable + ?Sized)) -> Result<String> {
    let name = someone.name().filter(|n| !n.is_empty());
    let credit = match (name, credit_url(someone)?) {
        (Some(name), Some(url)) => format!("{name} ( {url} )"),
        (None, Some(url)) => url,
        (Some(name), None) => name.to_owned(),
        (None, None) => String::new(),
    };
    Ok(credit)
}

fn resolved_credit<T: Contactable>(someone: &Resolved<T>) -> Result<String> {
    match someone {
        Resolved::Entity(entity) => credit(entity),
        Resolved::Name(name) => Ok(name.clone()),
    }
}

/// `"{performer} as {character}"`, or just the character's credit.
///
/// # Errors
///
/// Returns an error if a credited handle is malformed.
pub fn attribution(character: &Character) -> Result<String> {
    let character_credit = credit(character)?;
    match &character.performer {
        Some(performer) => Ok(format!("{} as {character_credit}", resolved_credit(performer)?)),
        None => Ok(character_credit),
    }
}

/// One attribution line per character.
///
/// # Errors
///
/// Returns an error if a credited handle is malformed.
pub fn attributions(characters: &[Character]) -> Result<String> {
    let lines = characters
        .iter()
        .map(attribution)
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

/// Keywords, most specific first: explicit tags, then per character its
/// species, own tags and makers, then the lone character's gender, then the
/// event's tags.
pub fn collect_tags(options: &ProfileOptions) -> Vec<String> {
    let mut tags = options.tags.clone();

    for character in &options.characters {
        for species in &character.species {
            match species {
                Resolved::Entity(species) => tags.extend(species.tags.iter().cloned()),
                Resolved::Name(name) => tags.push(name.clone()),
            }
        }
        tags.extend(character.tags.iter().cloned());
        for maker in &character.maker {
            match maker {
                Resolved::Entity(maker) => {
                    tags.extend(maker.name.clone());
                    tags.extend(maker.tags.iter().cloned());
                }
                Resolved::Name(name) => tags.push(name.clone()),
            }
        }
    }

    if let [character] = options.characters.as_slice() {
        tags.extend(character.gender.clone());
    }
    if let Some(event) = &options.event {
        tags.extend(event.tags.iter().cloned());
    }

    dedup_tags(tags)
}

/// The headline: explicit title, or the character names as a list, placed
/// at the event if there is one.
pub fn title(options: &ProfileOptions) -> String {
    if let Some(title) = &options.title {
        return title.clone();
    }
    let names: Vec<&str> = options.characters.iter().map(|c| c.name.as_str()).collect();
    let joined = natural_join(&names);
    match &options.event {
        Some(event) if joined.is_empty() => event.name.clone(),
        Some(event) => format!("{joined} at {}", event.name),
        None => joined,
    }
}

/// `A`, `A and B`, `A, B, and C`.
fn natural_join(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_owned(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// The file stem: the label, else each character's key or name, else the
/// event name.
pub fn filename(options: &ProfileOptions) -> String {
    let components: Vec<&str> = match options.label.as_deref().filter(|l| !l.is_empty()) {
        Some(label) => vec![label],
        None if !options.characters.is_empty() => options
            .characters
            .iter()
            .map(Character::key_or_name)
            .collect(),
        None => options.event.iter().map(|e| e.name.as_str()).collect(),
    };
    components
        .into_iter()
        .map(filename_component)
        .collect::<Vec<_>>()
        .join("_")
}

fn filename_component(component: &str) -> String {
    let lower = component.to_lowercase();
    PUNCTUATION_RUN
        .replace_all(&lower, "_")
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

// ----------------------------------------------------------------------------
// Gallery tags
// ----------------------------------------------------------------------------

/// FurAffinity keywords: space separated, so multi-word keywords are split
/// into their words and also added once more in CamelCase. Dashes become
/// `_` and apostrophes are dropped.
pub fn fa_tags(keywords: &[String]) -> String {
    let cleaned: Vec<String> = keywords
        .iter()
        .map(|keyword| keyword.replace('-', "_").replace('\'', ""))
        .collect();
    let words = |keyword: &str| -> Vec<String> {
        keyword
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(str::to_owned)
            .collect()
    };

    let mut tags: Vec<String> = cleaned.iter().flat_map(|k| words(k)).collect();
    for keyword in &cleaned {
        let parts = words(keyword);
        if parts.len() > 1 {
            tags.push(parts.iter().map(|word| capitalize(word)).collect());
        }
    }
    tags.join(" ")
}

/// Weasyl keywords: one tag per keyword, spaces and dashes written as `_`,
/// apostrophes dropped.
pub fn weasyl_tags(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|keyword| keyword.replace([' ', '-'], "_").replace('\'', ""))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Backslashes doubled, newlines written as `\n`.
fn escape_caption(text: &str) -> String {
    text.replace('\\', r"\\").replace('\n', r"\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Maker, Performer, SiteMap, Species};

    fn sites(pairs: &[(&str, &str)]) -> SiteMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn with_names(names: &[&str]) -> ProfileOptions {
        ProfileOptions {
            characters: names.iter().map(|n| Character::named(n)).collect(),
            ..ProfileOptions::default()
        }
    }

    fn expo() -> Event {
        Event {
            name: "ExpoCon".to_owned(),
            tags: vec!["ExpoCon".to_owned(), "convention".to_owned()],
            country: Some("Canada".to_owned()),
            province: None,
            city: Some("Toronto".to_owned()),
        }
    }

    #[test]
    fn test_title_lists_names() {
        assert_eq!(title(&with_names(&[])), "");
        assert_eq!(title(&with_names(&["A"])), "A");
        assert_eq!(title(&with_names(&["A", "B"])), "A and B");
        assert_eq!(title(&with_names(&["A", "B", "C"])), "A, B, and C");
        assert_eq!(title(&with_names(&["A", "B", "C", "D"])), "A, B, C, and D");
    }

    #[test]
    fn test_title_with_event() {
        let mut options = with_names(&["A"]);
        options.event = Some(Event::named("ExpoCon"));
        assert_eq!(title(&options), "A at ExpoCon");

        let mut options = with_names(&[]);
        options.event = Some(Event::named("ExpoCon"));
        assert_eq!(title(&options), "ExpoCon");

        options.title = Some("Group Photo".to_owned());
        assert_eq!(title(&options), "Group Photo");
    }

    #[test]
    fn test_filename_components() {
        assert_eq!(filename(&with_names(&["Fizz Buzz"])), "fizz_buzz");
        assert_eq!(filename(&with_names(&["Mr. Fox!"])), "mr__fox_");
        assert_eq!(filename(&with_names(&["A", "B"])), "a_b");
    }

    #[test]
    fn test_filename_prefers_label_then_key_then_event() {
        let mut options = with_names(&["Fizz"]);
        options.characters[0].key = Some("fizz-winter".to_owned());
        assert_eq!(filename(&options), "fizz_winter");

        options.label = Some("Group #3".to_owned());
        assert_eq!(filename(&options), "group__3");

        options.label = Some(String::new());
        assert_eq!(filename(&options), "fizz_winter", "empty labels are ignored");

        let options = ProfileOptions {
            event: Some(Event::named("Expo Con 2024")),
            ..ProfileOptions::default()
        };
        assert_eq!(filename(&options), "expo_con_2024");
    }

    #[test]
    fn test_collect_tags_order_and_dedup() {
        let character = Character {
            name: "Fizz".to_owned(),
            gender: Some("male".to_owned()),
            species: vec![
                Resolved::Entity(Species {
                    name: Some("Fox".to_owned()),
                    tags: vec!["fox".to_owned(), "canine".to_owned()],
                }),
                Resolved::Name("cryptid".to_owned()),
            ],
            tags: vec!["orange".to_owned(), "fox".to_owned(), String::new()],
            maker: vec![
                Resolved::Entity(Maker {
                    name: Some("Studio".to_owned()),
                    tags: vec!["toony".to_owned()],
                    ..Maker::default()
                }),
                Resolved::Name("Freelancer".to_owned()),
            ],
            ..Character::default()
        };
        let options = ProfileOptions {
            tags: vec!["featured".to_owned(), "orange".to_owned()],
            characters: vec![character],
            event: Some(expo()),
            ..ProfileOptions::default()
        };

        assert_eq!(
            collect_tags(&options),
            [
                "featured", "orange", "fox", "canine", "cryptid", "Studio", "toony",
                "Freelancer", "male", "ExpoCon", "convention"
            ]
        );
    }

    #[test]
    fn test_gender_only_for_single_character() {
        let mut options = with_names(&["A", "B"]);
        options.characters[0].gender = Some("female".to_owned());
        assert!(collect_tags(&options).is_empty(), "{:?}", collect_tags(&options));
    }

    #[test]
    fn test_attribution_with_performer() {
        let character = Character {
            name: "Fizz".to_owned(),
            on: sites(&[("fa", "fizz_buzz")]),
            performer: Some(Resolved::Entity(Performer {
                name: Some("Alex".to_owned()),
                on: sites(&[("twitter", "@alex")]),
                ..Performer::default()
            })),
            ..Character::default()
        };
        assert_eq!(
            attribution(&character).unwrap(),
            "Alex ( https://twitter.com/alex ) as Fizz ( https://www.furaffinity.net/user/fizzbuzz )"
        );
    }

    #[test]
    fn test_attribution_bare_names() {
        let mut character = Character::named("Fizz");
        assert_eq!(attribution(&character).unwrap(), "Fizz");
        character.performer = Some(Resolved::Name("someone".to_owned()));
        assert_eq!(attribution(&character).unwrap(), "someone as Fizz");
    }

    #[test]
    fn test_nameless_credit_is_the_url() {
        let performer = Performer {
            on: sites(&[("web", "https://alex.example/")]),
            ..Performer::default()
        };
        assert_eq!(credit(&performer).unwrap(), "https://alex.example/");
    }

    #[test]
    fn test_render_sidecar_exact_layout() {
        let character = Character {
            key: Some("fizz".to_owned()),
            name: "Fizz".to_owned(),
            tags: vec!["orange".to_owned()],
            performer: Some(Resolved::Entity(Performer {
                name: Some("Alex".to_owned()),
                on: sites(&[("twitter", "@alex")]),
                ..Performer::default()
            })),
            ..Character::default()
        };
        let options = ProfileOptions {
            artist: Some("Jo".to_owned()),
            copyright: Some("CC BY-NC 4.0".to_owned()),
            characters: vec![character],
            event: Some(expo()),
            ..ProfileOptions::default()
        };

        let profile = render_profile(&options).unwrap();
        assert_eq!(profile.filename, "fizz");
        assert_eq!(
            profile.text,
            "[Exif]\n\
             Artist=Jo\n\
             Copyright=CC BY-NC 4.0\n\
             \n\
             [IPTC]\n\
             Caption=Alex ( https://twitter.com/alex ) as Fizz;\n\
             Headline=Fizz at ExpoCon;\n\
             Keywords=orange;ExpoCon;convention;\n\
             Author=Jo;\n\
             Copyright=CC BY-NC 4.0;\n\
             Country=Canada;\n\
             City=Toronto;"
        );
    }

    #[test]
    fn test_render_sidecar_minimal() {
        let text = render_sidecar(&with_names(&["A", "B"])).unwrap();
        assert_eq!(
            text,
            "[Exif]\n\n[IPTC]\nCaption=A\\nB;\nHeadline=A and B;\nKeywords=;"
        );
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    #[test]
    fn test_fa_tags_split_and_camel_case() {
        let tags = keywords(&["red fox", "canine", "big bad wolf"]);
        assert_eq!(
            fa_tags(&tags),
            "red fox canine big bad wolf RedFox BigBadWolf"
        );
    }

    #[test]
    fn test_fa_tags_dashes_and_apostrophes() {
        let tags = keywords(&["sci-fi", "Fizz's Den", "rock 'n' roll"]);
        assert_eq!(
            fa_tags(&tags),
            "sci_fi Fizzs Den rock n roll FizzsDen RockNRoll"
        );
    }

    #[test]
    fn test_weasyl_tags_underscore_spaces_and_dashes() {
        let tags = keywords(&["red fox", "sci-fi", "Fizz's Den", "canine"]);
        assert_eq!(weasyl_tags(&tags), "red_fox sci_fi Fizzs_Den canine");
        assert_eq!(weasyl_tags(&[]), "");
    }

    #[test]
    fn test_caption_escaping() {
        assert_eq!(escape_caption("a\\b\nc"), r"a\\b\nc");
    }
}
