//! Profile scripts: many profiles listed one per line.

use crate::error::{Mkpp3Error, Result, ResultExt as _};
use crate::model::{CharacterRef, Reference};
use std::path::Path;

/// One line of a profile script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    /// Filename override. Empty when the line has no `label:` prefix.
    pub label: String,
    pub characters: Vec<CharacterRef>,
}

/// Parse a profile script.
///
/// Each line is `label:character,character/performer,...`. Lines starting
/// with `#` and blank lines are skipped.
///
/// # Errors
///
/// Returns [`Mkpp3Error::MalformedInput`] for a line that names no
/// characters.
pub fn parse_profile_script(text: &str) -> Result<Vec<ScriptEntry>> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let (label, names) = line.split_once(':').unwrap_or(("", line));

        let characters: Vec<CharacterRef> = names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(parse_character)
            .collect();
        if characters.is_empty() {
            return Err(Mkpp3Error::MalformedInput(format!(
                "profile script line {} names no characters: '{line}'",
                index + 1
            )));
        }

        entries.push(ScriptEntry {
            label: label.trim().to_owned(),
            characters,
        });
    }
    Ok(entries)
}

/// `name` or `name/performer`.
pub fn parse_character(entry: &str) -> CharacterRef {
    match entry.split_once('/') {
        Some((key, performer)) if !performer.trim().is_empty() => {
            CharacterRef::with_performer(key.trim(), performer.trim())
        }
        Some((key, _)) => Reference::Key(key.trim().to_owned()),
        None => Reference::Key(entry.to_owned()),
    }
}

/// Read and parse the profile script at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is malformed.
pub async fn read_profile_script(path: &Path) -> Result<Vec<ScriptEntry>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read profile script {}", path.display()))?;
    let entries = parse_profile_script(&text)?;
    tracing::info!(
        "Read {} profiles from {}",
        entries.len(),
        path.display()
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CharacterRef {
        Reference::Key(name.to_owned())
    }

    #[test]
    fn test_labels_and_overrides() {
        let script = "group-1:fizz,buzz/sam\nfizz\n";

        let entries = parse_profile_script(script).unwrap();

        assert_eq!(
            entries,
            [
                ScriptEntry {
                    label: "group-1".to_owned(),
                    characters: vec![key("fizz"), CharacterRef::with_performer("buzz", "sam")],
                },
                ScriptEntry {
                    label: String::new(),
                    characters: vec![key("fizz")],
                },
            ]
        );
    }

    #[test]
    fn test_comments_blank_lines_and_crlf() {
        let script = "# Saturday\r\n\r\nfizz\r\n   \r\n#buzz\r\nbuzz";

        let entries = parse_profile_script(script).unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.characters.clone()).collect();
        assert_eq!(names, [vec![key("fizz")], vec![key("buzz")]]);
    }

    #[test]
    fn test_trailing_slash_is_not_an_override() {
        let entries = parse_profile_script("fizz/").unwrap();
        assert_eq!(entries[0].characters, [key("fizz")]);
    }

    #[test]
    fn test_line_without_characters_is_rejected() {
        let err = parse_profile_script("fizz\nempty:\n").unwrap_err();
        assert!(matches!(err, Mkpp3Error::MalformedInput(_)), "{err}");
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[tokio::test]
    async fn test_read_missing_script() {
        let temp = tempfile::tempdir().unwrap();
        let err = read_profile_script(&temp.path().join("nope.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope.txt"), "{err}");
    }
}
