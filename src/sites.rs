//! Per-site handle normalization and profile URLs.
//!
//! Stored handles are raw: whatever the person typed (`@fizz`, `Fizz_Buzz`,
//! `fizz@furry.engineer`). Turning one into a link is two steps, handle →
//! slug → URL, and both steps are site specific.

use crate::error::{Mkpp3Error, Result};
use crate::model::Contactable;

/// Sites considered for the credit link, most preferred first.
pub const CREDIT_PRIORITY: [&str; 16] = [
    "web",
    "mastodon",
    "misskey",
    "weasyl",
    "inkbunny",
    "flickr",
    "fa",
    "tumblr",
    "youtube",
    "instagram",
    "bsky",
    "da",
    "twitter",
    "facebook",
    "second-life",
    "second-life-uuid",
];

/// Handle → slug → URL for one site.
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub id: &'static str,
    pub to_slug: fn(&str) -> Result<String>,
    pub to_url: fn(&str) -> String,
}

impl Site {
    /// Normalize a raw handle and build its URL.
    ///
    /// # Errors
    ///
    /// Returns [`Mkpp3Error::MalformedInput`] if the handle cannot be
    /// normalized for this site.
    pub fn url_for(&self, handle: &str) -> Result<String> {
        let slug = (self.to_slug)(handle)?;
        Ok((self.to_url)(&slug))
    }
}

const REGISTRY: [Site; 16] = [
    Site {
        id: "web",
        to_slug: as_is,
        to_url: |slug| slug.to_owned(),
    },
    Site {
        id: "mastodon",
        to_slug: fediverse_slug,
        to_url: fediverse_url,
    },
    Site {
        id: "misskey",
        to_slug: fediverse_slug,
        to_url: fediverse_url,
    },
    Site {
        id: "weasyl",
        to_slug: |handle| Ok(handle.replace('.', "").to_lowercase()),
        to_url: |slug| format!("https://www.weasyl.com/~{slug}"),
    },
    Site {
        id: "inkbunny",
        to_slug: as_is,
        to_url: |slug| format!("https://inkbunny.net/{slug}"),
    },
    Site {
        id: "flickr",
        to_slug: as_is,
        to_url: |slug| format!("https://www.flickr.com/people/{slug}/"),
    },
    Site {
        id: "fa",
        to_slug: |handle| Ok(handle.replace('_', "")),
        to_url: |slug| format!("https://www.furaffinity.net/user/{slug}"),
    },
    Site {
        id: "tumblr",
        to_slug: as_is,
        to_url: |slug| format!("https://{slug}.tumblr.com/"),
    },
    Site {
        id: "youtube",
        to_slug: strip_at,
        to_url: |slug| format!("https://www.youtube.com/@{slug}"),
    },
    Site {
        id: "instagram",
        to_slug: strip_at,
        to_url: |slug| format!("https://www.instagram.com/{slug}/"),
    },
    Site {
        id: "bsky",
        to_slug: strip_at,
        to_url: |slug| format!("https://bsky.app/profile/{slug}"),
    },
    Site {
        id: "da",
        to_slug: as_is,
        to_url: |slug| format!("https://{slug}.deviantart.com/"),
    },
    Site {
        id: "twitter",
        to_slug: strip_at,
        to_url: |slug| format!("https://twitter.com/{slug}"),
    },
    Site {
        id: "facebook",
        to_slug: |handle| Ok(handle.replace(' ', ".").to_lowercase()),
        to_url: |slug| format!("https://www.facebook.com/{slug}/"),
    },
    Site {
        id: "second-life",
        to_slug: second_life_slug,
        to_url: |slug| format!("https://my.secondlife.com/{slug}"),
    },
    Site {
        id: "second-life-uuid",
        to_slug: |handle| Ok(handle.trim().to_lowercase()),
        to_url: |slug| format!("https://world.secondlife.com/resident/{slug}"),
    },
];

/// Look up a site by identifier.
pub fn site(id: &str) -> Option<&'static Site> {
    REGISTRY.iter().find(|site| site.id == id)
}

/// The credit link for someone: the first site in [`CREDIT_PRIORITY`] they
/// have a handle on that is not marked stale.
///
/// # Errors
///
/// Returns [`Mkpp3Error::MalformedInput`] if the chosen handle cannot be
/// normalized.
pub fn credit_url(someone: &(impl Contactable + ?Sized)) -> Result<Option<String>> {
    let stale = someone.stale();
    for id in CREDIT_PRIORITY {
        if stale.iter().any(|s| s == id) {
            continue;
        }
        let Some(handle) = someone.on().get(id) else {
            continue;
        };
        let Some(site) = site(id) else {
            continue;
        };
        return site.url_for(handle).map(Some);
    }
    Ok(None)
}

fn as_is(handle: &str) -> Result<String> {
    Ok(handle.to_owned())
}

fn strip_at(handle: &str) -> Result<String> {
    Ok(handle.strip_prefix('@').unwrap_or(handle).to_owned())
}

/// `@user@domain` or `user@domain` → `user@domain`.
fn fediverse_slug(handle: &str) -> Result<String> {
    let trimmed = handle.strip_prefix('@').unwrap_or(handle);
    match trimmed.split_once('@') {
        Some((user, domain))
            if !user.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(trimmed.to_owned())
        }
        _ => Err(Mkpp3Error::MalformedInput(format!(
            "fediverse handle '{handle}' is not of the form user@domain"
        ))),
    }
}

fn fediverse_url(slug: &str) -> String {
    match slug.split_once('@') {
        Some((user, domain)) => format!("https://{domain}/@{user}"),
        None => format!("https://{slug}"),
    }
}

/// `Kakurady Resident` → `kakurady`, `First Last` → `first.last`.
fn second_life_slug(handle: &str) -> Result<String> {
    let name = handle.trim();
    let name = name.strip_suffix(" Resident").unwrap_or(name);
    Ok(name.replace(' ', ".").to_lowercase())
}
