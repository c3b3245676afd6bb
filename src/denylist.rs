use crate::error::ScrapeError;
use serde::Deserialize;
use std::path::Path;

pub const PHONE_DENYLIST: &[&str] = &[
    "(000) 000-0000",
    "(111) 111-1111",
    "(222) 222-2222",
    "(333) 333-3333",
    "(444) 444-4444",
    "(555) 555-5555",
    "(666) 666-6666",
    "(777) 777-7777",
    "(888) 888-8888",
    "(999) 999-9999",
];

pub const URL_DENYLIST: &[&str] = &[
    "google.com",
    ".google.",
    "facebook.com",
    "twitter.com",
    ".gov",
    "youtube.com",
    "wikipedia.org",
    "wikisource.org",
    "wikibooks.org",
    "deviantart.com",
    "wiktionary.org",
    "wikiquote.org",
    "wikiversity.org",
    "wikia.com",
    "blogspot.",
    "wordpress.com",
    "tumblr.com",
    "about.com",
    "instagram.com",
    "wp-admin",
    "blog",
];

/// Returns true if `candidate` contains any entry of `list`.
pub fn is_denied<S: AsRef<str>>(candidate: &str, list: &[S]) -> bool {
    list.iter().any(|entry| candidate.contains(entry.as_ref()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Denylist {
    entries: Vec<String>,
}

impl Denylist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Denylist {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_denied(&self, candidate: &str) -> bool {
        is_denied(candidate, self.entries.as_slice())
    }

    pub fn extend<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.extend(entries.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The phone and URL denylists used by the extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylists {
    pub phone: Denylist,
    pub url: Denylist,
}

impl Default for Denylists {
    fn default() -> Self {
        Denylists {
            phone: Denylist::new(PHONE_DENYLIST.iter().copied()),
            url: Denylist::new(URL_DENYLIST.iter().copied()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DenylistFile {
    phone: Vec<String>,
    url: Vec<String>,
}

impl Denylists {
    /// Appends the entries of a JSON file shaped like
    /// `{"phone": [...], "url": [...]}` to the current lists.
    pub fn extend_from_json(&mut self, json: &str) -> Result<(), ScrapeError> {
        let file: DenylistFile = serde_json::from_str(json)?;
        self.phone.extend(file.phone);
        self.url.extend(file.url);
        Ok(())
    }

    pub async fn extend_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ScrapeError> {
        let json = tokio::fs::read_to_string(path).await?;
        self.extend_from_json(&json)
    }
}
