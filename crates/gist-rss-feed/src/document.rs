//! Feed document assembly and Atom encoding.

use crate::decode::decode_gists;
use crate::entry::{build_entries, FeedEntry};
use crate::error::Result;
use atom_syndication::{Content, Entry, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, SubsecRound, Utc};

/// Who the feed is about and where it is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedIdentity {
    /// Upstream login whose gists are listed.
    pub user: String,
    /// Public URL of the feed; used for the feed id and both links.
    pub site_url: String,
    /// Feed title.
    pub title: String,
    /// Author name.
    pub author_name: String,
    /// Author contact email.
    pub email: Option<String>,
    /// Host serving the gist embed scripts.
    pub embed_base_url: String,
}

impl FeedIdentity {
    /// Identity with the default title (`"{user} gists"`) and author (`user`).
    pub fn new(user: impl Into<String>, site_url: impl Into<String>) -> Self {
        let user = user.into();
        Self {
            title: format!("{user} gists"),
            author_name: user.clone(),
            user,
            site_url: site_url.into(),
            email: None,
            embed_base_url: "https://gist.github.com".to_string(),
        }
    }

    /// Overrides the feed title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Overrides the author name.
    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = name.into();
        self
    }

    /// Sets the author email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Overrides the embed script host.
    pub fn with_embed_base_url(mut self, url: impl Into<String>) -> Self {
        self.embed_base_url = url.into();
        self
    }

    /// The HTML snippet embedding a gist.
    pub fn embed_snippet(&self, gist_id: &str) -> String {
        format!(
            "<script src='{}/{}/{}.js'></script>",
            self.embed_base_url.trim_end_matches('/'),
            self.user,
            gist_id
        )
    }
}

/// The root of an Atom feed, built fresh for every request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDocument {
    /// Feed title.
    pub title: String,
    /// Feed id.
    pub id: String,
    /// `rel="self"` link.
    pub self_link: String,
    /// `rel="alternate"` link.
    pub alternate_link: String,
    /// Author name.
    pub author_name: String,
    /// Author email.
    pub author_email: Option<String>,
    /// Generation time.
    pub updated: DateTime<FixedOffset>,
    /// Entries in upstream order.
    pub entries: Vec<FeedEntry>,
}

impl FeedDocument {
    /// Assembles a document from already-mapped entries.
    pub fn assemble(
        identity: &FeedIdentity,
        entries: Vec<FeedEntry>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: identity.title.clone(),
            id: identity.site_url.clone(),
            self_link: identity.site_url.clone(),
            alternate_link: identity.site_url.clone(),
            author_name: identity.author_name.clone(),
            author_email: identity.email.clone().filter(|e| !e.is_empty()),
            updated: generated_at.trunc_subsecs(0).fixed_offset(),
            entries,
        }
    }

    /// Decodes a cached listing and assembles the document for it.
    pub fn from_payload(
        payload: &[u8],
        identity: &FeedIdentity,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let gists = decode_gists(payload);
        let entries = build_entries(&gists, identity);
        Self::assemble(identity, entries, generated_at)
    }

    /// Converts to the Atom model.
    pub fn to_atom(&self) -> Feed {
        let mut author = Person::default();
        author.set_name(self.author_name.clone());
        author.set_email(self.author_email.clone());

        let mut feed = Feed::default();
        feed.set_title(self.title.clone());
        feed.set_id(self.id.clone());
        feed.set_updated(self.updated);
        feed.set_links(vec![
            link(&self.self_link, "self"),
            link(&self.alternate_link, "alternate"),
        ]);
        feed.set_authors(vec![author]);
        feed.set_entries(self.entries.iter().map(atom_entry).collect::<Vec<_>>());
        feed
    }

    /// Serializes the document as Atom XML.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.to_atom().write_to(Vec::new())?)
    }
}

fn link(href: &str, rel: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel(rel);
    link
}

fn atom_entry(entry: &FeedEntry) -> Entry {
    let mut content = Content::default();
    content.set_content_type(Some("html".to_string()));
    content.set_value(Some(entry.content.clone()));

    let mut atom = Entry::default();
    atom.set_title(entry.title.clone());
    atom.set_id(entry.id.clone());
    atom.set_updated(entry.updated);
    atom.set_links(vec![link(&entry.link, "alternate")]);
    atom.set_content(Some(content));
    atom
}
