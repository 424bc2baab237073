//! Commit tag matching
//!
//! A trigger can be restricted to builds whose commit messages carry one of
//! a set of tags (e.g. `#deploy`). Without tags every build qualifies.

use crate::domain::build::BuildInfo;

/// Splits a comma separated tag list, dropping blank entries
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a set of commit messages qualifies for notification
///
/// True when no tags are configured, otherwise when a message contains one
/// of the tags verbatim (case-sensitive).
pub fn should_notify<S: AsRef<str>>(tags: &[String], change_descriptions: &[S]) -> bool {
    tags.is_empty()
        || change_descriptions
            .iter()
            .any(|message| first_tag_in(tags, message.as_ref()).is_some())
}

/// Outcome of looking for a tag in a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMatch {
    /// No tags configured
    Unconditional,
    Found {
        tag: String,
        message: String,
        author: Option<String>,
        /// Display name of the upstream build the commit came from
        upstream: Option<String>,
    },
    NotFound,
}

impl TagMatch {
    pub fn should_notify(&self) -> bool {
        !matches!(self, TagMatch::NotFound)
    }
}

/// Looks for a tag in the change set of `build`
///
/// A build without changes defers to the build that triggered it, up the
/// chain, until a build with changes is found. Only that change set is
/// checked.
pub fn find_tag(tags: &[String], build: &BuildInfo) -> TagMatch {
    if tags.is_empty() {
        return TagMatch::Unconditional;
    }

    let mut current = build;
    let mut upstream = None;
    while current.change_set.is_empty() {
        match &current.upstream {
            Some(parent) => {
                current = &**parent;
                upstream = Some(current.display_name());
            }
            None => return TagMatch::NotFound,
        }
    }

    current
        .change_set
        .iter()
        .find_map(|change| {
            first_tag_in(tags, &change.message).map(|tag| TagMatch::Found {
                tag: tag.to_string(),
                message: change.message.clone(),
                author: change.author.clone(),
                upstream: upstream.clone(),
            })
        })
        .unwrap_or(TagMatch::NotFound)
}

fn first_tag_in<'a>(tags: &'a [String], message: &str) -> Option<&'a str> {
    tags.iter()
        .map(String::as_str)
        .find(|tag| message.contains(tag))
}
