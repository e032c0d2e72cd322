use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::iter::{Labels, Parents, ThisAndParents};
use super::tlds;

/// Maximum length of a domain name, without the trailing root dot.
pub const MAX_LENGTH: usize = 253;

/// Maximum length of a single label.
pub const MAX_LABEL_LENGTH: usize = 63;

/// Errors raised while parsing or combining [`DomainName`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainNameError {
    /// The text does not follow the domain name grammar.
    #[error("Domain name '{name}' is not valid - {detail}")]
    Invalid { name: String, detail: String },

    /// The text is longer than [`MAX_LENGTH`].
    #[error("Domain name '{name}' is not valid - domain names can only have a maximum length of 253 characters")]
    TooLong { name: String },

    /// An operation was called with an argument outside its contract.
    #[error("{detail}")]
    Argument { param: &'static str, detail: String },
}

/// A case-insensitive DNS name, or the root.
///
/// Names are stored without the trailing root dot and keep the casing they
/// were parsed with; comparison, ordering and hashing ignore ASCII case.
/// Single-label names matching a well-known TLD are interned and carry the
/// table's lowercase spelling.
///
/// Cloning is cheap: the text is shared.
#[derive(Clone, Default)]
pub struct DomainName(Repr);

#[derive(Clone, Default)]
enum Repr {
    #[default]
    Root,
    Interned(&'static str),
    Owned(Arc<str>),
}

impl DomainName {
    /// The root name, `.`.
    pub const ROOT: Self = Self(Repr::Root);

    /// Parses a domain name.
    ///
    /// `""` and `"."` parse to [`DomainName::ROOT`]. A single trailing dot
    /// marks a rooted name and is dropped.
    pub fn parse(text: &str) -> Result<Self, DomainNameError> {
        match text {
            "" | "." => Ok(Self::ROOT),
            _ if is_rooted(text) => Self::parse(&text[..text.len() - 1]),
            _ if text.chars().count() > MAX_LENGTH => Err(DomainNameError::TooLong {
                name: text.to_string(),
            }),
            _ if !is_valid(text) => Err(DomainNameError::Invalid {
                name: text.to_string(),
                detail: diagnose(text),
            }),
            _ => Ok(Self::from_valid(text)),
        }
    }

    /// Same rules as [`DomainName::parse`], without building a diagnostic.
    pub fn try_parse(text: &str) -> Option<Self> {
        match text {
            "" | "." => Some(Self::ROOT),
            _ if is_rooted(text) => Self::try_parse(&text[..text.len() - 1]),
            _ if text.chars().count() > MAX_LENGTH || !is_valid(text) => None,
            _ => Some(Self::from_valid(text)),
        }
    }

    /// `text` must already satisfy the grammar.
    fn from_valid(text: &str) -> Self {
        match tlds::find(text) {
            Some(tld) => Self(Repr::Interned(tld)),
            None => Self(Repr::Owned(Arc::from(text))),
        }
    }

    /// The dotted text, empty for the root.
    pub(crate) fn text(&self) -> &str {
        match &self.0 {
            Repr::Root => "",
            Repr::Interned(s) => s,
            Repr::Owned(s) => s,
        }
    }

    /// The dotted text, `"."` for the root.
    pub fn as_str(&self) -> &str {
        match self.0 {
            Repr::Root => ".",
            _ => self.text(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.0, Repr::Root)
    }

    /// True when the leftmost label is `*`.
    pub fn is_wildcard(&self) -> bool {
        self.text().starts_with('*')
    }

    /// True for a single-label name. The root is not a TLD.
    pub fn is_tld(&self) -> bool {
        !self.is_root() && !self.text().contains('.')
    }

    /// Whether `self` sits strictly below `other` in the name hierarchy.
    ///
    /// Every name except the root is a subdomain of the root. Nothing is a
    /// subdomain of a wildcard name, and no name is a subdomain of itself.
    pub fn is_subdomain_of(&self, other: &DomainName) -> bool {
        if self.is_root() {
            return false;
        }
        if other.is_root() {
            return true;
        }
        if other.is_wildcard() {
            return false;
        }

        let (this, other) = (self.text(), other.text());
        if other.len() >= this.len() {
            return false;
        }
        let boundary = this.len() - other.len();
        this[boundary..].eq_ignore_ascii_case(other) && this.as_bytes()[boundary - 1] == b'.'
    }

    /// Whether `self` is matched by the wildcard name `wildcard`.
    ///
    /// Fails when `wildcard` is not a wildcard name.
    pub fn matches_wildcard_of(&self, wildcard: &DomainName) -> Result<bool, DomainNameError> {
        if !wildcard.is_wildcard() {
            return Err(DomainNameError::Argument {
                param: "wildcard",
                detail: format!("'{wildcard}' is not a wildcard domain name"),
            });
        }

        Ok(self.label_count() == wildcard.label_count()
            && wildcard
                .parent()
                .is_some_and(|parent| self.is_subdomain_of(&parent)))
    }

    /// Prepends one or more labels to this name.
    ///
    /// `subdomain` may itself be dotted (`"a.b"`) and may start with a
    /// wildcard label. Wildcard names cannot be extended.
    pub fn with_subdomain(&self, subdomain: &str) -> Result<Self, DomainNameError> {
        if self.is_wildcard() {
            return Err(wildcard_extension(subdomain));
        }
        if !is_valid(subdomain) {
            return Err(DomainNameError::Argument {
                param: "subdomain",
                detail: format!(
                    "Subdomain name '{subdomain}' is not valid - {}",
                    diagnose(subdomain)
                ),
            });
        }

        let combined = if self.is_root() {
            subdomain.to_string()
        } else {
            format!("{subdomain}.{}", self.text())
        };
        if combined.len() > MAX_LENGTH {
            return Err(DomainNameError::Argument {
                param: "subdomain",
                detail: format!(
                    "The subdomain name(s) '{subdomain}' would create a domain name longer than {MAX_LENGTH} characters"
                ),
            });
        }
        Ok(Self::from_valid(&combined))
    }

    /// Prepends all labels of `subdomain`. Prepending the root is a no-op.
    pub fn with_subdomain_name(&self, subdomain: &DomainName) -> Result<Self, DomainNameError> {
        if self.is_wildcard() {
            return Err(wildcard_extension(subdomain.as_str()));
        }
        if subdomain.is_root() {
            return Ok(self.clone());
        }
        self.with_subdomain(subdomain.text())
    }

    /// `*.` + this name.
    pub fn with_wildcard(&self) -> Result<Self, DomainNameError> {
        self.with_subdomain("*")
    }

    /// The labels of this name that lie below `parent`, as relative text.
    ///
    /// Relative to the root, the full name is returned.
    pub fn without_parent(&self, parent: &DomainName) -> Result<String, DomainNameError> {
        if !self.is_subdomain_of(parent) {
            return Err(DomainNameError::Argument {
                param: "parent",
                detail: format!("'{self}' is not a subdomain of the parent domain '{parent}'"),
            });
        }
        if parent.is_root() {
            return Ok(self.text().to_string());
        }

        let text = self.text();
        Ok(text[..text.len() - parent.text().len() - 1].to_string())
    }

    /// The rightmost label, or `None` for the root.
    pub fn tld(&self) -> Option<Self> {
        match self.text().rfind('.') {
            _ if self.is_root() => None,
            Some(dot) => Some(Self::from_valid(&self.text()[dot + 1..])),
            None => Some(self.clone()),
        }
    }

    /// This name minus its leftmost label, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        match self.text().find('.') {
            _ if self.is_root() => None,
            Some(dot) => Some(Self::from_valid(&self.text()[dot + 1..])),
            None => Some(Self::ROOT),
        }
    }

    pub fn label_count(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.text().bytes().filter(|b| *b == b'.').count() + 1
        }
    }

    /// The label at `index`, counted from the left.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels().nth(index)
    }

    /// Labels from left to right.
    pub fn labels(&self) -> Labels<'_> {
        Labels::new(self.text())
    }

    /// Ancestors from the immediate parent up to and including the root.
    pub fn parents(&self) -> Parents {
        Parents::new(self.clone())
    }

    /// This name followed by [`DomainName::parents`].
    pub fn this_and_parents(&self) -> ThisAndParents {
        ThisAndParents::new(self.clone())
    }
}

fn is_rooted(text: &str) -> bool {
    text.ends_with('.') && !text.ends_with("..")
}

fn wildcard_extension(subdomain: &str) -> DomainNameError {
    DomainNameError::Argument {
        param: "subdomain",
        detail: format!(
            "Cannot add '{subdomain}' to a wildcard name - wildcards are only valid as the leftmost label"
        ),
    }
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '*' | '-' | '.' | '_')
}

fn is_valid_label(label: &str) -> bool {
    (1..=MAX_LABEL_LENGTH).contains(&label.len())
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

/// `^(\*|label)(\.label)*$`
fn is_valid(text: &str) -> bool {
    text.split('.')
        .enumerate()
        .all(|(i, label)| (i == 0 && label == "*") || is_valid_label(label))
}

/// Explains why `text` failed [`is_valid`]. Checks run in a fixed order and
/// the first one that applies wins.
fn diagnose(text: &str) -> String {
    if text.starts_with('.') {
        return "The domain name cannot start with an empty label".to_string();
    }

    if let Some((i, c)) = text.chars().enumerate().find(|(_, c)| !is_allowed_char(*c)) {
        return format!(
            "The character '{c}' at position {i} is not valid in a domain name - only alphanumeric ASCII characters, *, -, . and _ are valid"
        );
    }

    // Only ASCII remains, so byte offsets are character positions.
    if let Some(i) = text.bytes().skip(1).position(|b| b == b'*') {
        return format!(
            "A wildcard can only appear as the first label - found a '*' at character {}",
            i + 1
        );
    }

    let mut start = 0;
    for label in text.split('.') {
        if label.is_empty() {
            return format!(
                "Domain name labels cannot be zero length - the label starting at character {start} has zero length"
            );
        }
        if label.len() > MAX_LABEL_LENGTH {
            return format!(
                "Domain name labels cannot be greater than {MAX_LABEL_LENGTH} characters long - the label '{label}' starting at character {start} is {} characters",
                label.len()
            );
        }
        if label.starts_with('-') || label.ends_with('-') {
            return format!(
                "Domain name labels cannot start or end with '-' - found '{label}' starting at character {start}"
            );
        }
        if label != "*" && label.contains('*') {
            return "A wildcard must be the entire first label".to_string();
        }
        start += label.len() + 1;
    }

    "Unknown issue".to_string()
}

pub(crate) fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

impl PartialEq for DomainName {
    fn eq(&self, other: &Self) -> bool {
        self.is_root() == other.is_root() && self.text().eq_ignore_ascii_case(other.text())
    }
}

impl Eq for DomainName {}

impl Hash for DomainName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.as_str().bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl PartialOrd for DomainName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DomainName {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_ascii_case(self.text(), other.text())
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DomainName").field(&self.as_str()).finish()
    }
}

impl FromStr for DomainName {
    type Err = DomainNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for DomainName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DomainName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
