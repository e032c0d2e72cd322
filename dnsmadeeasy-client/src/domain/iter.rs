//! Lazy walks over the structure of a [`DomainName`].
//!
//! All iterators are `Clone`; calling the producing method again starts a
//! fresh walk from the original name.

use std::str::Split;

use super::DomainName;

/// Labels of a name, left to right. Empty for the root.
#[derive(Debug, Clone)]
pub struct Labels<'a> {
    inner: Option<Split<'a, char>>,
}

impl<'a> Labels<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self {
            inner: (!text.is_empty()).then(|| text.split('.')),
        }
    }
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }
}

/// Ancestors of a name, nearest first, ending with the root.
#[derive(Debug, Clone)]
pub struct Parents {
    current: Option<DomainName>,
}

impl Parents {
    pub(super) fn new(name: DomainName) -> Self {
        Self {
            current: Some(name),
        }
    }
}

impl Iterator for Parents {
    type Item = DomainName;

    fn next(&mut self) -> Option<Self::Item> {
        let parent = self.current.as_ref()?.parent();
        self.current.clone_from(&parent);
        parent
    }
}

/// A name followed by its ancestors.
#[derive(Debug, Clone)]
pub struct ThisAndParents {
    next: Option<DomainName>,
}

impl ThisAndParents {
    pub(super) fn new(name: DomainName) -> Self {
        Self { next: Some(name) }
    }
}

impl Iterator for ThisAndParents {
    type Item = DomainName;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}
