#[cfg(test)]
#[path = "sibling_test.rs"]
mod tests;

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// Which reply is selected at each branch point.
///
/// Keys are the id of the message whose replies are being chosen between, or
/// `None` when there is no such message yet. Indexes count from the newest
/// reply: 0 is the last one recorded. Unknown keys read as 0.
pub trait SiblingIndexStore {
    fn sibling_index(&self, message_id: Option<&str>) -> usize;
}

impl<T: SiblingIndexStore + ?Sized> SiblingIndexStore for &T {
    fn sibling_index(&self, message_id: Option<&str>) -> usize {
        (**self).sibling_index(message_id)
    }
}

impl<T: SiblingIndexStore + ?Sized> SiblingIndexStore for Arc<T> {
    fn sibling_index(&self, message_id: Option<&str>) -> usize {
        (**self).sibling_index(message_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiblingIndex {
    unkeyed: Option<usize>,
    indices: HashMap<String, usize>,
}

impl SiblingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, message_id: Option<&str>, index: usize) -> Self {
        self.set(message_id, index);
        self
    }

    pub fn get(&self, message_id: Option<&str>) -> usize {
        match message_id {
            Some(id) => self.indices.get(id).copied().unwrap_or_default(),
            None => self.unkeyed.unwrap_or_default(),
        }
    }

    pub fn set(&mut self, message_id: Option<&str>, index: usize) {
        match message_id {
            Some(id) => {
                self.indices.insert(id.to_string(), index);
            }
            None => self.unkeyed = Some(index),
        }
    }

    /// Forgets every selection, so each branch point shows its newest reply.
    pub fn reset(&mut self) {
        self.unkeyed = None;
        self.indices.clear();
    }

    pub fn len(&self) -> usize {
        self.indices.len() + usize::from(self.unkeyed.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, usize)> {
        self.unkeyed
            .map(|index| (None, index))
            .into_iter()
            .chain(self.indices.iter().map(|(id, index)| (Some(id.as_str()), *index)))
    }
}

impl SiblingIndexStore for SiblingIndex {
    fn sibling_index(&self, message_id: Option<&str>) -> usize {
        self.get(message_id)
    }
}

/// A [`SiblingIndex`] that can be updated from one place while paths are
/// built somewhere else.
///
/// Builders should work on a [`snapshot`](Self::snapshot) so that every
/// lookup during one walk sees the same selections.
#[derive(Debug, Clone, Default)]
pub struct SharedSiblingIndex {
    inner: Arc<RwLock<SiblingIndex>>,
}

impl SharedSiblingIndex {
    pub fn new(index: SiblingIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    pub fn snapshot(&self) -> SiblingIndex {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, message_id: Option<&str>, index: usize) {
        match self.inner.write() {
            Ok(mut guard) => guard.set(message_id, index),
            Err(poisoned) => poisoned.into_inner().set(message_id, index),
        }
    }

    pub fn reset(&self) {
        match self.inner.write() {
            Ok(mut guard) => guard.reset(),
            Err(poisoned) => poisoned.into_inner().reset(),
        }
    }
}
