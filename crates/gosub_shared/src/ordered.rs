//! Insertion-ordered containers.
//!
//! [`OrderedSet`] suppresses duplicates, [`OrderedList`] permits them. Both keep their items in the
//! order they were added, which is what child lists, class lists and slot assignment need. Items
//! are compared with `PartialEq`, membership checks are linear.

use std::fmt::Debug;

/// Ordered container that never holds the same item twice
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedSet<T> {
    items: Vec<T>,
}

/// Ordered container that permits duplicate items
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedList<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Removes every item matching `pred` and returns them together with the index they had before
/// anything was removed.
fn drain_matching<T, F>(items: &mut Vec<T>, mut pred: F) -> Vec<(usize, T)>
where
    F: FnMut(&T) -> bool,
{
    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(items.len());
    for (idx, item) in items.drain(..).enumerate() {
        if pred(&item) {
            removed.push((idx, item));
        } else {
            kept.push(item);
        }
    }
    *items = kept;

    removed
}

macro_rules! shared_accessors {
    ($ty:ident) => {
        impl<T: PartialEq> $ty<T> {
            #[must_use]
            pub fn new() -> Self {
                Self { items: Vec::new() }
            }

            /// Number of items
            #[must_use]
            pub fn len(&self) -> usize {
                self.items.len()
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.items.is_empty()
            }

            /// Returns the item at `index`, or `None` when the index is out of range
            #[must_use]
            pub fn get(&self, index: usize) -> Option<&T> {
                self.items.get(index)
            }

            #[must_use]
            pub fn first(&self) -> Option<&T> {
                self.items.first()
            }

            #[must_use]
            pub fn last(&self) -> Option<&T> {
                self.items.last()
            }

            #[must_use]
            pub fn contains(&self, item: &T) -> bool {
                self.items.contains(item)
            }

            /// Position of the first occurrence of `item`
            #[must_use]
            pub fn index_of(&self, item: &T) -> Option<usize> {
                self.items.iter().position(|i| i == item)
            }

            pub fn iter(&self) -> std::slice::Iter<'_, T> {
                self.items.iter()
            }

            #[must_use]
            pub fn as_slice(&self) -> &[T] {
                &self.items
            }

            pub fn clear(&mut self) {
                self.items.clear();
            }

            /// Removes all items matching `pred`. Returns the removed items with their former indices.
            pub fn remove_where<F>(&mut self, pred: F) -> Vec<(usize, T)>
            where
                F: FnMut(&T) -> bool,
            {
                drain_matching(&mut self.items, pred)
            }

            /// Removes all occurrences of `item`. Returns true when anything was removed.
            pub fn remove(&mut self, item: &T) -> bool {
                !drain_matching(&mut self.items, |i| i == item).is_empty()
            }

            #[must_use]
            pub fn into_vec(self) -> Vec<T> {
                self.items
            }
        }

        impl<'a, T> IntoIterator for &'a $ty<T> {
            type Item = &'a T;
            type IntoIter = std::slice::Iter<'a, T>;

            fn into_iter(self) -> Self::IntoIter {
                self.items.iter()
            }
        }

        impl<T> IntoIterator for $ty<T> {
            type Item = T;
            type IntoIter = std::vec::IntoIter<T>;

            fn into_iter(self) -> Self::IntoIter {
                self.items.into_iter()
            }
        }
    };
}

shared_accessors!(OrderedSet);
shared_accessors!(OrderedList);

impl<T: PartialEq> OrderedSet<T> {
    /// Adds `item` at the end, unless it is already present
    pub fn append(&mut self, item: T) {
        if !self.contains(&item) {
            self.items.push(item);
        }
    }

    /// Adds `item` at the front, unless it is already present
    pub fn prepend(&mut self, item: T) {
        if !self.contains(&item) {
            self.items.insert(0, item);
        }
    }

    /// Inserts `item` before `index`. Nothing happens when the item is already present or the
    /// index lies outside `0..=len`.
    pub fn insert(&mut self, index: usize, item: T) {
        if index > self.items.len() || self.contains(&item) {
            return;
        }
        self.items.insert(index, item);
    }

    /// Replaces `target` with `new`. See [`OrderedSet::replace_where`].
    pub fn replace(&mut self, target: &T, new: T) -> bool {
        self.replace_where(|item| item == target, new)
    }

    /// Replaces the item at `index` with `new`
    pub fn replace_at(&mut self, index: usize, new: T) -> bool {
        if index >= self.items.len() {
            return false;
        }
        let mut position = 0;
        self.replace_where(
            |_| {
                let hit = position == index;
                position += 1;
                hit
            },
            new,
        )
    }

    /// The first item that matches `pred` or equals `new` becomes `new`. Every other match and
    /// every other copy of `new` is removed. Returns false when nothing matched.
    pub fn replace_where<F>(&mut self, mut pred: F, new: T) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let hits: Vec<bool> = self.items.iter().map(|item| pred(item) || *item == new).collect();
        let Some(first) = hits.iter().position(|hit| *hit) else {
            return false;
        };

        let mut new = Some(new);
        let mut kept = Vec::with_capacity(self.items.len());
        for (idx, item) in self.items.drain(..).enumerate() {
            if idx == first {
                if let Some(new) = new.take() {
                    kept.push(new);
                }
            } else if !hits[idx] {
                kept.push(item);
            }
        }
        self.items = kept;

        true
    }

    /// Replaces the whole content, dropping duplicates from `items`
    pub fn set_items<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.items.clear();
        for item in items {
            self.append(item);
        }
    }
}

impl<T: PartialEq + Clone> OrderedList<T> {
    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Inserts `item` before `index`. Nothing happens when the index lies outside `0..=len`.
    pub fn insert(&mut self, index: usize, item: T) {
        if index > self.items.len() {
            return;
        }
        self.items.insert(index, item);
    }

    /// Replaces every occurrence of `target` with `new`
    pub fn replace(&mut self, target: &T, new: T) -> bool {
        let target = target.clone();
        self.replace_where(|item| *item == target, new)
    }

    pub fn replace_at(&mut self, index: usize, new: T) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    /// Replaces every item matching `pred` with a copy of `new`
    pub fn replace_where<F>(&mut self, mut pred: F, new: T) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut replaced = false;
        for item in &mut self.items {
            if pred(item) {
                *item = new.clone();
                replaced = true;
            }
        }

        replaced
    }
}

impl<T: PartialEq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.set_items(iter);
        set
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: PartialEq> From<Vec<T>> for OrderedSet<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T> From<Vec<T>> for OrderedList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}
