use std::fmt;
use std::slice;

use serde::de::{self, Deserialize, Deserializer};
use serde::Serialize;
use thiserror::Error;

/// Values that carry an identifier unique within their sequence.
/// 在所屬序列中擁有唯一識別碼的值。
pub trait Identified {
    type Id: Copy + Eq + fmt::Debug + fmt::Display;

    fn id(&self) -> Self::Id;
}

/// A reorder index fell outside the sequence.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("index {index} is out of range for {len} items")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

/// Two items of one sequence share an id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("duplicate id {id}")]
pub struct DuplicateId {
    pub id: String,
}

/// Ordered, id-unique list of children. Insertion order is display order.
/// 具順序且識別碼不重複的子項清單；插入順序即顯示順序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Sequence<T> {
    items: Vec<T>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified> Sequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 項目數量。 / Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否為空。 / Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn ids(&self) -> Vec<T::Id> {
        self.items.iter().map(Identified::id).collect()
    }

    /// 依識別碼取得項目。 / Looks an item up by id.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn position(&self, id: T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.position(id).is_some()
    }

    /// 附加至尾端；若識別碼已存在則回傳 `false`。 / Appends to the end, returning `false` when the id already exists.
    pub fn push(&mut self, item: T) -> bool {
        if self.contains(item.id()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// 移除指定項目；不存在時不做任何事。 / Removes the item with `id`; absent ids are a no-op.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// 將 `from` 位置的項目移到 `to`，其餘項目依序遞補。 / Moves the item at `from` to `to`, shifting the ones in between.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), IndexOutOfRange> {
        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(IndexOutOfRange { index, len });
            }
        }
        if from != to {
            let item = self.items.remove(from);
            self.items.insert(to, item);
        }
        Ok(())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Identified> FromIterator<T> for Sequence<T> {
    /// Later items whose id repeats an earlier one are dropped.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sequence = Self::new();
        for item in iter {
            sequence.push(item);
        }
        sequence
    }
}

impl<T: Identified> TryFrom<Vec<T>> for Sequence<T> {
    type Error = DuplicateId;

    /// Unlike `collect`, a repeated id is an error instead of being dropped.
    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        let mut sequence = Self::new();
        for item in items {
            let id = item.id();
            if !sequence.push(item) {
                return Err(DuplicateId { id: id.to_string() });
            }
        }
        Ok(sequence)
    }
}

impl<'de, T> Deserialize<'de> for Sequence<T>
where
    T: Identified + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Sequence::try_from(items).map_err(de::Error::custom)
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
