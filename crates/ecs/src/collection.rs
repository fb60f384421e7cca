use ribbit_common::ObjectId;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Items a [`Collection`] can hold: they know their id and can be viewed as
/// their concrete type.
pub trait Identified {
    fn id(&self) -> ObjectId;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("an item with id {0} is already in the collection")]
    DuplicateId(ObjectId),
}

/// Insertion-ordered container indexed by id and by runtime type.
///
/// Items live in a `Vec` in insertion order. Two side indexes are kept in
/// step with it: id -> position, and concrete type -> ids of that type in
/// insertion order.
#[derive(Debug)]
pub struct Collection<T> {
    items: Vec<T>,
    index: HashMap<ObjectId, usize>,
    by_type: HashMap<TypeId, Vec<ObjectId>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            by_type: HashMap::new(),
        }
    }
}

impl<T: Identified> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Fails if an item with the same id is present.
    pub fn add(&mut self, item: T) -> Result<ObjectId, CollectionError> {
        let id = item.id();
        if self.index.contains_key(&id) {
            return Err(CollectionError::DuplicateId(id));
        }
        let type_id = item.as_any().type_id();
        self.index.insert(id, self.items.len());
        self.by_type.entry(type_id).or_default().push(id);
        self.items.push(item);
        Ok(id)
    }

    /// Remove by id. The remaining items keep their relative order.
    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        let pos = self.index.remove(&id)?;
        let item = self.items.remove(pos);
        for later in &self.items[pos..] {
            if let Some(p) = self.index.get_mut(&later.id()) {
                *p -= 1;
            }
        }
        let type_id = item.as_any().type_id();
        if let Some(ids) = self.by_type.get_mut(&type_id) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_type.remove(&type_id);
            }
        }
        Some(item)
    }

    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.index.get(&id).map(|&pos| &mut self.items[pos])
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.items.iter().map(Identified::id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// First item (in insertion order) whose concrete type is `U`.
    pub fn first_of<U: Any>(&self) -> Option<&U> {
        let id = *self.by_type.get(&TypeId::of::<U>())?.first()?;
        self.get(id)?.as_any().downcast_ref::<U>()
    }

    pub fn first_of_mut<U: Any>(&mut self) -> Option<&mut U> {
        let id = *self.by_type.get(&TypeId::of::<U>())?.first()?;
        self.get_mut(id)?.as_any_mut().downcast_mut::<U>()
    }

    /// Every item of concrete type `U`, in insertion order.
    pub fn all_of<U: Any>(&self) -> impl Iterator<Item = &U> {
        self.by_type
            .get(&TypeId::of::<U>())
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(*id))
            .filter_map(|item| item.as_any().downcast_ref::<U>())
    }

    pub fn all_of_mut<U: Any>(&mut self) -> impl Iterator<Item = &mut U> {
        self.items
            .iter_mut()
            .filter_map(|item| item.as_any_mut().downcast_mut::<U>())
    }

    pub fn count_of<U: Any>(&self) -> usize {
        self.by_type.get(&TypeId::of::<U>()).map_or(0, Vec::len)
    }

    pub fn has_type<U: Any>(&self) -> bool {
        self.count_of::<U>() > 0
    }

    pub fn map<R>(&self, f: impl FnMut(&T) -> R) -> Vec<R> {
        self.items.iter().map(f).collect()
    }

    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| pred(item))
    }

    pub fn find_mut(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<&mut T> {
        self.items.iter_mut().find(|item| pred(item))
    }

    pub fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<&T> {
        self.items.iter().filter(|item| pred(item)).collect()
    }

    /// Keep items matching `pred`; return the rest in insertion order.
    pub fn retain(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        let doomed: Vec<ObjectId> = self
            .items
            .iter()
            .filter(|item| !pred(item))
            .map(Identified::id)
            .collect();
        doomed.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Remove and return everything in insertion order.
    pub fn drain(&mut self) -> Vec<T> {
        self.index.clear();
        self.by_type.clear();
        std::mem::take(&mut self.items)
    }

    pub fn clear(&mut self) {
        self.drain();
    }
}

impl<'a, T: Identified> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Identified> IntoIterator for &'a mut Collection<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
