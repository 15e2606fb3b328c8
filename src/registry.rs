use alloc::{collections::BTreeMap, vec::Vec};
use core::any::TypeId;

use crate::{
    any::TypeInfo,
    descriptor::{Descriptor, ErasedArgs},
    errors::ResolveErrorKind,
    utils::thread_safety::{BoxAnyThreadSafety, RcThreadSafety},
};

pub(crate) enum Slot {
    Instance(BoxAnyThreadSafety),
    Factory(ErasedArgs),
}

pub(crate) struct Entry {
    pub(crate) descriptor: RcThreadSafety<Descriptor>,
    pub(crate) slot: Slot,
}

/// Entry state copied out of the registry, so that the lock isn't held while constructing
pub(crate) enum Found<T: ?Sized> {
    Instance(RcThreadSafety<T>),
    Factory(ErasedArgs),
}

pub(crate) struct Candidate<T: ?Sized> {
    pub(crate) descriptor: RcThreadSafety<Descriptor>,
    pub(crate) found: Found<T>,
}

impl Entry {
    fn candidate<T: ?Sized + 'static>(&self) -> Result<Candidate<T>, ResolveErrorKind> {
        let found = match &self.slot {
            Slot::Instance(instance) => match self.descriptor.cast::<T>(instance) {
                Some(instance) => Found::Instance(instance),
                None => {
                    return Err(ResolveErrorKind::IncorrectType {
                        expected: TypeInfo::of::<T>(),
                        actual: self.descriptor.type_info,
                    })
                }
            },
            Slot::Factory(args) => Found::Factory(args.clone()),
        };

        Ok(Candidate {
            descriptor: self.descriptor.clone(),
            found,
        })
    }
}

/// Entries of a single container in registration order.
/// Re-registering a key replaces its entry in place, so the key keeps its position.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Entry>,
    index: BTreeMap<TypeId, usize>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, descriptor: RcThreadSafety<Descriptor>, slot: Slot) -> Option<Slot> {
        use alloc::collections::btree_map::Entry::{Occupied, Vacant};

        let entry = Entry { descriptor, slot };
        match self.index.entry(entry.descriptor.type_info.id) {
            Vacant(vacant) => {
                vacant.insert(self.entries.len());
                self.entries.push(entry);
                None
            }
            Occupied(occupied) => {
                let previous = core::mem::replace(&mut self.entries[*occupied.get()], entry);
                Some(previous.slot)
            }
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, type_id: &TypeId) -> Option<&Entry> {
        self.index.get(type_id).map(|&position| &self.entries[position])
    }

    /// First registered strict subtype of `type_id`
    #[inline]
    #[must_use]
    pub(crate) fn find_subtype(&self, type_id: &TypeId) -> Option<&Entry> {
        self.subtypes(*type_id).next()
    }

    #[inline]
    pub(crate) fn subtypes(&self, type_id: TypeId) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter().filter(move |entry| entry.descriptor.is_subtype_of(&type_id))
    }

    /// Whether `type_id` or one of its subtypes is registered
    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, type_id: &TypeId) -> bool {
        self.index.contains_key(type_id) || self.find_subtype(type_id).is_some()
    }

    /// Local candidate for `T`: the exact entry if present, otherwise the first registered subtype
    pub(crate) fn candidate<T: ?Sized + 'static>(&self) -> Result<Option<Candidate<T>>, ResolveErrorKind> {
        let type_id = TypeId::of::<T>();
        match self.get(&type_id).or_else(|| self.find_subtype(&type_id)) {
            Some(entry) => entry.candidate::<T>().map(Some),
            None => Ok(None),
        }
    }

    /// Candidates of every strict subtype of `T` in registration order
    pub(crate) fn subtype_candidates<T: ?Sized + 'static>(&self) -> Result<Vec<Candidate<T>>, ResolveErrorKind> {
        self.subtypes(TypeId::of::<T>()).map(Entry::candidate::<T>).collect()
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
