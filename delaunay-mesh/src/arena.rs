use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Append-only storage addressed by typed ids.
///
/// Removing an element leaves a hole behind so ids are never reused and
/// iteration always follows insertion order.
#[derive(Debug)]
pub struct Arena<T> {
    data: Vec<Option<T>>,
    len: usize,
}

pub struct ArenaId<Tag> {
    ix: usize,
    tag: PhantomData<Tag>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            data: vec![],
            len: 0,
        }
    }

    pub fn push(&mut self, v: T) -> ArenaId<T> {
        self.data.push(Some(v));
        self.len += 1;
        ArenaId::new(self.data.len() - 1)
    }

    pub fn remove(&mut self, id: ArenaId<T>) -> Option<T> {
        let v = self.data.get_mut(id.ix)?.take();
        if v.is_some() {
            self.len -= 1;
        }
        v
    }

    pub fn get(&self, id: ArenaId<T>) -> Option<&T> {
        self.data.get(id.ix)?.as_ref()
    }

    pub fn get_mut(&mut self, id: ArenaId<T>) -> Option<&mut T> {
        self.data.get_mut(id.ix)?.as_mut()
    }

    pub fn contains(&self, id: ArenaId<T>) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ArenaId<T>, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(ix, v)| v.as_ref().map(|v| (ArenaId::new(ix), v)))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena::new()
    }
}

impl<T> Index<ArenaId<T>> for Arena<T> {
    type Output = T;

    fn index(&self, ix: ArenaId<T>) -> &Self::Output {
        self.get(ix).expect("stale arena id")
    }
}

impl<T> IndexMut<ArenaId<T>> for Arena<T> {
    fn index_mut(&mut self, ix: ArenaId<T>) -> &mut T {
        self.get_mut(ix).expect("stale arena id")
    }
}

impl<Tag> ArenaId<Tag> {
    fn new(ix: usize) -> Self {
        ArenaId {
            ix,
            tag: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.ix
    }
}

impl<T> Copy for ArenaId<T> {}
impl<T> Clone for ArenaId<T> {
    fn clone(&self) -> Self {
        ArenaId {
            ix: self.ix,
            tag: self.tag,
        }
    }
}

impl<T> PartialEq for ArenaId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ix == other.ix
    }
}
impl<T> Eq for ArenaId<T> {}

impl<T> Hash for ArenaId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ix.hash(state);
    }
}

impl<T> fmt::Debug for ArenaId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.ix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_keeps_ids_stable() {
        let mut arena = Arena::new();
        let a = arena.push('a');
        let b = arena.push('b');
        let c = arena.push('c');

        assert_eq!(arena.remove(b), Some('b'));
        assert_eq!(arena.remove(b), None);
        assert_eq!(arena.len(), 2);

        let d = arena.push('d');
        assert_ne!(d, b);
        assert_eq!(arena[a], 'a');
        assert_eq!(arena[c], 'c');
        assert!(!arena.contains(b));

        let live: Vec<_> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(live, vec!['a', 'c', 'd']);
    }
}
