use std::{cell::RefCell, rc::Rc};

use crate::{
    datum::Datum,
    types::list::{List, ListBuilder},
};

#[derive(Debug)]
struct ArrayInner {
    origin: i64,
    items: RefCell<Vec<Datum>>,
}

/// A mutable indexed sequence with a user-chosen origin index.
///
/// Index `i` refers to position `i - origin`. Arrays have identity equality:
/// two arrays are equal only when they are the same array, so callers who
/// share them do so intentionally.
#[derive(Debug, Clone)]
pub struct Array {
    inner: Rc<ArrayInner>,
}

impl Array {
    /// Creates an array of `size` empty lists with the given origin.
    #[must_use]
    pub fn new(origin: i64, size: usize) -> Self {
        let items = vec![Datum::List(List::new()); size];
        Self {
            inner: Rc::new(ArrayInner {
                origin,
                items: RefCell::new(items),
            }),
        }
    }

    /// Creates an array holding the elements of `source`, in order.
    #[must_use]
    pub fn from_list(origin: i64, source: &List) -> Self {
        Self {
            inner: Rc::new(ArrayInner {
                origin,
                items: RefCell::new(source.iter().collect()),
            }),
        }
    }

    /// Copies the elements into a fresh list, origin-independent.
    #[must_use]
    pub fn to_list(&self) -> List {
        let mut builder = ListBuilder::new();
        for item in self.inner.items.borrow().iter() {
            builder.push(item.clone());
        }
        builder.finish()
    }

    #[must_use]
    pub fn origin(&self) -> i64 {
        self.inner.origin
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at user index `index`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, index: i64) -> Option<Datum> {
        let slot = index.checked_sub(self.inner.origin)?;
        usize::try_from(slot)
            .ok()
            .and_then(|s| self.inner.items.borrow().get(s).cloned())
    }

    /// Replaces the element at user index `index`. Returns false when out of
    /// range.
    pub fn set(&self, index: i64, value: Datum) -> bool {
        let Some(slot) = index.checked_sub(self.inner.origin) else {
            return false;
        };
        let Ok(slot) = usize::try_from(slot) else {
            return false;
        };
        let mut items = self.inner.items.borrow_mut();
        match items.get_mut(slot) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Clones of all elements, in order.
    #[must_use]
    pub fn items(&self) -> Vec<Datum> {
        self.inner.items.borrow().clone()
    }

    #[must_use]
    pub fn ptr_id(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    /// Identity equality.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Word;

    fn word(s: &str) -> Datum {
        Datum::Word(Word::new(s, false))
    }

    #[test]
    fn new_array_holds_empty_lists() {
        let a = Array::new(1, 3);
        assert_eq!(a.len(), 3);
        assert!(matches!(a.get(1), Some(Datum::List(l)) if l.is_empty()));
    }

    #[test]
    fn indexing_honors_origin() {
        let a = Array::from_list(0, &List::from_vec(vec![word("a"), word("b")]));
        assert_eq!(a.get(0).unwrap().to_display_string(), "a");
        assert_eq!(a.get(1).unwrap().to_display_string(), "b");
        assert!(a.get(2).is_none());
        assert!(a.get(-1).is_none());
    }

    #[test]
    fn set_then_get_roundtrips_across_origin_range() {
        let a = Array::new(5, 4);
        for i in 5..9 {
            assert!(a.set(i, word(&format!("v{i}"))));
            assert_eq!(a.get(i).unwrap().to_display_string(), format!("v{i}"));
        }
        assert!(!a.set(9, word("out")));
        assert!(!a.set(4, word("out")));
    }

    #[test]
    fn arrays_have_identity_equality() {
        let a = Array::new(1, 1);
        let b = Array::new(1, 1);
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn to_list_copies_in_order() {
        let a = Array::from_list(3, &List::from_vec(vec![word("x"), word("y")]));
        let l = a.to_list();
        assert_eq!(l.count(), 2);
        assert_eq!(l.item_at(1).unwrap().to_display_string(), "x");
    }
}
