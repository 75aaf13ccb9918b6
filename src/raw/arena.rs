use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage addressed by [`Handle`]. Freed slots are recycled LIFO.
///
/// Every slot carries a generation that changes whenever its occupant is
/// taken, so a handle saved together with its generation can tell a reused
/// slot from the one it was issued for.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            generations: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    /// Makes sure the next `alloc()` will not need to grow the slot vector.
    pub(crate) fn try_reserve_one(&mut self) -> Result<(), TryReserveError> {
        if self.free.is_empty() {
            self.slots.try_reserve(1)?;
            self.generations.try_reserve(1)
        } else {
            Ok(())
        }
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle.
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            let h = Handle::try_from_index(self.slots.len())
                .unwrap_or_else(|| panic!("`Arena::alloc()` - arena is at maximum capacity ({})", Handle::COUNT));
            self.slots.push(Some(element));
            self.generations.push(0);
            h
        }
    }

    /// Returns true if `handle` names a live slot.
    #[inline]
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        matches!(self.slots.get(handle.to_index()), Some(Some(_)))
    }

    /// Returns the current generation of the slot at `handle`.
    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> u32 {
        self.generations[handle.to_index()]
    }

    /// Marks the occupant of `handle` as replaced without freeing the slot.
    pub(crate) fn bump_generation(&mut self, handle: Handle) {
        let generation = &mut self.generations[handle.to_index()];
        *generation = generation.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns a mutable reference to an element by handle from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `Arena<T>`.
    /// - No other reference to the slot at `handle` may exist for `'a`.
    #[inline]
    pub(crate) unsafe fn get_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut T {
        // SAFETY: Caller guarantees ptr is valid. `as_mut_ptr` does not invalidate
        // references previously handed out for other slots.
        unsafe {
            let index = handle.to_index();
            assert!(index < (*ptr).slots.len(), "`Arena::get_mut_ptr()` - `handle` is invalid!");
            let slot = &mut *(*ptr).slots.as_mut_ptr().add(index);
            slot.as_mut().expect("`Arena::get_mut_ptr()` - `handle` is invalid!")
        }
    }

    /// Borrows two distinct slots mutably at once.
    pub(crate) fn get_pair_mut(&mut self, a: Handle, b: Handle) -> (&mut T, &mut T) {
        let (i, j) = (a.to_index(), b.to_index());
        assert_ne!(i, j, "`Arena::get_pair_mut()` - handles must differ!");

        let (low, high) = if i < j { (i, j) } else { (j, i) };
        let (head, tail) = self.slots.split_at_mut(high);
        let low_ref = head[low].as_mut().expect("`Arena::get_pair_mut()` - `handle` is invalid!");
        let high_ref = tail[0].as_mut().expect("`Arena::get_pair_mut()` - `handle` is invalid!");

        if i < j {
            (low_ref, high_ref)
        } else {
            (high_ref, low_ref)
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.bump_generation(handle);
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.generations.clear();
        self.free.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn arena_capacity() {
        let arena: Arena<u32> = Arena::with_capacity(10);
        assert_eq!(arena.capacity(), 10);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        assert_eq!(arena.take(a), 1);
        assert!(!arena.contains(a));
        assert!(arena.contains(b));

        let c = arena.alloc(3);
        assert_eq!(c, a);
        assert_eq!(*arena.get(c), 3);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn reused_slots_change_generation() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        let first = arena.generation(a);

        arena.take(a);
        let b = arena.alloc(2);
        assert_eq!(b, a);
        assert_ne!(arena.generation(b), first);

        let before = arena.generation(b);
        arena.bump_generation(b);
        assert_ne!(arena.generation(b), before);
        assert_eq!(*arena.get(b), 2);
    }

    #[test]
    fn pair_mut_returns_in_argument_order() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);

        let (x, y) = arena.get_pair_mut(b, a);
        assert_eq!((*x, *y), (2, 1));
        core::mem::swap(x, y);

        assert_eq!(*arena.get(a), 2);
        assert_eq!(*arena.get(b), 1);
    }

    #[test]
    #[should_panic(expected = "`Arena::get_pair_mut()` - handles must differ!")]
    fn pair_mut_rejects_aliasing() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        let _ = arena.get_pair_mut(a, a);
    }

    #[test]
    fn reserve_is_a_no_op_with_free_slots() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        arena.take(a);
        let before = arena.capacity();
        assert!(arena.try_reserve_one().is_ok());
        assert_eq!(arena.capacity(), before);
    }

    #[test]
    #[should_panic(expected = "`Arena::alloc()` - arena is at maximum capacity")]
    fn alloc_past_handle_space_panics() {
        let mut arena: Arena<()> = Arena::new();
        for _ in 0..=Handle::COUNT {
            arena.alloc(());
        }
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    Operation::Get(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        prop_assert_eq!(*arena.get(handle), model[index].1);
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        *arena.get_mut(handle) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        let value1 = arena.take(handle);
                        let (_, value2) = model.swap_remove(index);
                        prop_assert_eq!(value1, value2);
                        prop_assert!(!arena.contains(handle));
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());

                for &(handle, value) in &model {
                    prop_assert!(arena.contains(handle));
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        Get(usize),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => any::<usize>().prop_map(Operation::Get),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            5 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
