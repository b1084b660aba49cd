//! Growable output buffer that starts over caller-provided storage.
//!
//! An [`EscapeBuffer`] writes into a borrowed fixed region until it runs out of
//! room, then copies what it has into an owned heap allocation and continues
//! there ("spilling"). The fixed region is never written to after a spill, and
//! is handed back to the caller when the buffer's borrow ends.

use log::{debug, trace};

const MIN_HEAP_CAPACITY: usize = 64;

#[derive(Debug)]
enum Storage<'a> {
    Fixed(&'a mut [u8]),
    Heap(Vec<u8>),
}

/// Escaped output. Content is always ASCII.
#[derive(Debug)]
pub struct EscapeBuffer<'a> {
    storage: Storage<'a>,
    /// For `Heap` storage this always equals the vector's length.
    len: usize,
}

impl<'a> EscapeBuffer<'a> {
    /// Create an empty buffer that writes into `fixed` until it is full.
    pub fn new(fixed: &'a mut [u8]) -> Self {
        EscapeBuffer {
            storage: Storage::Fixed(fixed),
            len: 0,
        }
    }

    /// Create an empty heap-backed buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        EscapeBuffer {
            storage: Storage::Heap(Vec::with_capacity(capacity)),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Fixed(fixed) => fixed.len(),
            Storage::Heap(heap) => heap.capacity(),
        }
    }

    /// Whether the buffer has moved to (or started on) heap storage.
    #[inline]
    pub fn is_spilled(&self) -> bool {
        matches!(self.storage, Storage::Heap(_))
    }

    /// Make room for at least `additional` more bytes.
    ///
    /// Growth at least doubles the current capacity, so appends are amortized
    /// O(1). Existing content is preserved in order.
    ///
    /// # Panics
    /// If the required capacity overflows `usize`.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        let needed = self
            .len
            .checked_add(additional)
            .expect("escape buffer capacity overflow");
        if needed > self.capacity() {
            self.grow(needed);
        }
    }

    #[cold]
    fn grow(&mut self, needed: usize) {
        match &mut self.storage {
            Storage::Fixed(fixed) => {
                let new_capacity = needed
                    .max(fixed.len().saturating_mul(2))
                    .max(MIN_HEAP_CAPACITY);
                let mut heap = Vec::with_capacity(new_capacity);
                heap.extend_from_slice(&fixed[..self.len]);
                debug!(
                    "spilling fixed buffer of {} bytes to heap (capacity {}, copied {} bytes)",
                    fixed.len(),
                    new_capacity,
                    self.len
                );
                self.storage = Storage::Heap(heap);
            }
            Storage::Heap(heap) => {
                let new_capacity = needed
                    .max(heap.capacity().saturating_mul(2))
                    .max(MIN_HEAP_CAPACITY);
                trace!(
                    "growing heap buffer from {} to {} bytes",
                    heap.capacity(),
                    new_capacity
                );
                heap.reserve_exact(new_capacity - heap.len());
            }
        }
    }

    /// Append `bytes` in one go. Callers must keep the content ASCII.
    #[inline]
    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.is_ascii());
        self.reserve(bytes.len());
        let end = self.len + bytes.len();
        match &mut self.storage {
            Storage::Fixed(fixed) => fixed[self.len..end].copy_from_slice(bytes),
            Storage::Heap(heap) => heap.extend_from_slice(bytes),
        }
        self.len = end;
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Fixed(fixed) => &fixed[..self.len],
            Storage::Heap(heap) => heap.as_slice(),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        let bytes = self.as_bytes();
        debug_assert!(bytes.is_ascii());
        // SAFETY: only ASCII bytes are ever appended (see `extend_from_slice`).
        unsafe { core::str::from_utf8_unchecked(bytes) }
    }

    /// Forget the content but keep the current storage.
    #[inline]
    pub fn clear(&mut self) {
        if let Storage::Heap(heap) = &mut self.storage {
            heap.clear();
        }
        self.len = 0;
    }

    /// Detach the content, copying it out of fixed storage if needed.
    pub fn into_vec(self) -> Vec<u8> {
        match self.storage {
            Storage::Fixed(fixed) => fixed[..self.len].to_vec(),
            Storage::Heap(heap) => heap,
        }
    }
}

impl Default for EscapeBuffer<'_> {
    fn default() -> Self {
        EscapeBuffer::with_capacity(0)
    }
}
