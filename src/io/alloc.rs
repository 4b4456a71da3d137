//! Typed bump allocator over a growable [`MappedFile`] (C2).
//!
//! Every allocation extends the file; there is no `deallocate` beyond a
//! no-op, since the index is an append-only arena (I4). `Alloc<T>` is
//! rebindable across element types while sharing the same backing file,
//! matching the original allocator's `mmap_allocator<T>` template, which
//! is itself an `std::allocator` subclass that calls `m_file->grow(...)`.

use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::sync::Arc;

use crate::error::Result;
use crate::io::mmap_file::MappedFile;

pub struct Alloc<T> {
    file: Arc<MappedFile>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Alloc<T> {
    fn clone(&self) -> Self {
        Alloc {
            file: Arc::clone(&self.file),
            _marker: PhantomData,
        }
    }
}

impl<T> Alloc<T> {
    pub fn new(file: Arc<MappedFile>) -> Self {
        Alloc {
            file,
            _marker: PhantomData,
        }
    }

    /// Rebinds this allocator to a different element type over the same
    /// backing file.
    pub fn rebind<U>(&self) -> Alloc<U> {
        Alloc {
            file: Arc::clone(&self.file),
            _marker: PhantomData,
        }
    }

    pub fn file(&self) -> &Arc<MappedFile> {
        &self.file
    }

    /// Current file size divided by this type's stride, floored; an upper
    /// bound on how many `T`s the arena currently holds (not a capacity
    /// reservation).
    pub fn max_size(&self) -> u64 {
        self.file.size() / size_of::<T>() as u64
    }

    /// Reserves room for `n` contiguous `T`s and returns the file offset of
    /// the first one. The reservation pads for `align_of::<T>()` slack so
    /// the returned offset can always be aligned correctly; mmap bases are
    /// page-aligned, so aligning an offset is equivalent to aligning the
    /// resulting pointer.
    pub fn allocate(&self, n: usize) -> Result<u64> {
        let stride = size_of::<T>() as u64;
        let align = align_of::<T>() as u64;
        let requested = n as u64 * stride + align;
        let old_size = self.file.grow(requested)?;

        let misalignment = old_size % align;
        let offset = if misalignment == 0 {
            old_size
        } else {
            old_size + (align - misalignment)
        };
        Ok(offset)
    }

    /// Allocates a single `T` and initializes it in place via `init`.
    /// Returns the file offset of the new record.
    pub fn emplace(&self, init: T) -> Result<u64> {
        let offset = self.allocate(1)?;
        let slot = self.get_mut(offset)?;
        *slot = init;
        Ok(offset)
    }

    /// Borrows the `T` stored at `offset`.
    ///
    /// # Safety contract
    /// Callers must only pass offsets previously returned by `allocate` or
    /// `emplace` on an `Alloc<T>` for this same concrete `T`; the region is
    /// otherwise uninterpreted bytes.
    pub fn get(&self, offset: u64) -> Result<&T> {
        let bytes = self.file.read(offset, size_of::<T>() as u64)?;
        Ok(unsafe { &*(bytes.as_ptr() as *const T) })
    }

    /// Mutable counterpart of [`Alloc::get`].
    pub fn get_mut(&self, offset: u64) -> Result<&mut T> {
        let bytes = self.file.read_mut(offset, size_of::<T>() as u64)?;
        Ok(unsafe { &mut *(bytes.as_mut_ptr() as *mut T) })
    }
}
