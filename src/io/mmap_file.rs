//! Growable memory-mapped random access file (C1).
//!
//! Grounded in two places: the crate's existing `io::mmap_blob::MmapData`
//! (the `unsafe impl Send + Sync` wrapper around a raw mapped pointer, and
//! manual `libc::mmap`/`munmap`) for the shape of the unsafe core, and
//! `astrolib::io::posix_mmap_file` for the growable-append algorithm: extend
//! the file on disk, then `mremap` (or a fresh `mmap` if nothing is mapped
//! yet) to cover the new size.
//!
//! Three defects flagged in the original are fixed here rather than carried
//! over (see `SPEC_FULL.md` §11): the `PROT_READ | writable ? PROT_WRITE : 0`
//! precedence bug, the `pos + sz - 1 < size` zero-size wraparound in range
//! checks, and the `-1`-sentinel spinlock guarding `grow` (replaced by a
//! plain `Mutex`).

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicPtr, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{MapIndexError, Result};

#[cfg(all(unix, feature = "mmap"))]
use std::os::unix::io::AsRawFd;

/// A memory-mapped file supporting read-only or growable writable access.
///
/// Non-copyable (no `Clone`/`Copy`); ordinary Rust move semantics already
/// give the "moveable, donor nulled" behaviour §4.1 asks for, since a moved
/// `MappedFile` cannot be used or dropped from its old binding.
pub struct MappedFile {
    path: PathBuf,
    file: File,
    writable: bool,
    data: AtomicPtr<u8>,
    /// Capacity currently covered by the mapping (may exceed `file_size`).
    mapped_len: AtomicUsize,
    /// Logical size of the arena: the high-water mark of bytes allocated
    /// through `grow`/`read_mut`.
    file_size: AtomicU64,
    /// Serializes `grow` so two concurrent growers never race the remap.
    grow_lock: Mutex<()>,
}

unsafe impl Send for MappedFile {}
unsafe impl Sync for MappedFile {}

#[cfg(all(unix, feature = "mmap"))]
fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE).max(4096) as usize }
}

impl MappedFile {
    /// Opens `path`, mapping it read-only or as a growable writable arena.
    ///
    /// `mapping_size` is an optional initial capacity hint for writable
    /// files; it is advisory only (a writable file still grows on demand).
    #[cfg(all(unix, feature = "mmap"))]
    pub fn open<P: AsRef<Path>>(path: P, writable: bool, mapping_size: Option<u64>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = if writable {
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)
                .map_err(|e| MapIndexError::io(&path, e))?
        } else {
            OpenOptions::new()
                .read(true)
                .open(&path)
                .map_err(|e| MapIndexError::io(&path, e))?
        };

        let disk_len = file
            .metadata()
            .map_err(|e| MapIndexError::io(&path, e))?
            .len();

        let initial_map_len = if writable {
            mapping_size.unwrap_or(disk_len).max(disk_len)
        } else {
            disk_len
        };

        let data = if initial_map_len == 0 {
            std::ptr::null_mut()
        } else {
            if writable && initial_map_len > disk_len {
                file.set_len(initial_map_len)
                    .map_err(|e| MapIndexError::io(&path, e))?;
            }
            let prot = libc::PROT_READ | if writable { libc::PROT_WRITE } else { 0 };
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    initial_map_len as usize,
                    prot,
                    libc::MAP_SHARED,
                    file.as_raw_fd(),
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(MapIndexError::io(&path, std::io::Error::last_os_error()));
            }
            ptr as *mut u8
        };

        Ok(MappedFile {
            path,
            file,
            writable,
            data: AtomicPtr::new(data),
            mapped_len: AtomicUsize::new(initial_map_len as usize),
            file_size: AtomicU64::new(disk_len),
            grow_lock: Mutex::new(()),
        })
    }

    #[cfg(not(all(unix, feature = "mmap")))]
    pub fn open<P: AsRef<Path>>(path: P, _writable: bool, _mapping_size: Option<u64>) -> Result<Self> {
        Err(MapIndexError::io(
            path.as_ref(),
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "memory mapping requires the `mmap` feature on a unix target",
            ),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    /// Current logical size of the arena.
    pub fn size(&self) -> u64 {
        self.file_size.load(Ordering::Acquire)
    }

    /// Reserves `delta` additional bytes at the end of the arena and
    /// returns the previous size. Linearizable: concurrent `grow` calls are
    /// serialized by `grow_lock` and never interleave.
    #[cfg(all(unix, feature = "mmap"))]
    pub fn grow(&self, delta: u64) -> Result<u64> {
        if !self.writable {
            return Err(MapIndexError::io(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "file is read-only"),
            ));
        }
        let _guard = self.grow_lock.lock().unwrap_or_else(|e| e.into_inner());

        let old_size = self.file_size.load(Ordering::Acquire);
        let new_size = old_size + delta;
        let mapped_len = self.mapped_len.load(Ordering::Acquire) as u64;

        if new_size > mapped_len {
            self.file
                .set_len(new_size)
                .map_err(|e| MapIndexError::io(&self.path, e))?;

            let old_ptr = self.data.load(Ordering::Acquire);
            let new_ptr = if old_ptr.is_null() {
                unsafe {
                    libc::mmap(
                        std::ptr::null_mut(),
                        new_size as usize,
                        libc::PROT_READ | libc::PROT_WRITE,
                        libc::MAP_SHARED,
                        self.file.as_raw_fd(),
                        0,
                    )
                }
            } else {
                unsafe {
                    libc::mremap(
                        old_ptr as *mut libc::c_void,
                        mapped_len as usize,
                        new_size as usize,
                        libc::MREMAP_MAYMOVE,
                    )
                }
            };

            if new_ptr == libc::MAP_FAILED {
                return Err(MapIndexError::io(&self.path, std::io::Error::last_os_error()));
            }

            self.data.store(new_ptr as *mut u8, Ordering::Release);
            self.mapped_len.store(new_size as usize, Ordering::Release);
        }

        self.file_size.store(new_size, Ordering::Release);
        Ok(old_size)
    }

    #[cfg(not(all(unix, feature = "mmap")))]
    pub fn grow(&self, _delta: u64) -> Result<u64> {
        unreachable!("open() fails first on this target")
    }

    /// Read-only view of `[pos, pos + size)`. Empty `size` returns an empty
    /// slice immediately, sidestepping the source's `pos + sz - 1` underflow
    /// for zero-length reads.
    pub fn read(&self, pos: u64, size: u64) -> Result<&[u8]> {
        if size == 0 {
            return Ok(&[]);
        }
        let limit = self.file_size.load(Ordering::Acquire);
        if pos.checked_add(size).map_or(true, |end| end > limit) {
            return Err(MapIndexError::range(pos, size, limit));
        }
        let data = self.data.load(Ordering::Acquire);
        debug_assert!(!data.is_null());
        Ok(unsafe { std::slice::from_raw_parts(data.add(pos as usize), size as usize) })
    }

    /// Mutable view of `[pos, pos + size)`, growing the arena first if the
    /// requested range extends past the current size.
    #[allow(clippy::mut_from_ref)]
    pub fn read_mut(&self, pos: u64, size: u64) -> Result<&mut [u8]> {
        if size == 0 {
            return Ok(&mut []);
        }
        let limit = self.file_size.load(Ordering::Acquire);
        let end = pos
            .checked_add(size)
            .ok_or_else(|| MapIndexError::range(pos, size, limit))?;
        if end > limit {
            self.grow(end - limit)?;
        }
        let data = self.data.load(Ordering::Acquire);
        debug_assert!(!data.is_null());
        Ok(unsafe { std::slice::from_raw_parts_mut(data.add(pos as usize), size as usize) })
    }

    /// Hints the kernel that `[pos, pos + size)` will be read soon, rounded
    /// outward to page boundaries. Best-effort; `false` means the hint was
    /// not applied (e.g. unsupported platform), never an error.
    #[cfg(all(unix, feature = "mmap"))]
    pub fn readahead(&self, pos: u64, size: u64) -> bool {
        let data = self.data.load(Ordering::Acquire);
        if data.is_null() || size == 0 {
            return false;
        }
        let page = page_size() as u64;
        let aligned_pos = (pos / page) * page;
        let aligned_end = ((pos + size + page - 1) / page) * page;
        let mapped_len = self.mapped_len.load(Ordering::Acquire) as u64;
        let aligned_end = aligned_end.min(mapped_len);
        if aligned_end <= aligned_pos {
            return false;
        }
        let ret = unsafe {
            libc::posix_madvise(
                data.add(aligned_pos as usize) as *mut libc::c_void,
                (aligned_end - aligned_pos) as usize,
                libc::POSIX_MADV_WILLNEED,
            )
        };
        ret == 0
    }

    #[cfg(not(all(unix, feature = "mmap")))]
    pub fn readahead(&self, _pos: u64, _size: u64) -> bool {
        false
    }
}

#[cfg(all(unix, feature = "mmap"))]
impl Drop for MappedFile {
    fn drop(&mut self) {
        let data = *self.data.get_mut();
        let mapped_len = *self.mapped_len.get_mut();
        if !data.is_null() && mapped_len > 0 {
            unsafe {
                libc::munmap(data as *mut libc::c_void, mapped_len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn zero_size_read_never_underflows() {
        let tmp = NamedTempFile::new().unwrap();
        let file = MappedFile::open(tmp.path(), false, None).unwrap();
        assert_eq!(file.read(0, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn grow_extends_size_and_is_readable() {
        let tmp = NamedTempFile::new().unwrap();
        let file = MappedFile::open(tmp.path(), true, None).unwrap();
        assert_eq!(file.size(), 0);

        let old_size = file.grow(128).unwrap();
        assert_eq!(old_size, 0);
        assert_eq!(file.size(), 128);

        let region = file.read_mut(0, 128).unwrap();
        region.copy_from_slice(&[7u8; 128]);
        assert_eq!(file.read(0, 128).unwrap(), &[7u8; 128][..]);
    }

    #[test]
    fn read_mut_beyond_size_grows_the_arena() {
        let tmp = NamedTempFile::new().unwrap();
        let file = MappedFile::open(tmp.path(), true, None).unwrap();
        let region = file.read_mut(64, 16).unwrap();
        region.copy_from_slice(b"0123456789abcdef");
        assert_eq!(file.size(), 80);
        assert_eq!(file.read(64, 16).unwrap(), b"0123456789abcdef");
    }

    #[test]
    fn read_past_size_is_a_range_error() {
        let tmp = NamedTempFile::new().unwrap();
        let file = MappedFile::open(tmp.path(), true, None).unwrap();
        file.grow(8).unwrap();
        assert!(file.read(0, 16).is_err());
    }

    #[test]
    fn remap_preserves_previously_written_bytes() {
        // S6-style remap stability check for the file layer itself.
        let tmp = NamedTempFile::new().unwrap();
        let file = MappedFile::open(tmp.path(), true, None).unwrap();
        file.grow(16).unwrap();
        file.read_mut(0, 16).unwrap().copy_from_slice(&[9u8; 16]);

        // Force a relocation by growing well past the current mapping.
        file.grow(1 << 20).unwrap();

        assert_eq!(file.read(0, 16).unwrap(), &[9u8; 16][..]);
    }
}
