//! Large-page provider: a bounded resident pool of large pages backed by a
//! larger on-disk directory, with frequency-gated, hysteresis-protected
//! swapping between the two.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::key::Key;
use crate::large_page::LargePage;

/// Per-directory-entry bookkeeping: an access-frequency counter and, if
/// resident, which RAM slot currently backs it.
#[derive(Debug, Clone, Copy, Default)]
struct DirectoryEntry {
    frequency: u64,
    resident_slot: Option<usize>,
}

/// Distinguishes a pure lookup from an admission attempt. Both drive the
/// same swap logic; only the caller's handling of a `None` result differs
/// (miss vs. dropped update).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// A `Cache::get` lookup.
    Read,
    /// A `Cache::update` admission attempt.
    Update,
}

/// Manages the resident↔disk working set of large pages.
#[derive(Debug)]
pub struct LargePageProvider {
    dir: PathBuf,
    directory: Vec<DirectoryEntry>,
    resident: Vec<LargePage>,
    /// `resident_dir_index[slot]` is the directory index currently backed
    /// by RAM slot `slot`.
    resident_dir_index: Vec<usize>,
    time: u32,
    large_page_period: u32,
    frequency_threshold: u64,
    large_page_shift: u32,
    swap_count: u64,
}

impl LargePageProvider {
    /// Opens (creating if necessary) the provider's data directory, reads
    /// `header.bin` if present, and eagerly loads the resulting initial
    /// resident set's `page<i>.bin` files.
    pub fn new(dir: impl Into<PathBuf>, config: &CacheConfig) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| CacheError::io(e, &dir))?;

        let directory_size = config.directory_size();
        let resident_count = config.loaded_page_number;
        let mut directory = vec![DirectoryEntry::default(); directory_size];

        let header_path = dir.join("header.bin");
        if let Some(frequencies) = read_header(&header_path, directory_size)? {
            for (entry, freq) in directory.iter_mut().zip(frequencies) {
                entry.frequency = freq;
            }
        }

        // Top-R frequencies (ties broken by directory index) become the
        // initial resident set.
        let mut by_freq: Vec<usize> = (0..directory_size).collect();
        by_freq.sort_by(|&a, &b| directory[b].frequency.cmp(&directory[a].frequency));
        let initial_residents: Vec<usize> = by_freq.into_iter().take(resident_count).collect();

        let mut resident = Vec::with_capacity(resident_count);
        let mut resident_dir_index = Vec::with_capacity(resident_count);
        for (slot, &dir_idx) in initial_residents.iter().enumerate() {
            let mut page = LargePage::new(
                config.small_page_count(),
                config.small_page_size(),
                config.large_page_shift,
            );
            load_page(&dir, dir_idx, &mut page)?;
            directory[dir_idx].resident_slot = Some(slot);
            resident.push(page);
            resident_dir_index.push(dir_idx);
        }

        debug!(
            "opened provider at {:?}: {} directory entries, {} resident",
            dir,
            directory_size,
            resident.len()
        );

        Ok(LargePageProvider {
            dir,
            directory,
            resident,
            resident_dir_index,
            time: 0,
            large_page_period: config.large_page_period,
            frequency_threshold: config.frequency_threshold as u64,
            large_page_shift: config.large_page_shift,
            swap_count: 0,
        })
    }

    fn directory_index(&self, key: Key) -> usize {
        (key >> (32 - self.large_page_shift)) as usize
    }

    fn worst_resident(&self) -> (usize, u64) {
        self.resident_dir_index
            .iter()
            .enumerate()
            .map(|(slot, &dir_idx)| (slot, self.directory[dir_idx].frequency))
            .min_by_key(|&(_, freq)| freq)
            .expect("resident pool is never empty")
    }

    /// Runs the per-access protocol: periodic aging, frequency bump, then
    /// either a direct hit, a hysteresis-gated swap, or a miss.
    pub fn access(
        &mut self,
        key: Key,
        mode: AccessMode,
    ) -> Result<Option<&mut LargePage>, CacheError> {
        if self.time >= self.large_page_period {
            self.age();
        }
        self.time += 1;

        let idx = self.directory_index(key);
        self.directory[idx].frequency += 1;

        if let Some(slot) = self.directory[idx].resident_slot {
            return Ok(Some(&mut self.resident[slot]));
        }

        let (worst_slot, worst_freq) = self.worst_resident();
        let freq = self.directory[idx].frequency;
        if freq > worst_freq + self.frequency_threshold {
            self.swap(idx, worst_slot)?;
            return Ok(Some(&mut self.resident[worst_slot]));
        }

        trace!("provider miss for directory entry {idx} ({mode:?})");
        Ok(None)
    }

    fn age(&mut self) {
        for entry in &mut self.directory {
            entry.frequency /= 2;
        }
        self.time = 0;
    }

    fn swap(&mut self, new_idx: usize, slot: usize) -> Result<(), CacheError> {
        let old_idx = self.resident_dir_index[slot];
        debug!("swapping large page {old_idx} out, {new_idx} in at slot {slot}");

        store_page(&self.dir, old_idx, &self.resident[slot])?;
        self.directory[old_idx].resident_slot = None;

        load_page(&self.dir, new_idx, &mut self.resident[slot])?;
        self.directory[new_idx].resident_slot = Some(slot);
        self.resident_dir_index[slot] = new_idx;
        self.swap_count += 1;
        Ok(())
    }

    /// Total large-page swaps performed so far.
    pub fn swaps(&self) -> u64 {
        self.swap_count
    }

    /// Persists `header.bin` (directory frequencies) and every resident
    /// large page's `page<i>.bin`.
    pub fn store(&self) -> Result<(), CacheError> {
        write_header(&self.dir, &self.directory)?;
        for (slot, &dir_idx) in self.resident_dir_index.iter().enumerate() {
            store_page(&self.dir, dir_idx, &self.resident[slot])?;
        }
        debug!("stored {} resident large pages", self.resident.len());
        Ok(())
    }

}

fn page_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("page{index}.bin"))
}

/// Loads `page<index>.bin` into `page`, or clears it if the file does not
/// exist (logical zero state, per the persistence contract).
fn load_page(dir: &Path, index: usize, page: &mut LargePage) -> Result<(), CacheError> {
    let path = page_path(dir, index);
    match fs::read(&path) {
        Ok(bytes) => {
            page.load_from(&bytes);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            page.clear();
            Ok(())
        }
        Err(e) => Err(CacheError::io(e, path)),
    }
}

fn store_page(dir: &Path, index: usize, page: &LargePage) -> Result<(), CacheError> {
    let path = page_path(dir, index);
    fs::write(&path, page.store_to()).map_err(|e| CacheError::io(e, path))
}

/// Reads `header.bin` if it exists, returning `directory_size` frequency
/// values (8-byte little-endian each). A missing file is not an error.
fn read_header(path: &Path, directory_size: usize) -> Result<Option<Vec<u64>>, CacheError> {
    match fs::read(path) {
        Ok(bytes) => {
            let mut freqs = vec![0u64; directory_size];
            for (i, chunk) in bytes.chunks_exact(8).take(directory_size).enumerate() {
                freqs[i] = u64::from_le_bytes(chunk.try_into().unwrap());
            }
            Ok(Some(freqs))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CacheError::io(e, path)),
    }
}

fn write_header(dir: &Path, directory: &[DirectoryEntry]) -> Result<(), CacheError> {
    let path = dir.join("header.bin");
    let mut bytes = Vec::with_capacity(directory.len() * 8);
    for entry in directory {
        bytes.extend_from_slice(&entry.frequency.to_le_bytes());
    }
    fs::write(&path, bytes).map_err(|e| CacheError::io(e, path))
}
