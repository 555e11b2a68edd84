//! Large page: a fixed fan-out of small pages, the unit of disk I/O.

use crate::key::{Expiration, Key};
use crate::small_page::SmallPage;
use crate::tinylfu::TinyLfu;

/// Container of `small_page_count` small pages, addressed by a key-derived
/// sub-index.
#[derive(Debug, Clone)]
pub struct LargePage {
    small_pages: Vec<SmallPage>,
    /// Mask applied before the modulo, derived from `LARGE_PAGE_SHIFT`.
    index_mask: u32,
}

impl LargePage {
    /// Builds a large page with `small_page_count` small pages of
    /// `small_page_size` slots each. `large_page_shift` determines how many
    /// low bits of the key remain after the directory has consumed the top
    /// `large_page_shift` bits.
    pub fn new(small_page_count: usize, small_page_size: usize, large_page_shift: u32) -> Self {
        LargePage {
            small_pages: (0..small_page_count)
                .map(|_| SmallPage::new(small_page_size))
                .collect(),
            index_mask: (1u32 << (32 - large_page_shift)) - 1,
        }
    }

    fn small_page_index(&self, key: Key) -> usize {
        (key & self.index_mask) as usize % self.small_pages.len()
    }

    /// Looks up `key`, routed to its small page.
    pub fn get(&mut self, key: Key, now: Expiration, tinylfu: &mut TinyLfu) -> bool {
        let idx = self.small_page_index(key);
        self.small_pages[idx].get(key, now, tinylfu)
    }

    /// Attempts to admit `(key, exp)`, routed to its small page.
    pub fn update(&mut self, key: Key, exp: Expiration, tinylfu: &mut TinyLfu) -> bool {
        let idx = self.small_page_index(key);
        self.small_pages[idx].update(key, exp, tinylfu)
    }

    /// Clears every small page, returning this large page to logical zero
    /// state.
    pub fn clear(&mut self) {
        self.small_pages.iter_mut().for_each(SmallPage::clear);
    }

    /// Deserializes from a flat buffer produced by [`Self::store_to`]: each
    /// small page's image, concatenated in page order.
    pub fn load_from(&mut self, buf: &[u8]) {
        let per_page = buf.len() / self.small_pages.len();
        for (i, page) in self.small_pages.iter_mut().enumerate() {
            page.load_from(&buf[i * per_page..(i + 1) * per_page]);
        }
    }

    /// Serializes every small page's flat image, concatenated in page
    /// order, into a single buffer sized for one `page<i>.bin` file.
    pub fn store_to(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for page in &self.small_pages {
            page.store_to(&mut out);
        }
        out
    }
}
