//! Slab-backed bump allocator owning all text of one knowledge base.
//!
//! Memory is handed out from fixed-size slabs. A request that does not fit
//! into the remainder of the current slab opens a new slab sized to the
//! request (rounded up to the slab granularity); the remainder of the old
//! slab is abandoned and only reclaimed by [`SlabArena::release_all`] or drop.
//! Nothing is ever freed individually.

use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Default slab granularity in bytes.
pub const DEFAULT_SLAB_SIZE: usize = 1024;

/// Alignment of every block offset (largest natural scalar alignment).
pub const MAX_ALIGN: usize = 16;

/// Arena tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaOptions {
    /// Slab granularity in bytes
    pub slab_size: usize,
    /// Upper bound on bytes reserved across all slabs, None for unbounded
    pub max_bytes: Option<usize>,
}

impl Default for ArenaOptions {
    fn default() -> Self {
        Self {
            slab_size: DEFAULT_SLAB_SIZE,
            max_bytes: None,
        }
    }
}

/// Handle to a block of arena memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    slab: usize,
    offset: usize,
    len: usize,
}

impl Block {
    const EMPTY: Block = Block {
        slab: 0,
        offset: 0,
        len: 0,
    };

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset of the block inside its slab.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Bump allocator over a list of slabs.
///
/// Slabs are `String`s pre-filled with NUL characters, so every block is
/// zero-filled on allocation and every block boundary is a char boundary.
#[derive(Debug)]
pub struct SlabArena {
    slabs: Vec<String>,
    /// Bump position inside the last slab
    cursor: usize,
    reserved: usize,
    options: ArenaOptions,
}

impl Default for SlabArena {
    fn default() -> Self {
        Self::new(ArenaOptions::default())
    }
}

fn align_up(number: usize, alignment: usize) -> Option<usize> {
    let rem = number % alignment;
    if rem == 0 {
        Some(number)
    } else {
        number.checked_add(alignment - rem)
    }
}

impl SlabArena {
    pub fn new(options: ArenaOptions) -> Self {
        Self {
            slabs: Vec::new(),
            cursor: 0,
            reserved: 0,
            options: ArenaOptions {
                slab_size: options.slab_size.max(MAX_ALIGN),
                ..options
            },
        }
    }

    pub fn options(&self) -> ArenaOptions {
        self.options
    }

    /// Number of slabs currently owned.
    pub fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Total bytes reserved across all slabs.
    pub fn reserved_bytes(&self) -> usize {
        self.reserved
    }

    /// Reserve `size` zero-filled bytes.
    #[instrument(level = "trace", skip(self))]
    pub fn allocate(&mut self, size: usize) -> DomainResult<Block> {
        if size == 0 {
            return Ok(Block::EMPTY);
        }

        if let Some(last) = self.slabs.len().checked_sub(1) {
            let fits = align_up(self.cursor, MAX_ALIGN)
                .and_then(|start| start.checked_add(size).map(|end| (start, end)))
                .filter(|&(_, end)| end <= self.slabs[last].len());
            if let Some((start, end)) = fits {
                self.cursor = end;
                return Ok(Block {
                    slab: last,
                    offset: start,
                    len: size,
                });
            }
        }

        self.open_slab(size)?;
        self.cursor = size;
        Ok(Block {
            slab: self.slabs.len() - 1,
            offset: 0,
            len: size,
        })
    }

    fn open_slab(&mut self, size: usize) -> DomainResult<()> {
        let failure = DomainError::AllocationFailure { requested: size };
        let capacity = align_up(size, self.options.slab_size).ok_or_else(|| failure.clone())?;

        if let Some(limit) = self.options.max_bytes {
            match self.reserved.checked_add(capacity) {
                Some(total) if total <= limit => {}
                _ => return Err(failure),
            }
        }

        let mut slab = String::new();
        slab.try_reserve_exact(capacity).map_err(|_| failure.clone())?;
        slab.extend(std::iter::repeat('\0').take(capacity));
        self.slabs.try_reserve(1).map_err(|_| failure)?;
        self.slabs.push(slab);
        self.reserved += capacity;
        tracing::trace!(capacity, slabs = self.slabs.len(), "opened slab");
        Ok(())
    }

    /// Allocate a block and copy `text` into it.
    pub fn store(&mut self, text: &str) -> DomainResult<Block> {
        let block = self.allocate(text.len())?;
        if !block.is_empty() {
            let range = block.offset..block.offset + block.len;
            self.slabs[block.slab].replace_range(range, text);
        }
        Ok(block)
    }

    /// Text stored in `block`; empty for blocks this arena never handed out.
    pub fn text(&self, block: Block) -> &str {
        if block.is_empty() {
            return "";
        }
        self.slabs
            .get(block.slab)
            .and_then(|slab| slab.get(block.offset..block.offset + block.len))
            .unwrap_or("")
    }

    /// Raw bytes of `block`.
    pub fn bytes(&self, block: Block) -> &[u8] {
        self.text(block).as_bytes()
    }

    /// Free every slab at once; all previously issued blocks become invalid.
    #[instrument(level = "trace", skip(self))]
    pub fn release_all(&mut self) {
        self.slabs.clear();
        self.slabs.shrink_to_fit();
        self.cursor = 0;
        self.reserved = 0;
    }
}
