//! Instance records and the bounded writer that copies them into mapped
//! destination buffers.

use bytemuck::{Pod, Zeroable};

/// Per-tile data consumed by the instanced terrain draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceRecord {
    /// World-space minimum corner of the tile.
    pub translate: [f32; 2],
    /// `2^level`; the tile spans `scale · node_size` world units.
    pub scale: f32,
    /// Texture layer sampled by the tile.
    pub texture_index: u32,
    /// `(morph_start, switch_distance)` of the tile's level.
    pub morph_range: [f32; 2],
}

impl InstanceRecord {
    /// Size of one record in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// A destination buffer that instance records are written into.
///
/// Writes happen between [`InstanceTarget::map`] and
/// [`InstanceTarget::unmap`]; the written byte range is then handed to
/// [`InstanceTarget::flush_range`].
pub trait InstanceTarget {
    /// Number of records the buffer can hold.
    fn capacity(&self) -> usize;

    /// Begin a write.
    fn map(&mut self);

    /// The mapped storage. Only valid between `map` and `unmap`.
    fn mapped_bytes(&mut self) -> &mut [u8];

    /// End a write.
    fn unmap(&mut self);

    /// Publish `len` bytes starting at `offset`.
    fn flush_range(&mut self, offset: usize, len: usize);
}

/// Scoped write access to an [`InstanceTarget`].
///
/// Dropping the guard unmaps the target and flushes exactly the bytes
/// written through it, whether or not anything was written.
pub struct MappedRange<'a, T: InstanceTarget + ?Sized> {
    target: &'a mut T,
    written: usize,
}

impl<'a, T: InstanceTarget + ?Sized> MappedRange<'a, T> {
    /// Map `target` for writing.
    pub fn new(target: &'a mut T) -> Self {
        target.map();
        Self { target, written: 0 }
    }

    /// Copy `records` to the start of the mapped storage. Records that do
    /// not fit are skipped. Returns the number written.
    pub fn write(&mut self, records: &[InstanceRecord]) -> usize {
        let bytes = self.target.mapped_bytes();
        let count = records.len().min(bytes.len() / InstanceRecord::SIZE);
        let len = count * InstanceRecord::SIZE;
        bytes[..len].copy_from_slice(bytemuck::cast_slice(&records[..count]));
        self.written = len;
        count
    }

    /// Bytes written so far.
    pub fn written_bytes(&self) -> usize {
        self.written
    }
}

impl<T: InstanceTarget + ?Sized> Drop for MappedRange<'_, T> {
    fn drop(&mut self) {
        self.target.unmap();
        self.target.flush_range(0, self.written);
    }
}

/// Write `records` into `target`, truncating to its capacity.
///
/// Returns the number of records written.
pub fn emit<T: InstanceTarget + ?Sized>(records: &[InstanceRecord], target: &mut T) -> usize {
    let capacity = target.capacity();
    if records.len() > capacity {
        log::warn!(
            "Too many terrain nodes being rendered: wanted {}, limit {capacity}",
            records.len()
        );
    }
    let count = records.len().min(capacity);

    let mut mapped = MappedRange::new(target);
    mapped.write(&records[..count])
}

/// Host-memory [`InstanceTarget`] with a fixed number of record slots.
///
/// Keeps track of map/unmap pairing and the last flushed range so callers
/// can hand the written records on to their renderer.
#[derive(Clone, Debug)]
pub struct InstanceBuffer {
    slots: Vec<InstanceRecord>,
    len: usize,
    mapped: bool,
    map_count: usize,
    unmap_count: usize,
    last_flush: Option<(usize, usize)>,
}

impl InstanceBuffer {
    /// Create a buffer with room for `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![InstanceRecord::zeroed(); capacity],
            len: 0,
            mapped: false,
            map_count: 0,
            unmap_count: 0,
            last_flush: None,
        }
    }

    /// Records published by the last flush.
    pub fn records(&self) -> &[InstanceRecord] {
        &self.slots[..self.len]
    }

    /// Every slot, including ones past the last flush.
    pub fn slots(&self) -> &[InstanceRecord] {
        &self.slots
    }

    /// Number of records published by the last flush.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    pub fn map_count(&self) -> usize {
        self.map_count
    }

    pub fn unmap_count(&self) -> usize {
        self.unmap_count
    }

    /// `(offset, len)` in bytes of the last flush.
    pub fn last_flush(&self) -> Option<(usize, usize)> {
        self.last_flush
    }
}

impl InstanceTarget for InstanceBuffer {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn map(&mut self) {
        self.mapped = true;
        self.map_count += 1;
    }

    fn mapped_bytes(&mut self) -> &mut [u8] {
        if !self.mapped {
            return &mut [];
        }
        bytemuck::cast_slice_mut(&mut self.slots)
    }

    fn unmap(&mut self) {
        self.mapped = false;
        self.unmap_count += 1;
    }

    fn flush_range(&mut self, offset: usize, len: usize) {
        self.last_flush = Some((offset, len));
        self.len = (offset + len) / InstanceRecord::SIZE;
    }
}
