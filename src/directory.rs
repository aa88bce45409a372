use core::fmt::Debug;
use core::ops::Deref;

use crate::error::{AllocationError, Error};
use crate::geometry::Geometry;
use crate::io::{self, Wrap};
use crate::region::data::entry::{DirectoryEntry, RawEntry, DELETED, ENTRY_SIZE};
use crate::region::data::name::ShortName;

/// Occupied directory slot together with its position in the root directory
#[derive(Copy, Clone, Debug)]
pub struct EntryRef {
    pub index: usize,
    pub entry: DirectoryEntry,
}

impl Deref for EntryRef {
    type Target = DirectoryEntry;

    fn deref(&self) -> &DirectoryEntry {
        &self.entry
    }
}

/// Fixed size flat table of 32-byte slots right after the FAT copies
#[derive(Copy, Clone, Debug)]
pub(crate) struct RootDirectory {
    geometry: Geometry,
}

impl RootDirectory {
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry }
    }

    pub fn capacity(&self) -> usize {
        self.geometry.boot_parameter_block().max_root_entries as usize
    }

    /// Every slot including free ones, read in one go
    pub fn list_entries<E: Debug, IO>(&self, io: &mut IO) -> Result<Vec<DirectoryEntry>, Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        let mut bytes = vec![0u8; self.capacity() * ENTRY_SIZE];
        io.wrap().read(self.geometry.root_directory_address(), &mut bytes)?;
        let entries = bytes.chunks_exact(ENTRY_SIZE).map(|chunk| {
            let mut raw: RawEntry = [0; ENTRY_SIZE];
            raw.copy_from_slice(chunk);
            DirectoryEntry::from_bytes(raw)
        });
        Ok(entries.collect())
    }

    /// Index of the occupied slot whose 11 name bytes equal `name`
    pub fn find_by_name(entries: &[DirectoryEntry], name: &ShortName) -> Option<usize> {
        entries.iter().position(|entry| entry.in_use() && entry.name == *name.as_bytes())
    }

    pub fn find_free_slot_index(entries: &[DirectoryEntry]) -> Result<usize, AllocationError> {
        match entries.iter().position(|entry| entry.state().free()) {
            Some(index) => Ok(index),
            None => Err(AllocationError::DirectoryFull),
        }
    }

    pub fn write_entry_at<E: Debug, IO>(&self, io: &mut IO, index: usize, entry: DirectoryEntry) -> Result<(), Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        trace!("Write {} to directory slot {}", entry.name(), index);
        let address = self.geometry.directory_entry_address(index);
        io.wrap().write(address, &entry.to_bytes())
    }

    /// Tombstone a slot, only the first name byte is touched
    pub fn mark_free_at<E: Debug, IO>(&self, io: &mut IO, index: usize) -> Result<(), Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        trace!("Free directory slot {}", index);
        let address = self.geometry.directory_entry_address(index);
        io.wrap().write(address, &[DELETED])
    }
}
