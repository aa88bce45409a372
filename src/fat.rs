use core::fmt::Debug;

use crate::error::{DataError, Error};
use crate::geometry::Geometry;
use crate::io::{self, Wrap};
use crate::region::fat::Entry;
use crate::types::ClusterID;

/// First copy of the file allocation table, mirrors are left untouched
#[derive(Copy, Clone, Debug)]
pub(crate) struct FAT {
    geometry: Geometry,
}

impl FAT {
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry }
    }

    pub fn entry_count(&self) -> u32 {
        self.geometry.fat_entry_count()
    }

    fn check(&self, cluster_id: ClusterID) -> Result<(), DataError> {
        match self.geometry.contains(cluster_id) {
            true => Ok(()),
            false => Err(DataError::InvalidCluster(cluster_id)),
        }
    }

    pub fn next_cluster<E: Debug, IO>(&self, io: &mut IO, id: ClusterID) -> Result<Entry, Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        self.check(id)?;
        let value = io.wrap().read_u16(self.geometry.fat_entry_address(id))?;
        Ok(Entry::from(value))
    }

    pub fn set_next<E: Debug, IO>(&self, io: &mut IO, id: ClusterID, entry: Entry) -> Result<(), Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        self.check(id)?;
        let bytes = u16::from(entry).to_le_bytes();
        io.wrap().write(self.geometry.fat_entry_address(id), &bytes)
    }

    /// Visit raw FAT values of clusters `from..entry_count` in ascending order,
    /// reading a sector at a time, until `f` returns false
    pub fn scan<E: Debug, IO, F>(&self, io: &mut IO, from: u32, mut f: F) -> Result<(), Error<E>>
    where
        IO: io::IO<Error = E>,
        F: FnMut(u32, u16) -> bool,
    {
        let count = self.entry_count();
        let per_sector = (self.geometry.bytes_per_sector() / 2) as u32;
        let mut buffer = vec![0u8; self.geometry.bytes_per_sector() as usize];
        let mut index = from;
        while index < count {
            let num_entries = core::cmp::min(per_sector - index % per_sector, count - index);
            let chunk = &mut buffer[..num_entries as usize * 2];
            let address = self.geometry.fat_table_address() + index as u64 * 2;
            io.wrap().read(address, chunk)?;
            for (i, pair) in chunk.chunks_exact(2).enumerate() {
                if !f(index + i as u32, u16::from_le_bytes([pair[0], pair[1]])) {
                    return Ok(());
                }
            }
            index += num_entries;
        }
        Ok(())
    }

    pub fn chain(&self, first: ClusterID) -> Chain {
        Chain { fat: *self, next: Some(first), last: None, steps: 0 }
    }
}

/// Lazy cluster chain walk, the FAT slot of a cluster is only read
/// when the cluster after it is requested
pub(crate) struct Chain {
    fat: FAT,
    next: Option<ClusterID>,
    last: Option<ClusterID>,
    steps: u32,
}

impl Chain {
    pub fn next<E: Debug, IO>(&mut self, io: &mut IO) -> Result<Option<ClusterID>, Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        if let Some(last) = self.last {
            self.next = match self.fat.next_cluster(io, last)? {
                Entry::Next(cluster_id) => Some(cluster_id),
                Entry::Last => None,
                entry => {
                    warn!("Unexpected FAT entry {:?} after cluster {}", entry, last);
                    return Err(DataError::BrokenChain(last).into());
                }
            };
        }
        let cluster_id = match self.next {
            Some(cluster_id) => cluster_id,
            None => return Ok(None),
        };
        self.fat.check(cluster_id)?;
        self.steps += 1;
        if self.steps > self.fat.entry_count() {
            return Err(DataError::CyclicChain.into());
        }
        self.last = Some(cluster_id);
        self.next = None;
        Ok(Some(cluster_id))
    }

    /// Collect every remaining cluster of the chain
    pub fn collect<E: Debug, IO>(mut self, io: &mut IO) -> Result<Vec<ClusterID>, Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        let mut clusters = Vec::new();
        while let Some(cluster_id) = self.next(io)? {
            clusters.push(cluster_id);
        }
        Ok(clusters)
    }
}
