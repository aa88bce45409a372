use core::fmt::Debug;

use crate::error::{AllocationError, DataError, Error};
use crate::fat::FAT;
use crate::io;
use crate::region::fat::Entry;
use crate::types::ClusterID;

/// Linear first-fit cluster allocator over the FAT.
///
/// `cursor` is the lowest cluster that may be free, everything below it is known
/// in use. Allocation moves it past the returned cluster and release moves it back,
/// so the result is always the lowest free cluster, same as a full scan from cluster 2.
#[derive(Clone, Debug)]
pub(crate) struct DumbAllocator {
    fat: FAT,
    cursor: u32,
}

impl DumbAllocator {
    pub fn new(fat: FAT) -> Self {
        Self { fat, cursor: u16::from(ClusterID::FIRST) as u32 }
    }

    fn find_available<E: Debug, IO>(&mut self, io: &mut IO) -> Result<ClusterID, Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        let mut found = None;
        self.fat.scan(io, self.cursor, |index, value| match value {
            0 => {
                found = Some(index);
                false
            }
            _ => true,
        })?;
        match found {
            Some(index) => Ok(ClusterID::from(index as u16)),
            None => {
                self.cursor = self.fat.entry_count();
                Err(AllocationError::NoMoreCluster.into())
            }
        }
    }

    /// Find the lowest free cluster and mark it as end of chain
    pub fn allocate<E: Debug, IO>(&mut self, io: &mut IO) -> Result<ClusterID, Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        let cluster_id = self.find_available(io)?;
        self.fat.set_next(io, cluster_id, Entry::Last)?;
        self.cursor = u16::from(cluster_id) as u32 + 1;
        trace!("Allocated cluster {}", cluster_id);
        Ok(cluster_id)
    }

    fn release_one<E: Debug, IO>(&mut self, io: &mut IO, id: ClusterID) -> Result<(), Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        trace!("Release cluster {}", id);
        self.fat.set_next(io, id, Entry::Free)?;
        self.cursor = core::cmp::min(self.cursor, u16::from(id) as u32);
        Ok(())
    }

    /// Release individual clusters regardless of what their FAT slots hold
    pub fn release_clusters<E: Debug, IO>(&mut self, io: &mut IO, ids: &[ClusterID]) -> Result<(), Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        for &cluster_id in ids {
            self.release_one(io, cluster_id)?;
        }
        Ok(())
    }

    /// Release a whole chain, returns number of clusters released.
    ///
    /// A chain running into a free or bad slot is released up to that point.
    pub fn release<E: Debug, IO>(&mut self, io: &mut IO, first: ClusterID) -> Result<u32, Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        trace!("Release clusters starts with cluster {}", first);
        let mut cluster_id = first;
        let mut count = 0;
        loop {
            let entry = self.fat.next_cluster(io, cluster_id)?;
            if entry == Entry::Free {
                warn!("Cluster {} in chain of {} already free", cluster_id, first);
                break;
            }
            self.release_one(io, cluster_id)?;
            count += 1;
            match entry {
                Entry::Next(id) => cluster_id = id,
                Entry::Last => break,
                Entry::BadCluster => {
                    warn!("Encountered bad cluster after cluster {}", cluster_id);
                    break;
                }
                entry => {
                    warn!("Invalid FAT entry {:?} after cluster {}", entry, cluster_id);
                    return Err(DataError::BrokenChain(cluster_id).into());
                }
            }
        }
        Ok(count)
    }

    pub fn free_cluster_count<E: Debug, IO>(&self, io: &mut IO) -> Result<u32, Error<E>>
    where
        IO: io::IO<Error = E>,
    {
        let mut count = 0;
        let first = u16::from(ClusterID::FIRST) as u32;
        self.fat.scan(io, first, |_, value| {
            count += (value == 0) as u32;
            true
        })?;
        Ok(count)
    }
}

#[cfg(test)]
mod test {
    use super::DumbAllocator;
    use crate::error::{AllocationError, Error};
    use crate::fat::FAT;
    use crate::mkfs::{self, Layout};
    use crate::region::fat::Entry;
    use crate::types::ClusterID;

    fn cluster(id: u16) -> ClusterID {
        ClusterID::from(id)
    }

    #[test]
    fn test_allocate_from_cluster_2() {
        let (mut io, geometry) = mkfs::format(Layout::default());
        let fat = FAT::new(geometry);
        let mut allocator = DumbAllocator::new(fat);
        assert_eq!(allocator.allocate(&mut io).unwrap(), cluster(2));
        assert_eq!(fat.next_cluster(&mut io, cluster(2)).unwrap(), Entry::Last);
        assert_eq!(allocator.allocate(&mut io).unwrap(), cluster(3));
    }

    #[test]
    fn test_skip_used() {
        let (mut io, geometry) = mkfs::format(Layout::default());
        let fat = FAT::new(geometry);
        for id in 2..6 {
            fat.set_next(&mut io, cluster(id), Entry::Last).unwrap();
        }
        let mut allocator = DumbAllocator::new(fat);
        assert_eq!(allocator.allocate(&mut io).unwrap(), cluster(6));
    }

    #[test]
    fn test_reuse_released() {
        let (mut io, geometry) = mkfs::format(Layout::default());
        let fat = FAT::new(geometry);
        let mut allocator = DumbAllocator::new(fat);
        let clusters: Vec<_> = (0..5).map(|_| allocator.allocate(&mut io).unwrap()).collect();
        fat.set_next(&mut io, clusters[1], Entry::Next(clusters[2])).unwrap();
        assert_eq!(allocator.release(&mut io, clusters[1]).unwrap(), 2);
        assert_eq!(fat.next_cluster(&mut io, clusters[1]).unwrap(), Entry::Free);
        assert_eq!(fat.next_cluster(&mut io, clusters[2]).unwrap(), Entry::Free);
        assert_eq!(fat.next_cluster(&mut io, clusters[3]).unwrap(), Entry::Last);
        assert_eq!(allocator.allocate(&mut io).unwrap(), clusters[1]);
        assert_eq!(allocator.allocate(&mut io).unwrap(), clusters[2]);
        assert_eq!(allocator.allocate(&mut io).unwrap(), cluster(7));
    }

    #[test]
    fn test_exhausted() {
        let (mut io, geometry) = mkfs::format(Layout::default());
        let fat = FAT::new(geometry);
        let mut allocator = DumbAllocator::new(fat);
        let total = allocator.free_cluster_count(&mut io).unwrap();
        assert_eq!(total, geometry.fat_entry_count() - 2);
        for _ in 0..total {
            allocator.allocate(&mut io).unwrap();
        }
        assert_eq!(allocator.free_cluster_count(&mut io).unwrap(), 0);
        let result = allocator.allocate(&mut io);
        assert!(matches!(result, Err(Error::Allocation(AllocationError::NoMoreCluster))));

        allocator.release_clusters(&mut io, &[cluster(10)]).unwrap();
        assert_eq!(allocator.allocate(&mut io).unwrap(), cluster(10));
    }
}
