#![doc = include_str!("../README.md")]

#[macro_use]
extern crate hex_literal;
extern crate heapless;
#[macro_use]
extern crate log;

mod allocator;
mod directory;
mod endian;
pub mod error;
mod fat;
pub mod file;
pub mod geometry;
pub mod io;
#[cfg(test)]
mod mkfs;
mod region;
pub mod types;

use core::fmt::Debug;

use allocator::DumbAllocator;
pub use directory::EntryRef;
use directory::RootDirectory;
use error::{DataError, Error};
use fat::FAT;
pub use file::InsertOptions;
pub use geometry::Geometry;
use io::Wrap;
pub use region::boot::{BootParameterBlock, VolumeInfo};
use region::boot::{BootSector, BOOT_SECTOR_SIZE, BOOT_SIGNATURE};
pub use region::data::entry::{DirectoryEntry, EntryState, FileAttributes};
pub use region::data::name::ShortName;
pub use region::fat::Entry as FATEntry;
use types::ClusterID;

/// Handle on a FAT16 image, every operation borrows it exclusively
pub struct Fat16<IO> {
    io: IO,
    geometry: Geometry,
    volume_info: VolumeInfo,
    fat: FAT,
    root: RootDirectory,
    allocator: DumbAllocator,
}

impl<E: Debug, IO: io::IO<Error = E>> Fat16<IO> {
    pub fn new(mut io: IO) -> Result<Self, Error<E>> {
        let mut bytes = [0u8; BOOT_SECTOR_SIZE];
        io.wrap().read(0, &mut bytes)?;
        let boot_sector = BootSector::from_bytes(bytes);
        let signature = boot_sector.boot_signature;
        if signature != BOOT_SIGNATURE {
            warn!("Boot sector signature {:02X?} mismatch", signature);
        }
        let bpb = BootParameterBlock::try_from(&boot_sector)?;
        let geometry = Geometry::from(bpb);
        debug!("Boot parameter block {:?}", bpb);
        debug!(
            "FAT at {} root directory at {} data region at {}",
            geometry.fat_table_address(),
            geometry.root_directory_address(),
            geometry.data_region_address()
        );
        if geometry.fat_entry_count() <= u16::from(ClusterID::FIRST) as u32 {
            return Err(DataError::BootSector("no data cluster").into());
        }
        debug!("Clusters 2..{} of {} bytes", geometry.fat_entry_count(), geometry.cluster_size());
        let fat = FAT::new(geometry);
        Ok(Self {
            io,
            geometry,
            volume_info: VolumeInfo::from(&boot_sector),
            fat,
            root: RootDirectory::new(geometry),
            allocator: DumbAllocator::new(fat),
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn volume_info(&self) -> &VolumeInfo {
        &self.volume_info
    }

    pub fn free_clusters(&mut self) -> Result<u32, Error<E>> {
        self.allocator.free_cluster_count(&mut self.io)
    }

    /// Raw FAT slot of a cluster
    pub fn fat_entry(&mut self, cluster_id: ClusterID) -> Result<FATEntry, Error<E>> {
        self.fat.next_cluster(&mut self.io, cluster_id)
    }

    /// Every cluster of the chain starting at `first`
    pub fn cluster_chain(&mut self, first: ClusterID) -> Result<Vec<ClusterID>, Error<E>> {
        self.fat.chain(first).collect(&mut self.io)
    }

    pub fn flush(&mut self) -> Result<(), Error<E>> {
        self.io.wrap().flush()
    }

    pub fn into_inner(self) -> IO {
        self.io
    }
}

#[cfg(test)]
mod test {
    use super::Fat16;
    use crate::error::{DataError, Error};
    use crate::io::memory::MemoryIO;
    use crate::mkfs::{self, Layout};

    #[test]
    fn test_open() {
        let (io, geometry) = mkfs::format(Layout::default());
        let mut fat16 = Fat16::new(io).unwrap();
        assert_eq!(fat16.geometry(), &geometry);
        assert_eq!(fat16.volume_info().oem_name.as_str(), "MSWIN4.1");
        assert_eq!(fat16.volume_info().volume_id, Some(0xDEADBEEF));
        assert_eq!(fat16.volume_info().volume_label.as_ref().map(|l| l.as_str()), Some("TESTVOLUME"));
        assert_eq!(fat16.free_clusters().unwrap(), 60);
    }

    #[test]
    fn test_missing_signature() {
        let (io, _) = mkfs::format(Layout::default());
        let mut bytes = io.into_inner();
        bytes[510] = 0;
        bytes[511] = 0;
        assert!(Fat16::new(MemoryIO::new(bytes)).is_ok());
    }

    #[test]
    fn test_invalid_boot_sector() {
        let (io, _) = mkfs::format(Layout::default());
        let mut bytes = io.into_inner();
        bytes[13] = 0;
        let result = Fat16::new(MemoryIO::new(bytes));
        assert!(matches!(result, Err(Error::Data(DataError::BootSector(_)))));

        let layout = Layout { total_sectors: 4, ..Default::default() };
        let (io, _) = mkfs::format(layout);
        let result = Fat16::new(io);
        assert!(matches!(result, Err(Error::Data(DataError::BootSector(_)))));
    }

    #[test]
    fn test_tiny_sector() {
        let layout = Layout {
            bytes_per_sector: 1,
            reserved_sectors: 512,
            sectors_per_fat: 64,
            total_sectors: 648,
            ..Default::default()
        };
        let (io, _) = mkfs::format(layout);
        let result = Fat16::new(io);
        assert!(matches!(result, Err(Error::Data(DataError::BootSector(_)))));
    }

    #[test]
    fn test_short_image() {
        let result = Fat16::new(MemoryIO::new(vec![0u8; 100]));
        assert!(matches!(result, Err(Error::IO(_))));
    }
}
