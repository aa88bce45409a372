use crate::error::DataError;
use crate::region::boot::BootParameterBlock;
use crate::region::data::entry::ENTRY_SIZE;
use crate::region::fat;
use crate::types::ClusterID;

/// Byte addresses of every FAT16 region, derived from the boot parameter block
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    bpb: BootParameterBlock,
}

impl From<BootParameterBlock> for Geometry {
    fn from(bpb: BootParameterBlock) -> Self {
        Self { bpb }
    }
}

impl Geometry {
    pub fn boot_parameter_block(&self) -> &BootParameterBlock {
        &self.bpb
    }

    pub fn bytes_per_sector(&self) -> u64 {
        self.bpb.bytes_per_sector as u64
    }

    pub fn cluster_size(&self) -> u64 {
        self.bytes_per_sector() * self.bpb.sectors_per_cluster as u64
    }

    pub fn fat_table_address(&self) -> u64 {
        self.bpb.reserved_sectors as u64 * self.bytes_per_sector()
    }

    pub fn fat_size(&self) -> u64 {
        self.bpb.sectors_per_fat as u64 * self.bytes_per_sector()
    }

    pub fn root_directory_address(&self) -> u64 {
        self.fat_table_address() + self.bpb.number_of_fats as u64 * self.fat_size()
    }

    pub fn data_region_address(&self) -> u64 {
        self.root_directory_address() + self.bpb.max_root_entries as u64 * ENTRY_SIZE as u64
    }

    /// Zero if boot parameter block claims fewer sectors than metadata occupies
    pub fn data_sector_count(&self) -> u64 {
        let total_sectors = self.bpb.total_sectors as u64;
        total_sectors.saturating_sub(self.data_region_address() / self.bytes_per_sector())
    }

    pub fn data_cluster_count(&self) -> u64 {
        self.data_sector_count() / self.bpb.sectors_per_cluster as u64
    }

    /// Number of cluster numbers both FAT and data region can address,
    /// valid data clusters are `2..fat_entry_count`.
    ///
    /// Never above `0xFFF0`, higher numbers can't be stored as a next cluster link
    pub fn fat_entry_count(&self) -> u32 {
        let fat_entries = self.fat_size() / fat::ENTRY_SIZE;
        let addressable = core::cmp::min(fat_entries, self.data_cluster_count() + 2);
        core::cmp::min(addressable, fat::MAX_CLUSTER as u64 + 1) as u32
    }

    pub fn contains(&self, cluster_id: ClusterID) -> bool {
        cluster_id.valid() && (u16::from(cluster_id) as u32) < self.fat_entry_count()
    }

    pub fn fat_entry_address(&self, cluster_id: ClusterID) -> u64 {
        self.fat_table_address() + u16::from(cluster_id) as u64 * fat::ENTRY_SIZE
    }

    pub fn directory_entry_address(&self, index: usize) -> u64 {
        self.root_directory_address() + (index * ENTRY_SIZE) as u64
    }

    pub fn cluster_address(&self, cluster_id: ClusterID) -> Result<u64, DataError> {
        if !cluster_id.valid() {
            return Err(DataError::InvalidCluster(cluster_id));
        }
        Ok(self.data_region_address() + cluster_id.offset() * self.cluster_size())
    }
}
