// Blank FAT16 images for tests

use crate::geometry::Geometry;
use crate::io::memory::MemoryIO;
use crate::region::boot::{BootParameterBlock, BOOT_SECTOR_SIZE, BOOT_SIGNATURE};
use crate::Fat16;

#[derive(Copy, Clone, Debug)]
pub(crate) struct Layout {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub number_of_fats: u8,
    pub max_root_entries: u16,
    pub sectors_per_fat: u16,
    pub total_sectors: u32,
}

impl Default for Layout {
    /// 60 data clusters `2..62` of 512 bytes, 16 root directory slots
    fn default() -> Self {
        Self {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            number_of_fats: 2,
            max_root_entries: 16,
            sectors_per_fat: 1,
            total_sectors: 64,
        }
    }
}

impl From<Layout> for BootParameterBlock {
    fn from(layout: Layout) -> Self {
        Self {
            bytes_per_sector: layout.bytes_per_sector,
            sectors_per_cluster: layout.sectors_per_cluster,
            reserved_sectors: layout.reserved_sectors,
            number_of_fats: layout.number_of_fats,
            max_root_entries: layout.max_root_entries,
            total_sectors: layout.total_sectors,
            sectors_per_fat: layout.sectors_per_fat,
        }
    }
}

fn boot_sector(layout: Layout) -> [u8; BOOT_SECTOR_SIZE] {
    let mut bytes = [0u8; BOOT_SECTOR_SIZE];
    bytes[0..3].copy_from_slice(&hex!("EB 3C 90"));
    bytes[3..11].copy_from_slice(b"MSWIN4.1");
    bytes[11..13].copy_from_slice(&layout.bytes_per_sector.to_le_bytes());
    bytes[13] = layout.sectors_per_cluster;
    bytes[14..16].copy_from_slice(&layout.reserved_sectors.to_le_bytes());
    bytes[16] = layout.number_of_fats;
    bytes[17..19].copy_from_slice(&layout.max_root_entries.to_le_bytes());
    match u16::try_from(layout.total_sectors) {
        Ok(sectors) => bytes[19..21].copy_from_slice(&sectors.to_le_bytes()),
        Err(_) => bytes[32..36].copy_from_slice(&layout.total_sectors.to_le_bytes()),
    }
    bytes[21] = 0xF8;
    bytes[22..24].copy_from_slice(&layout.sectors_per_fat.to_le_bytes());
    bytes[38] = 0x29;
    bytes[39..43].copy_from_slice(&hex!("EF BE AD DE"));
    bytes[43..54].copy_from_slice(b"TESTVOLUME ");
    bytes[54..62].copy_from_slice(b"FAT16   ");
    bytes[510..512].copy_from_slice(&BOOT_SIGNATURE);
    bytes
}

/// Zeroed image with boot sector and reserved FAT slots 0 and 1 in every FAT copy
pub(crate) fn format(layout: Layout) -> (MemoryIO, Geometry) {
    let geometry = Geometry::from(BootParameterBlock::from(layout));
    let size = layout.total_sectors as usize * layout.bytes_per_sector as usize;
    let mut buffer = vec![0u8; size];
    buffer[..BOOT_SECTOR_SIZE].copy_from_slice(&boot_sector(layout));
    for i in 0..layout.number_of_fats as u64 {
        let address = (geometry.fat_table_address() + i * geometry.fat_size()) as usize;
        buffer[address..address + 4].copy_from_slice(&hex!("F8 FF FF FF"));
    }
    (MemoryIO::new(buffer), geometry)
}

pub(crate) fn image(layout: Layout) -> Fat16<MemoryIO> {
    let (io, _) = format(layout);
    Fat16::new(io).unwrap()
}
