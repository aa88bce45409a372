// Boot sector, always the first sector of the image

use core::mem;

use crate::endian::Little as LE;
use crate::error::DataError;

pub(crate) const BOOT_SECTOR_SIZE: usize = 512;
pub(crate) const BOOT_SIGNATURE: [u8; 2] = hex!("55 AA");

#[derive(Copy, Clone, Debug)]
#[repr(C, packed(1))]
pub(crate) struct BootSector {
    pub jump_boot: [u8; 3],
    pub oem_name: [u8; 8],
    pub bytes_per_sector: LE<u16>,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: LE<u16>,
    pub number_of_fats: u8,
    pub root_entries: LE<u16>,
    pub total_sectors_16: LE<u16>, // 0 if volume needs total_sectors_32
    pub media_descriptor: u8,
    pub sectors_per_fat: LE<u16>,
    pub sectors_per_track: LE<u16>,
    pub number_of_heads: LE<u16>,
    pub hidden_sectors: LE<u32>,
    pub total_sectors_32: LE<u32>,
    pub drive_number: u8,
    _reserved: u8,
    pub extended_boot_signature: u8, // 0x29 if following three fields valid
    pub volume_id: LE<u32>,
    pub volume_label: [u8; 11],
    pub filesystem_type: [u8; 8],
    pub bootcode: [u8; 448],
    pub boot_signature: [u8; 2],
}

const _: () = assert!(mem::size_of::<BootSector>() == BOOT_SECTOR_SIZE);

impl BootSector {
    pub fn from_bytes(bytes: [u8; BOOT_SECTOR_SIZE]) -> Self {
        unsafe { mem::transmute(bytes) }
    }

    pub fn has_extended_fields(&self) -> bool {
        self.extended_boot_signature == 0x29
    }

    pub fn total_sectors(&self) -> u32 {
        match self.total_sectors_16.to_ne() {
            0 => self.total_sectors_32.to_ne(),
            sectors => sectors as u32,
        }
    }
}

/// Geometry parameters of a FAT16 volume, immutable once read
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BootParameterBlock {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub number_of_fats: u8,
    pub max_root_entries: u16,
    pub total_sectors: u32,
    pub sectors_per_fat: u16,
}

impl TryFrom<&BootSector> for BootParameterBlock {
    type Error = DataError;

    fn try_from(boot_sector: &BootSector) -> Result<Self, DataError> {
        let bpb = Self {
            bytes_per_sector: boot_sector.bytes_per_sector.to_ne(),
            sectors_per_cluster: boot_sector.sectors_per_cluster,
            reserved_sectors: boot_sector.reserved_sectors.to_ne(),
            number_of_fats: boot_sector.number_of_fats,
            max_root_entries: boot_sector.root_entries.to_ne(),
            total_sectors: boot_sector.total_sectors(),
            sectors_per_fat: boot_sector.sectors_per_fat.to_ne(),
        };
        bpb.validate()?;
        Ok(bpb)
    }
}

impl BootParameterBlock {
    pub fn validate(&self) -> Result<(), DataError> {
        let bytes_per_sector = self.bytes_per_sector;
        if !bytes_per_sector.is_power_of_two() || !(512..=4096).contains(&bytes_per_sector) {
            return Err(DataError::BootSector("bytes per sector not one of 512, 1024, 2048, 4096"));
        }
        if self.sectors_per_cluster == 0 {
            return Err(DataError::BootSector("zero sectors per cluster"));
        }
        if self.number_of_fats == 0 {
            return Err(DataError::BootSector("no FAT"));
        }
        if self.sectors_per_fat == 0 {
            return Err(DataError::BootSector("zero sectors per FAT"));
        }
        Ok(())
    }
}

/// Volume identification, informative only
#[derive(Clone, Debug, Default)]
pub struct VolumeInfo {
    pub oem_name: heapless::String<8>,
    pub volume_id: Option<u32>,
    pub volume_label: Option<heapless::String<11>>,
}

fn trimmed<const N: usize>(bytes: &[u8]) -> heapless::String<N> {
    let mut string = heapless::String::new();
    let end = bytes.iter().rposition(|&b| b != b' ' && b != 0).map_or(0, |i| i + 1);
    for &byte in &bytes[..end] {
        let ch = if byte.is_ascii() { byte as char } else { '?' };
        string.push(ch).ok();
    }
    string
}

impl From<&BootSector> for VolumeInfo {
    fn from(boot_sector: &BootSector) -> Self {
        let oem_name = trimmed(&boot_sector.oem_name);
        if !boot_sector.has_extended_fields() {
            return Self { oem_name, volume_id: None, volume_label: None };
        }
        Self {
            oem_name,
            volume_id: Some(boot_sector.volume_id.to_ne()),
            volume_label: Some(trimmed(&boot_sector.volume_label)),
        }
    }
}

#[cfg(test)]
mod test {
    use memoffset::offset_of;

    use super::{BootParameterBlock, BootSector, VolumeInfo, BOOT_SECTOR_SIZE};
    use crate::error::DataError;

    #[test]
    fn test_field_offsets() {
        assert_eq!(offset_of!(BootSector, bytes_per_sector), 11);
        assert_eq!(offset_of!(BootSector, sectors_per_cluster), 13);
        assert_eq!(offset_of!(BootSector, reserved_sectors), 14);
        assert_eq!(offset_of!(BootSector, number_of_fats), 16);
        assert_eq!(offset_of!(BootSector, root_entries), 17);
        assert_eq!(offset_of!(BootSector, total_sectors_16), 19);
        assert_eq!(offset_of!(BootSector, sectors_per_fat), 22);
        assert_eq!(offset_of!(BootSector, total_sectors_32), 32);
        assert_eq!(offset_of!(BootSector, volume_label), 43);
        assert_eq!(offset_of!(BootSector, boot_signature), 510);
    }

    #[test]
    fn test_parse() {
        let mut bytes = [0u8; BOOT_SECTOR_SIZE];
        bytes[3..11].copy_from_slice(b"MSWIN4.1");
        bytes[11..13].copy_from_slice(&hex!("00 02"));
        bytes[13] = 4;
        bytes[14..16].copy_from_slice(&hex!("01 00"));
        bytes[16] = 2;
        bytes[17..19].copy_from_slice(&hex!("00 02"));
        bytes[19..21].copy_from_slice(&hex!("00 00"));
        bytes[22..24].copy_from_slice(&hex!("20 00"));
        bytes[32..36].copy_from_slice(&hex!("00 00 01 00"));
        bytes[38] = 0x29;
        bytes[39..43].copy_from_slice(&hex!("78 56 34 12"));
        bytes[43..54].copy_from_slice(b"DATA       ");
        let boot_sector = BootSector::from_bytes(bytes);
        let bpb = BootParameterBlock::try_from(&boot_sector).unwrap();
        let expected = BootParameterBlock {
            bytes_per_sector: 512,
            sectors_per_cluster: 4,
            reserved_sectors: 1,
            number_of_fats: 2,
            max_root_entries: 512,
            total_sectors: 0x10000,
            sectors_per_fat: 32,
        };
        assert_eq!(bpb, expected);

        let info = VolumeInfo::from(&boot_sector);
        assert_eq!(info.oem_name.as_str(), "MSWIN4.1");
        assert_eq!(info.volume_id, Some(0x12345678));
        assert_eq!(info.volume_label.as_ref().map(|l| l.as_str()), Some("DATA"));
    }

    #[test]
    fn test_reject_zero_geometry() {
        let bytes = [0u8; BOOT_SECTOR_SIZE];
        let boot_sector = BootSector::from_bytes(bytes);
        let result = BootParameterBlock::try_from(&boot_sector);
        assert!(matches!(result, Err(DataError::BootSector(_))));
    }

    #[test]
    fn test_bytes_per_sector() {
        let mut bpb = BootParameterBlock {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            number_of_fats: 2,
            max_root_entries: 16,
            total_sectors: 64,
            sectors_per_fat: 1,
        };
        for bytes_per_sector in [512, 1024, 2048, 4096] {
            bpb.bytes_per_sector = bytes_per_sector;
            assert!(bpb.validate().is_ok());
        }
        for bytes_per_sector in [0, 1, 2, 256, 513, 768, 8192] {
            bpb.bytes_per_sector = bytes_per_sector;
            assert!(matches!(bpb.validate(), Err(DataError::BootSector(_))), "{}", bytes_per_sector);
        }
    }
}
