use core::mem;

use bitfield::bitfield;
use derive_more::Into;

use super::name::{ShortName, NAME_SIZE};
use crate::endian::Little as LE;
use crate::types::ClusterID;

pub(crate) const ENTRY_SIZE: usize = 32;
pub(crate) type RawEntry = [u8; ENTRY_SIZE];

pub(crate) const NEVER_USED: u8 = 0x00;
pub(crate) const DELETED: u8 = 0xE5;

bitfield! {
    #[derive(Copy, Clone, Default, Into, PartialEq, Eq)]
    pub struct FileAttributes(u8);
    impl Debug;
    pub read_only, set_read_only: 0;
    pub hidden, set_hidden: 1;
    pub system, set_system: 2;
    pub volume_label, set_volume_label: 3;
    pub directory, set_directory: 4;
    pub archive, set_archive: 5;
}

impl FileAttributes {
    pub fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Attributes stamped on newly written files
    pub fn file() -> Self {
        let mut attributes = Self::default();
        attributes.set_archive(true);
        attributes
    }

    /// Long file name fragments carry all of read-only, hidden, system and volume label
    pub fn long_name(&self) -> bool {
        self.0 & 0x0F == 0x0F
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// First name byte 0x00, does not end the table
    NeverUsed,
    /// First name byte 0xE5
    Deleted,
    InUse,
}

impl EntryState {
    pub fn free(&self) -> bool {
        *self != Self::InUse
    }
}

/// 32-byte root directory record
#[derive(Copy, Clone, Debug)]
#[repr(C, packed(1))]
pub struct DirectoryEntry {
    pub(crate) name: [u8; NAME_SIZE],
    pub(crate) attributes: u8,
    _reserved: [u8; 14], // timestamps on real media, neither written nor interpreted
    pub(crate) first_cluster: LE<u16>,
    pub(crate) file_size: LE<u32>,
}

const _: () = assert!(mem::size_of::<DirectoryEntry>() == ENTRY_SIZE);

impl DirectoryEntry {
    pub fn new(name: ShortName, attributes: FileAttributes, cluster_id: ClusterID, size: u32) -> Self {
        Self {
            name: *name.as_bytes(),
            attributes: attributes.into(),
            _reserved: [0; 14],
            first_cluster: u16::from(cluster_id).into(),
            file_size: size.into(),
        }
    }

    pub(crate) fn from_bytes(bytes: RawEntry) -> Self {
        unsafe { mem::transmute(bytes) }
    }

    pub(crate) fn to_bytes(self) -> RawEntry {
        unsafe { mem::transmute(self) }
    }

    pub fn state(&self) -> EntryState {
        match self.name[0] {
            NEVER_USED => EntryState::NeverUsed,
            DELETED => EntryState::Deleted,
            _ => EntryState::InUse,
        }
    }

    pub fn in_use(&self) -> bool {
        self.state() == EntryState::InUse
    }

    pub fn name(&self) -> ShortName {
        ShortName::from_bytes(self.name)
    }

    pub fn attributes(&self) -> FileAttributes {
        FileAttributes::new(self.attributes)
    }

    /// Zero for files owning no cluster
    pub fn first_cluster(&self) -> ClusterID {
        self.first_cluster.to_ne().into()
    }

    pub fn size(&self) -> u32 {
        self.file_size.to_ne()
    }
}
