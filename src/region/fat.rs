use crate::types::ClusterID;

pub(crate) const ENTRY_SIZE: u64 = 2;
/// Highest cluster number a FAT slot can link to
pub(crate) const MAX_CLUSTER: u16 = 0xFFEF;

/// Decoded 16-bit FAT slot
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Free,
    Next(ClusterID),
    Reserved(u16),
    BadCluster,
    Last,
}

impl From<u16> for Entry {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Free,
            2..=MAX_CLUSTER => Self::Next(value.into()),
            0xFFF7 => Self::BadCluster,
            0xFFF8..=0xFFFF => Self::Last,
            _ => Self::Reserved(value),
        }
    }
}

impl From<Entry> for u16 {
    fn from(entry: Entry) -> u16 {
        match entry {
            Entry::Free => 0,
            Entry::Next(cluster_id) => cluster_id.into(),
            Entry::Reserved(value) => value,
            Entry::BadCluster => 0xFFF7,
            Entry::Last => 0xFFFF,
        }
    }
}
