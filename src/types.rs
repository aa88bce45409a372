use derive_more::{Display, From, Into};

/// Data region cluster number, clusters 0 and 1 are reserved by the format
#[derive(Copy, Clone, Debug, Default, Display, From, Into, Eq, Hash, Ord, PartialOrd, PartialEq)]
pub struct ClusterID(u16);

impl ClusterID {
    pub const FIRST: Self = Self(2);

    /// Whether this id may address a data cluster, says nothing about the upper bound
    pub fn valid(&self) -> bool {
        self.0 >= Self::FIRST.0
    }

    pub(crate) fn offset(self) -> u64 {
        (self.0 - Self::FIRST.0) as u64
    }
}
