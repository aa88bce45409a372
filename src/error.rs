use core::fmt::Debug;

use displaydoc::Display;

use crate::types::ClusterID;

/// On-disk structures disagree with FAT16 rules
#[derive(Debug, Display, thiserror::Error)]
pub enum DataError {
    /// Invalid boot sector: {0}
    BootSector(&'static str),
    /// Cluster {0} outside addressable range
    InvalidCluster(ClusterID),
    /// Cluster chain ends before file data does
    TruncatedChain,
    /// Cluster chain broken after cluster {0}
    BrokenChain(ClusterID),
    /// Cluster chain loops back on itself
    CyclicChain,
}

/// Out of space
#[derive(Debug, Display, thiserror::Error)]
pub enum AllocationError {
    /// No free cluster left
    NoMoreCluster,
    /// No free root directory slot left
    DirectoryFull,
}

/// Operation not applicable to current image content
#[derive(Debug, Display, thiserror::Error)]
pub enum OperationError {
    /// No such file
    NotFound,
    /// File already exists
    AlreadyExists,
}

/// Caller provided input rejected
#[derive(Debug, Display, thiserror::Error)]
pub enum InputError {
    /// Not a valid 8.3 file name
    InvalidName,
    /// File larger than FAT16 can hold
    FileTooLarge,
}

#[derive(Debug, Display, thiserror::Error)]
pub enum Error<E: Debug> {
    /// Disk image IO error: {0:?}
    IO(E),
    /// Source file unavailable: {0}
    Source(#[source] std::io::Error),
    /// Destination file unavailable: {0}
    Destination(#[source] std::io::Error),
    /// {0}
    Data(#[from] DataError),
    /// {0}
    Allocation(#[from] AllocationError),
    /// {0}
    Operation(#[from] OperationError),
    /// {0}
    Input(#[from] InputError),
}

impl<E: Debug> Error<E> {
    /// Either no free cluster or no free directory slot
    pub fn is_no_space(&self) -> bool {
        matches!(self, Self::Allocation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Operation(OperationError::NotFound))
    }
}
