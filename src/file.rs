use core::fmt::Debug;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::directory::{EntryRef, RootDirectory};
use crate::error::{DataError, Error, InputError, OperationError};
use crate::io::{self, Wrap};
use crate::region::data::entry::{DirectoryEntry, FileAttributes};
use crate::region::data::name::ShortName;
use crate::region::fat::Entry;
use crate::types::ClusterID;
use crate::Fat16;

#[derive(Copy, Clone, Debug)]
pub struct InsertOptions {
    /// Attribute bits stamped on the new directory entry
    pub attributes: FileAttributes,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self { attributes: FileAttributes::file() }
    }
}

impl<E: Debug, IO: io::IO<Error = E>> Fat16<IO> {
    /// Occupied root directory entries in slot order
    pub fn list(&mut self) -> Result<Vec<EntryRef>, Error<E>> {
        let entries = self.root.list_entries(&mut self.io)?;
        let iter = entries.into_iter().enumerate().filter(|(_, entry)| entry.in_use());
        Ok(iter.map(|(index, entry)| EntryRef { index, entry }).collect())
    }

    fn find_short_name(&mut self, name: &ShortName) -> Result<Option<EntryRef>, Error<E>> {
        let entries = self.root.list_entries(&mut self.io)?;
        let index = RootDirectory::find_by_name(&entries, name);
        Ok(index.map(|index| EntryRef { index, entry: entries[index] }))
    }

    /// Find a file by its 8.3 name, case insensitive.
    ///
    /// Fails with `InvalidName` if `name` is not a valid 8.3 name.
    pub fn find(&mut self, name: &str) -> Result<Option<EntryRef>, Error<E>> {
        let name: ShortName = name.parse()?;
        self.find_short_name(&name)
    }

    /// A name that can't be stored is never present, so it is `NotFound` as well
    fn lookup(&mut self, name: &str) -> Result<EntryRef, Error<E>> {
        let entry_ref = match name.parse::<ShortName>() {
            Ok(name) => self.find_short_name(&name)?,
            Err(_) => None,
        };
        entry_ref.ok_or(OperationError::NotFound.into())
    }

    fn read_entry<W: Write>(&mut self, entry: &DirectoryEntry, writer: &mut W) -> Result<u32, Error<E>> {
        let size = entry.size();
        trace!("Read {} of {} bytes from cluster {}", entry.name(), size, entry.first_cluster());
        let cluster_size = self.geometry.cluster_size();
        let mut buffer = vec![0u8; cluster_size as usize];
        let mut chain = self.fat.chain(entry.first_cluster());
        let mut remaining = size as u64;
        while remaining > 0 {
            let cluster_id = match chain.next(&mut self.io)? {
                Some(cluster_id) => cluster_id,
                None => {
                    warn!("Chain of {} ends with {} bytes unread", entry.name(), remaining);
                    return Err(DataError::TruncatedChain.into());
                }
            };
            let length = core::cmp::min(remaining, cluster_size) as usize;
            let address = self.geometry.cluster_address(cluster_id)?;
            self.io.wrap().read(address, &mut buffer[..length])?;
            writer.write_all(&buffer[..length]).map_err(Error::Destination)?;
            remaining -= length as u64;
        }
        Ok(size)
    }

    /// Copy file content into `writer`, returns file size
    pub fn read_into<W: Write>(&mut self, name: &str, writer: &mut W) -> Result<u32, Error<E>> {
        let entry_ref = self.lookup(name)?;
        self.read_entry(&entry_ref, writer)
    }

    fn extract_entry(&mut self, entry: &DirectoryEntry, path: &Path) -> Result<u32, Error<E>> {
        let mut file = fs::File::create(path).map_err(Error::Destination)?;
        let result = self.read_entry(entry, &mut file).and_then(|size| match file.flush() {
            Ok(()) => Ok(size),
            Err(e) => Err(Error::Destination(e)),
        });
        if result.is_err() {
            drop(file);
            if let Err(e) = fs::remove_file(path) {
                warn!("Unable to remove partial file {}: {}", path.display(), e);
            }
        }
        result
    }

    /// Copy a file out of the image to host `path`, created or truncated.
    ///
    /// A partially written host file is removed on failure.
    pub fn extract<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<u32, Error<E>> {
        let entry_ref = self.lookup(name)?;
        let path = path.as_ref();
        let size = self.extract_entry(&entry_ref, path)?;
        debug!("Extracted {} to {}", entry_ref.name(), path.display());
        Ok(size)
    }

    /// Validate name and find a free slot before any cluster is touched
    fn prepare(&mut self, name: &str) -> Result<(ShortName, usize), Error<E>> {
        let name: ShortName = name.parse()?;
        let entries = self.root.list_entries(&mut self.io)?;
        if RootDirectory::find_by_name(&entries, &name).is_some() {
            return Err(OperationError::AlreadyExists.into());
        }
        let index = RootDirectory::find_free_slot_index(&entries)?;
        Ok((name, index))
    }

    /// Read `size` bytes from `reader` into freshly allocated clusters,
    /// every allocated cluster is pushed to `clusters` so the caller can roll back
    fn write_clusters<R: Read>(
        &mut self,
        reader: &mut R,
        size: u32,
        clusters: &mut Vec<ClusterID>,
    ) -> Result<ClusterID, Error<E>> {
        let cluster_size = self.geometry.cluster_size();
        let mut buffer = vec![0u8; cluster_size as usize];
        let mut remaining = size as u64;
        while remaining > 0 {
            let length = core::cmp::min(remaining, cluster_size) as usize;
            reader.read_exact(&mut buffer[..length]).map_err(Error::Source)?;
            let cluster_id = self.allocator.allocate(&mut self.io)?;
            let last = clusters.last().copied();
            clusters.push(cluster_id);
            if let Some(last) = last {
                self.fat.set_next(&mut self.io, last, Entry::Next(cluster_id))?;
            }
            let address = self.geometry.cluster_address(cluster_id)?;
            self.io.wrap().write(address, &buffer[..length])?;
            remaining -= length as u64;
        }
        Ok(clusters.first().copied().unwrap_or_default())
    }

    fn write_entry<R: Read>(
        &mut self,
        index: usize,
        name: ShortName,
        reader: &mut R,
        size: u64,
        options: InsertOptions,
    ) -> Result<EntryRef, Error<E>> {
        let size = u32::try_from(size).map_err(|_| InputError::FileTooLarge)?;
        let mut clusters = Vec::new();
        let result = self.write_clusters(reader, size, &mut clusters).and_then(|first_cluster| {
            let entry = DirectoryEntry::new(name, options.attributes, first_cluster, size);
            self.root.write_entry_at(&mut self.io, index, entry)?;
            Ok(EntryRef { index, entry })
        });
        let entry_ref = match result {
            Ok(entry_ref) => entry_ref,
            Err(e) => {
                warn!("Write {} failed, release {} clusters", name, clusters.len());
                if let Err(error) = self.allocator.release_clusters(&mut self.io, &clusters) {
                    warn!("Unable to release clusters of {}: {:?}", name, error);
                }
                return Err(e);
            }
        };
        debug!("Wrote {} bytes as {} in slot {}", size, name, index);
        self.io.wrap().flush()?;
        Ok(entry_ref)
    }

    /// Create a file named `name` holding exactly `size` bytes read from `reader`
    pub fn write_from<R: Read>(
        &mut self,
        name: &str,
        reader: &mut R,
        size: u64,
        options: InsertOptions,
    ) -> Result<EntryRef, Error<E>> {
        let (name, index) = self.prepare(name)?;
        self.write_entry(index, name, reader, size, options)
    }

    /// Copy host file `source` into the image as `name`
    pub fn insert<P: AsRef<Path>>(&mut self, source: P, name: &str) -> Result<EntryRef, Error<E>> {
        self.insert_with(source, name, InsertOptions::default())
    }

    pub fn insert_with<P: AsRef<Path>>(
        &mut self,
        source: P,
        name: &str,
        options: InsertOptions,
    ) -> Result<EntryRef, Error<E>> {
        let (name, index) = self.prepare(name)?;
        let mut file = fs::File::open(source.as_ref()).map_err(Error::Source)?;
        let size = file.metadata().map_err(Error::Source)?.len();
        self.write_entry(index, name, &mut file, size, options)
    }

    fn delete_entry(&mut self, entry_ref: &EntryRef) -> Result<(), Error<E>> {
        self.root.mark_free_at(&mut self.io, entry_ref.index)?;
        let first_cluster = entry_ref.first_cluster();
        if first_cluster.valid() {
            let count = self.allocator.release(&mut self.io, first_cluster)?;
            debug!("Deleted {}, {} clusters released", entry_ref.name(), count);
        }
        self.io.wrap().flush()
    }

    /// Remove a file, its slot is tombstoned and its clusters freed
    pub fn delete(&mut self, name: &str) -> Result<(), Error<E>> {
        let entry_ref = self.lookup(name)?;
        self.delete_entry(&entry_ref)
    }

    /// Extract a file into host `directory` under its 8.3 name, then delete it from the image.
    ///
    /// Nothing is deleted if extraction fails.
    pub fn move_out<P: AsRef<Path>>(&mut self, name: &str, directory: P) -> Result<PathBuf, Error<E>> {
        let entry_ref = self.lookup(name)?;
        let path = directory.as_ref().join(entry_ref.name().display_name().as_str());
        self.extract_entry(&entry_ref, &path)?;
        self.delete_entry(&entry_ref)?;
        debug!("Moved {} to {}", entry_ref.name(), path.display());
        Ok(path)
    }

    /// Insert host file `path` under its own name uppercased, then remove it from host.
    ///
    /// The host file stays untouched if insertion fails.
    pub fn import_and_remove_source<P: AsRef<Path>>(&mut self, path: P) -> Result<EntryRef, Error<E>> {
        let path = path.as_ref();
        let name = path.file_name().and_then(|name| name.to_str()).ok_or(InputError::InvalidName)?;
        let entry_ref = self.insert(path, name)?;
        fs::remove_file(path).map_err(Error::Source)?;
        debug!("Moved {} into image as {}", path.display(), entry_ref.name());
        Ok(entry_ref)
    }
}
