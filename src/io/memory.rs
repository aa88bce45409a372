use std::io::{Error, ErrorKind};

/// Disk image held in memory, useful for tests and RAM disks.
///
/// Accesses past the end fail instead of growing the buffer,
/// same as a fixed size image file would.
#[derive(Clone, Debug, Default)]
pub struct MemoryIO {
    buffer: Vec<u8>,
}

impl MemoryIO {
    pub fn new(buffer: Vec<u8>) -> Self {
        Self { buffer }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    fn range(&self, offset: u64, len: usize) -> Result<core::ops::Range<usize>, Error> {
        let start = usize::try_from(offset).map_err(|_| Error::from(ErrorKind::UnexpectedEof))?;
        let end = start.checked_add(len).ok_or(Error::from(ErrorKind::UnexpectedEof))?;
        if end > self.buffer.len() {
            return Err(Error::new(ErrorKind::UnexpectedEof, "access beyond end of image"));
        }
        Ok(start..end)
    }
}

impl From<Vec<u8>> for MemoryIO {
    fn from(buffer: Vec<u8>) -> Self {
        Self::new(buffer)
    }
}

impl super::IO for MemoryIO {
    type Error = Error;

    fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.buffer[range]);
        Ok(())
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, data.len())?;
        self.buffer[range].copy_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
