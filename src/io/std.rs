use std::fs;
use std::io::prelude::*;
use std::io::SeekFrom;
use std::path::Path;

/// Disk image backed by a host file, opened for reading and writing
#[derive(Debug)]
pub struct FileIO {
    file: fs::File,
}

impl FileIO {
    pub fn open<P: AsRef<Path>>(filepath: P) -> std::io::Result<Self> {
        let file = fs::File::options().read(true).write(true).open(filepath)?;
        Ok(Self { file })
    }

    pub fn into_inner(self) -> fs::File {
        self.file
    }
}

impl From<fs::File> for FileIO {
    fn from(file: fs::File) -> Self {
        Self { file }
    }
}

impl super::IO for FileIO {
    type Error = std::io::Error;

    fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), Self::Error> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.file.flush()
    }
}
