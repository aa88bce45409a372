pub mod memory;
pub mod std;

use core::fmt::Debug;

use crate::error::Error;

/// Random access byte store holding a FAT16 image
pub trait IO {
    type Error: Debug;

    /// Fill `buf` entirely from `offset`, a short read is an error
    fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Self::Error>;
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), Self::Error>;
    fn flush(&mut self) -> Result<(), Self::Error>;
}

pub(crate) struct Wrapper<'a, T>(&'a mut T);

impl<'a, E: Debug, T: IO<Error = E>> Wrapper<'a, T> {
    pub fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.0.read(offset, buf).map_err(|e| Error::IO(e))
    }

    pub fn read_u16(&mut self, offset: u64) -> Result<u16, Error<E>> {
        let mut bytes = [0u8; 2];
        self.read(offset, &mut bytes)?;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), Error<E>> {
        self.0.write(offset, data).map_err(|e| Error::IO(e))
    }

    pub fn flush(&mut self) -> Result<(), Error<E>> {
        self.0.flush().map_err(|e| Error::IO(e))
    }
}

pub(crate) trait Wrap: IO + Sized {
    fn wrap(&mut self) -> Wrapper<'_, Self>;
}

impl<T: IO> Wrap for T {
    fn wrap(&mut self) -> Wrapper<'_, Self> {
        Wrapper(self)
    }
}
