use core::fmt::{self, Debug, Display, Formatter, Write};
use core::str::FromStr;

use crate::error::InputError;

pub(crate) const NAME_SIZE: usize = 11;
const BASE_SIZE: usize = 8;
const EXTENSION_SIZE: usize = 3;

/// Fixed width 8.3 name as stored on disk, space padded, no dot
#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub struct ShortName([u8; NAME_SIZE]);

fn valid_char(byte: u8) -> bool {
    match byte {
        b'A'..=b'Z' | b'0'..=b'9' => true,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'(' | b')' | b'-' | b'@' | b'^' | b'_' => true,
        b'`' | b'{' | b'}' | b'~' => true,
        _ => false,
    }
}

impl ShortName {
    pub const fn from_bytes(bytes: [u8; NAME_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NAME_SIZE] {
        &self.0
    }

    fn base(&self) -> &[u8] {
        let base = &self.0[..BASE_SIZE];
        let end = base.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
        &base[..end]
    }

    fn extension(&self) -> &[u8] {
        let extension = &self.0[BASE_SIZE..];
        let end = extension.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
        &extension[..end]
    }

    /// Human readable form such as `README.TXT`
    pub fn display_name(&self) -> heapless::String<12> {
        let mut name = heapless::String::new();
        write!(name, "{}", self).ok();
        name
    }
}

impl FromStr for ShortName {
    type Err = InputError;

    /// Accepts `NAME.EXT` with up to 8 + 3 characters, lowercase is folded to uppercase
    fn from_str(s: &str) -> Result<Self, InputError> {
        let (base, extension) = match s.split_once('.') {
            Some((base, extension)) => (base, extension),
            None => (s, ""),
        };
        if base.is_empty() || base.len() > BASE_SIZE || extension.len() > EXTENSION_SIZE {
            return Err(InputError::InvalidName);
        }
        let mut bytes = [b' '; NAME_SIZE];
        let (base_field, extension_field) = bytes.split_at_mut(BASE_SIZE);
        for (field, text) in [(base_field, base), (extension_field, extension)] {
            for (slot, byte) in field.iter_mut().zip(text.bytes()) {
                let byte = byte.to_ascii_uppercase();
                if !valid_char(byte) {
                    return Err(InputError::InvalidName);
                }
                *slot = byte;
            }
        }
        Ok(Self(bytes))
    }
}

impl Display for ShortName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for &byte in self.base() {
            f.write_char(if byte.is_ascii() { byte as char } else { '?' })?;
        }
        let extension = self.extension();
        if !extension.is_empty() {
            f.write_char('.')?;
            for &byte in extension {
                f.write_char(if byte.is_ascii() { byte as char } else { '?' })?;
            }
        }
        Ok(())
    }
}

impl Debug for ShortName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ShortName({:?})", self.display_name().as_str())
    }
}
