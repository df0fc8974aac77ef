//! Byte sink backing the compressed container.
//!
//! The sink either owns a grow-on-demand vector or borrows a caller-pinned
//! fixed buffer. Exceeding the capacity of an external buffer surfaces
//! [`CodecError::BitstreamOverflow`]; owned storage never overflows.

use crate::{CodecError, Result};

enum Store<'a> {
    Owned(Vec<u8>),
    External { buf: &'a mut [u8], len: usize },
}

pub struct Bitstream<'a> {
    store: Store<'a>,
}

impl Bitstream<'static> {
    pub fn new() -> Self {
        Self {
            store: Store::Owned(Vec::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Store::Owned(Vec::with_capacity(capacity)),
        }
    }
}

impl<'a> Bitstream<'a> {
    /// Pin the sink to a fixed external buffer.
    pub fn external(buf: &'a mut [u8]) -> Self {
        Self {
            store: Store::External { buf, len: 0 },
        }
    }

    pub fn clear(&mut self) {
        match &mut self.store {
            Store::Owned(vec) => vec.clear(),
            Store::External { len, .. } => *len = 0,
        }
    }

    pub fn push(&mut self, byte: u8) -> Result<()> {
        match &mut self.store {
            Store::Owned(vec) => {
                vec.push(byte);
                Ok(())
            }
            Store::External { buf, len } => {
                if *len >= buf.len() {
                    return Err(CodecError::BitstreamOverflow);
                }
                buf[*len] = byte;
                *len += 1;
                Ok(())
            }
        }
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.store {
            Store::Owned(vec) => {
                vec.extend_from_slice(bytes);
                Ok(())
            }
            Store::External { buf, len } => {
                let end = *len + bytes.len();
                if end > buf.len() {
                    return Err(CodecError::BitstreamOverflow);
                }
                buf[*len..end].copy_from_slice(bytes);
                *len = end;
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Owned(vec) => vec.len(),
            Store::External { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        match &self.store {
            Store::Owned(vec) => vec,
            Store::External { buf, len } => &buf[..*len],
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        match self.store {
            Store::Owned(vec) => vec,
            Store::External { buf, len } => buf[..len].to_vec(),
        }
    }
}

impl Default for Bitstream<'static> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_grows() {
        let mut stream = Bitstream::new();
        for byte in 0..200u8 {
            stream.push(byte).unwrap();
        }
        assert_eq!(stream.len(), 200);
        assert_eq!(stream.as_slice()[199], 199);
    }

    #[test]
    fn test_external_overflow() {
        let mut storage = [0u8; 4];
        let mut stream = Bitstream::external(&mut storage);
        for byte in 0..4u8 {
            stream.push(byte).unwrap();
        }
        assert!(matches!(
            stream.push(4),
            Err(CodecError::BitstreamOverflow)
        ));
    }

    #[test]
    fn test_external_extend_is_all_or_nothing() {
        let mut storage = [0u8; 4];
        let mut stream = Bitstream::external(&mut storage);
        stream.extend_from_slice(&[1, 2]).unwrap();
        assert!(stream.extend_from_slice(&[3, 4, 5]).is_err());
        assert_eq!(stream.len(), 2);
        stream.extend_from_slice(&[3, 4]).unwrap();
        assert_eq!(stream.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_resets_external_length() {
        let mut storage = [0u8; 2];
        let mut stream = Bitstream::external(&mut storage);
        stream.push(9).unwrap();
        stream.clear();
        assert!(stream.is_empty());
        stream.extend_from_slice(&[7, 8]).unwrap();
        assert_eq!(stream.as_slice(), &[7, 8]);
    }
}
