use std::fs;
use std::path::Path;

use crate::{CodecError, Result};

/// Load a band-sequential raster of little-endian 16-bit samples.
pub fn load<P: AsRef<Path>>(path: P, nx: usize, ny: usize, nz: usize) -> Result<Vec<u16>> {
    let bytes = fs::read(path)?;
    from_bytes(&bytes, nx, ny, nz)
}

pub fn from_bytes(bytes: &[u8], nx: usize, ny: usize, nz: usize) -> Result<Vec<u16>> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(CodecError::InvalidParameter(
            "BSQ dimensions must be positive",
        ));
    }
    let samples = nx * ny * nz;
    if bytes.len() != samples * 2 {
        return Err(CodecError::SizeMismatch {
            expected: samples * 2,
            actual: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Write samples back out as little-endian 16-bit BSQ.
pub fn save<P: AsRef<Path>>(path: P, samples: &[u16]) -> Result<()> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    fs::write(path, bytes)?;
    Ok(())
}
