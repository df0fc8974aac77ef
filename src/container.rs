//! Container header codec for the `.c123` wire format.
//!
//! Little-endian packed records. Version 3 is the current 46-byte layout
//! carrying every tunable; version 2 is a 30-byte legacy layout accepted on
//! read with fixed defaults for the fields it lacks. Encoding always emits
//! version 3.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::params::{LocalSumMode, Params};
use crate::{CodecError, Result};

pub const MAGIC: [u8; 4] = *b"C123";
pub const VERSION_V2: u16 = 2;
pub const VERSION_V3: u16 = 3;
pub const HEADER_LEN_V2: usize = 30;
pub const HEADER_LEN_V3: usize = 46;

const FLAG_REDUCED: u16 = 0x0001;
const FLAG_COLUMN_ORIENTED: u16 = 0x0002;

#[derive(Debug, Clone)]
pub struct ContainerSummary {
    pub params: Params,
    pub payload_bits: u64,
    pub version: u16,
}

impl ContainerSummary {
    pub fn header_len(&self) -> usize {
        match self.version {
            VERSION_V2 => HEADER_LEN_V2,
            _ => HEADER_LEN_V3,
        }
    }

    pub fn payload_bytes(&self) -> usize {
        ((self.payload_bits + 7) / 8) as usize
    }
}

/// Serialize the version-3 header.
pub fn write_header(out: &mut Vec<u8>, params: &Params, payload_bits: u64) -> Result<()> {
    let mut flags = 0u16;
    if params.reduced {
        flags |= FLAG_REDUCED;
    }
    if params.column_oriented {
        flags |= FLAG_COLUMN_ORIENTED;
    }

    out.extend_from_slice(&MAGIC);
    out.write_u16::<LittleEndian>(VERSION_V3)?;
    out.write_u16::<LittleEndian>(params.nx as u16)?;
    out.write_u16::<LittleEndian>(params.ny as u16)?;
    out.write_u16::<LittleEndian>(params.nz as u16)?;
    out.write_u16::<LittleEndian>(params.depth as u16)?;
    out.write_u16::<LittleEndian>(params.p as u16)?;
    out.write_u16::<LittleEndian>(params.local_sum.as_u16())?;
    out.write_u16::<LittleEndian>(flags)?;
    out.write_i16::<LittleEndian>(params.v_min as i16)?;
    out.write_i16::<LittleEndian>(params.v_max as i16)?;
    out.write_i16::<LittleEndian>(params.omega as i16)?;
    out.write_i16::<LittleEndian>(params.register_bits as i16)?;
    out.write_i16::<LittleEndian>(params.tinc_log as i16)?;
    out.write_u16::<LittleEndian>(params.coder.u_max as u16)?;
    out.write_u16::<LittleEndian>(params.coder.counter_size as u16)?;
    out.write_u16::<LittleEndian>(params.coder.initial_count_exponent as u16)?;
    out.write_u16::<LittleEndian>(params.coder.kz_prime as u16)?;
    out.write_u32::<LittleEndian>(payload_bits as u32)?;
    out.write_u32::<LittleEndian>(0)?; // reserved
    Ok(())
}

/// Parse a container header without touching the payload.
pub fn parse_header(bytes: &[u8]) -> Result<ContainerSummary> {
    if bytes.len() < HEADER_LEN_V2 {
        return Err(CodecError::ContainerTooSmall);
    }
    if bytes[..4] != MAGIC {
        return Err(CodecError::BadMagic);
    }

    let mut cursor = Cursor::new(&bytes[4..]);
    let version = cursor.read_u16::<LittleEndian>()?;
    match version {
        VERSION_V2 => parse_v2(&mut cursor),
        VERSION_V3 => {
            if bytes.len() < HEADER_LEN_V3 {
                return Err(CodecError::ContainerTooSmall);
            }
            parse_v3(&mut cursor)
        }
        other => Err(CodecError::UnsupportedVersion(other)),
    }
}

/// Alias for [`parse_header`] under the name the front ends use.
pub fn read_summary(bytes: &[u8]) -> Result<ContainerSummary> {
    parse_header(bytes)
}

fn parse_v2(cursor: &mut Cursor<&[u8]>) -> Result<ContainerSummary> {
    let mut params = Params {
        nx: cursor.read_u16::<LittleEndian>()? as usize,
        ny: cursor.read_u16::<LittleEndian>()? as usize,
        nz: cursor.read_u16::<LittleEndian>()? as usize,
        depth: cursor.read_u16::<LittleEndian>()? as u32,
        p: cursor.read_u16::<LittleEndian>()? as u32,
        ..Params::default()
    };
    params.local_sum = if cursor.read_u16::<LittleEndian>()? != 0 {
        LocalSumMode::NeighborNarrow
    } else {
        LocalSumMode::NeighborWide
    };
    // The writer that produced version-2 streams compiled these in.
    params.v_min = -6;
    params.v_max = 9;
    params.omega = 19;
    params.register_bits = 64;
    params.tinc_log = 4;
    params.coder.u_max = 9;
    params.coder.counter_size = 8;
    params.coder.initial_count_exponent = 6;
    params.coder.kz_prime = 8;

    let payload_bits = cursor.read_u32::<LittleEndian>()? as u64;
    Ok(ContainerSummary {
        params,
        payload_bits,
        version: VERSION_V2,
    })
}

fn parse_v3(cursor: &mut Cursor<&[u8]>) -> Result<ContainerSummary> {
    let mut params = Params {
        nx: cursor.read_u16::<LittleEndian>()? as usize,
        ny: cursor.read_u16::<LittleEndian>()? as usize,
        nz: cursor.read_u16::<LittleEndian>()? as usize,
        depth: cursor.read_u16::<LittleEndian>()? as u32,
        p: cursor.read_u16::<LittleEndian>()? as u32,
        ..Params::default()
    };
    params.local_sum = LocalSumMode::from_u16(cursor.read_u16::<LittleEndian>()?)
        .ok_or(CodecError::InvalidParameter("unknown local sum mode"))?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    params.reduced = flags & FLAG_REDUCED != 0;
    params.column_oriented = flags & FLAG_COLUMN_ORIENTED != 0;
    params.v_min = cursor.read_i16::<LittleEndian>()? as i32;
    params.v_max = cursor.read_i16::<LittleEndian>()? as i32;
    params.omega = cursor.read_i16::<LittleEndian>()? as i32;
    params.register_bits = cursor.read_i16::<LittleEndian>()? as i32;
    params.tinc_log = cursor.read_i16::<LittleEndian>()? as i32;
    params.coder.u_max = cursor.read_u16::<LittleEndian>()? as u32;
    params.coder.counter_size = cursor.read_u16::<LittleEndian>()? as u32;
    params.coder.initial_count_exponent = cursor.read_u16::<LittleEndian>()? as u32;
    params.coder.kz_prime = cursor.read_u16::<LittleEndian>()? as u32;

    let payload_bits = cursor.read_u32::<LittleEndian>()? as u64;
    Ok(ContainerSummary {
        params,
        payload_bits,
        version: VERSION_V3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_params() -> Params {
        let mut params = Params::with_dimensions(320, 240, 16, 12);
        params.v_min = -6;
        params.v_max = 9;
        params.tinc_log = 4;
        params.coder.u_max = 9;
        params.coder.counter_size = 8;
        params.coder.initial_count_exponent = 6;
        params.coder.kz_prime = 8;
        params
    }

    #[test]
    fn test_v3_header_roundtrip() {
        let params = make_params();
        let mut bytes = Vec::new();
        write_header(&mut bytes, &params, 12345).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN_V3);

        let summary = parse_header(&bytes).unwrap();
        assert_eq!(summary.version, VERSION_V3);
        assert_eq!(summary.payload_bits, 12345);
        assert_eq!(summary.params, params);
        assert_eq!(summary.header_len(), HEADER_LEN_V3);
    }

    #[test]
    fn test_v2_header_defaults() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        for field in [VERSION_V2, 64, 32, 8, 10, 0, 1] {
            bytes.extend_from_slice(&field.to_le_bytes());
        }
        bytes.extend_from_slice(&777u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 8]); // reserved0 + reserved1
        assert_eq!(bytes.len(), HEADER_LEN_V2);

        let summary = parse_header(&bytes).unwrap();
        assert_eq!(summary.version, VERSION_V2);
        assert_eq!(summary.payload_bits, 777);
        let params = &summary.params;
        assert_eq!((params.nx, params.ny, params.nz), (64, 32, 8));
        assert_eq!(params.depth, 10);
        assert_eq!(params.local_sum, LocalSumMode::NeighborNarrow);
        assert_eq!(params.v_min, -6);
        assert_eq!(params.v_max, 9);
        assert_eq!(params.omega, 19);
        assert_eq!(params.register_bits, 64);
        assert_eq!(params.tinc_log, 4);
        assert_eq!(params.coder.u_max, 9);
        assert_eq!(params.coder.counter_size, 8);
        assert_eq!(params.coder.initial_count_exponent, 6);
        assert_eq!(params.coder.kz_prime, 8);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, &make_params(), 1).unwrap();
        bytes[0] = b'X';
        assert!(matches!(parse_header(&bytes), Err(CodecError::BadMagic)));
    }

    #[test]
    fn test_short_container_rejected() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, &make_params(), 1).unwrap();
        assert!(matches!(
            parse_header(&bytes[..HEADER_LEN_V2 - 1]),
            Err(CodecError::ContainerTooSmall)
        ));
        // Long enough for a v2 record but truncated for v3.
        assert!(matches!(
            parse_header(&bytes[..HEADER_LEN_V2]),
            Err(CodecError::ContainerTooSmall)
        ));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, &make_params(), 1).unwrap();
        bytes[4] = 9;
        assert!(matches!(
            parse_header(&bytes),
            Err(CodecError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_payload_byte_count_rounds_up() {
        let summary = ContainerSummary {
            params: make_params(),
            payload_bits: 17,
            version: VERSION_V3,
        };
        assert_eq!(summary.payload_bytes(), 3);
    }
}
