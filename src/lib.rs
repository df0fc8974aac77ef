use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("sample value {value} exceeds the {depth}-bit range")]
    SampleOutOfRange { value: u16, depth: u32 },
    #[error("container too small")]
    ContainerTooSmall,
    #[error("invalid container magic")]
    BadMagic,
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u16),
    #[error("bitstream exhausted before the payload was complete")]
    BitstreamUnderflow,
    #[error("external bitstream buffer overflow")]
    BitstreamOverflow,
    #[error("unsupported raster format")]
    UnsupportedFormat,
    #[error("invalid raster data: {0}")]
    InvalidRaster(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;

pub mod bitstream;
pub mod bsq;
pub mod container;
pub mod control;
pub mod entropy_coder;
pub mod local_diff;
pub mod params;
pub mod pipeline;
pub mod ppm;
pub mod predictor;
pub mod residual;
pub mod weights;

pub use bitstream::Bitstream;
pub use container::{read_summary, ContainerSummary};
pub use params::{CoderParams, LocalSumMode, Params};
pub use pipeline::{decode, decode_into, encode, encode_into};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_tiny_cube() {
        let params = Params::with_dimensions(4, 4, 2, 8);
        let image: Vec<u16> = (0..32).map(|i| (i * 7 % 256) as u16).collect();

        let container = encode(&image, &params).unwrap();
        assert_eq!(&container[..4], b"C123");

        let (decoded_params, decoded) = decode(&container).unwrap();
        assert_eq!(decoded_params.nx, 4);
        assert_eq!(decoded_params.depth, 8);
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_encode_rejects_wrong_size() {
        let params = Params::with_dimensions(4, 4, 2, 8);
        let image = vec![0u16; 31];
        assert!(matches!(
            encode(&image, &params),
            Err(CodecError::SizeMismatch {
                expected: 32,
                actual: 31
            })
        ));
    }
}
