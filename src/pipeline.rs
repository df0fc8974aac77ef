//! Encode and decode drivers.
//!
//! Both directions walk the cube in BIP order and run the identical
//! predictor/weight chain; only the mapper/coder arm is mirrored. The
//! decoder reconstructs each neighborhood from previously decoded samples
//! with the current sample zeroed, so the central difference it computes is
//! never consumed.

use log::debug;

use crate::bitstream::Bitstream;
use crate::container::{self, ContainerSummary};
use crate::control::ControlState;
use crate::entropy_coder::{BitReader, BitWriter, SampleAdaptiveDecoder, SampleAdaptiveEncoder};
use crate::local_diff::{local_diff, LocalSamples};
use crate::params::Params;
use crate::predictor::{predict, PredictorInputs};
use crate::residual;
use crate::weights::{dot_product, init_weights, weight_update, WeightUpdateInputs};
use crate::{CodecError, Result};

/// Rolling rows and weight vector for one spectral band.
struct BandState {
    prev_row: Vec<i32>,
    curr_row: Vec<i32>,
    weights: Vec<i32>,
}

impl BandState {
    fn new(params: &Params) -> Self {
        let components = params.p as usize + if params.reduced { 0 } else { 3 };
        Self {
            prev_row: vec![0; params.nx],
            curr_row: vec![0; params.nx],
            weights: init_weights(params.reduced, params.omega, components),
        }
    }

    fn neighborhood(&self, x: usize, y: usize, nx: usize) -> LocalSamples {
        let north = if y > 0 { self.prev_row[x] } else { 0 };
        LocalSamples {
            cur: self.curr_row[x],
            west: if x > 0 { self.curr_row[x - 1] } else { 0 },
            north,
            north_west: if x > 0 && y > 0 { self.prev_row[x - 1] } else { 0 },
            north_east: if y > 0 && x + 1 < nx {
                self.prev_row[x + 1]
            } else {
                north
            },
        }
    }

    fn roll_rows(&mut self) {
        std::mem::swap(&mut self.prev_row, &mut self.curr_row);
        self.curr_row.fill(0);
    }
}

fn create_band_states(params: &Params) -> Vec<BandState> {
    (0..params.nz).map(|_| BandState::new(params)).collect()
}

/// Compress a planar raster into an owned `.c123` container.
pub fn encode(input: &[u16], params: &Params) -> Result<Vec<u8>> {
    let mut out = Bitstream::new();
    encode_into(input, params, &mut out)?;
    Ok(out.into_vec())
}

/// Compress into a caller-supplied sink; a pinned external buffer that is
/// too small for the container surfaces [`CodecError::BitstreamOverflow`].
pub fn encode_into(input: &[u16], params: &Params, out: &mut Bitstream<'_>) -> Result<()> {
    params.validate()?;
    let expected = params.total_samples();
    if input.len() != expected {
        return Err(CodecError::SizeMismatch {
            expected,
            actual: input.len(),
        });
    }
    let max_sample = params.max_sample();
    if let Some(&value) = input.iter().find(|&&value| value > max_sample) {
        return Err(CodecError::SampleOutOfRange {
            value,
            depth: params.depth,
        });
    }

    let mut payload = Bitstream::new();
    let payload_bits = encode_payload(input, params, &mut payload)?;

    let mut header = Vec::with_capacity(container::HEADER_LEN_V3);
    container::write_header(&mut header, params, payload_bits)?;

    out.clear();
    out.extend_from_slice(&header)?;
    out.extend_from_slice(payload.as_slice())?;
    debug!(
        "encoded {} samples into {} payload bits",
        expected, payload_bits
    );
    Ok(())
}

fn encode_payload(input: &[u16], params: &Params, sink: &mut Bitstream<'_>) -> Result<u64> {
    let mut bands = create_band_states(params);
    let mut control = ControlState::new(params);
    let mut coder = SampleAdaptiveEncoder::new(params);
    let mut writer = BitWriter::new(sink);
    let mut diffs = vec![0i32; params.p as usize + 3];

    let band_stride = params.nx * params.ny;
    let offset = 1i32 << (params.depth - 1);
    for s in 0..params.total_samples() {
        let step = control.step();
        let ctrl = step.ctrl;
        let z = step.z;
        let pixel = s / params.nz;
        let x = pixel % params.nx;
        let y = pixel / params.nx;
        let band = &mut bands[z];

        let sample_centered = input[z * band_stride + pixel] as i32 - offset;
        let mut neighborhood = band.neighborhood(x, y, params.nx);
        neighborhood.cur = sample_centered;
        let local = local_diff(&ctrl, &neighborhood, false);
        diffs[0] = local.d_n;
        diffs[1] = local.d_w;
        diffs[2] = local.d_nw;

        let prediction = predict(&PredictorInputs {
            ctrl,
            depth: params.depth,
            omega: params.omega,
            register_bits: params.register_bits,
            prev_band_sample: -1,
            numerator: dot_product(&diffs, &band.weights),
            local_sum: local.local_sum,
        });

        let mapped = residual::map(sample_centered, prediction.scaled, params.depth);
        coder.encode_sample(&ctrl, z, mapped.delta, &mut writer)?;

        weight_update(
            &mut band.weights,
            &WeightUpdateInputs {
                ctrl,
                depth: params.depth,
                omega: params.omega,
                scaled_pred: prediction.scaled,
                sample: sample_centered,
                diffs: &diffs,
            },
            params.reduced,
        );

        band.curr_row[x] = sample_centered;
        if x == params.nx - 1 {
            band.roll_rows();
        }
    }

    writer.finish()?;
    Ok(writer.bits_written())
}

/// Decompress a `.c123` container; dimensions come from its header.
pub fn decode(container_bytes: &[u8]) -> Result<(Params, Vec<u16>)> {
    let summary = container::parse_header(container_bytes)?;
    let mut output = vec![0u16; summary.params.total_samples()];
    decode_with_summary(container_bytes, &summary, &mut output)?;
    Ok((summary.params, output))
}

/// Decompress into a caller-supplied span, which must match the header
/// dimensions exactly.
pub fn decode_into(container_bytes: &[u8], output: &mut [u16]) -> Result<Params> {
    let summary = container::parse_header(container_bytes)?;
    decode_with_summary(container_bytes, &summary, output)?;
    Ok(summary.params)
}

fn decode_with_summary(
    container_bytes: &[u8],
    summary: &ContainerSummary,
    output: &mut [u16],
) -> Result<()> {
    let params = &summary.params;
    params.validate()?;
    let expected = params.total_samples();
    if output.len() != expected {
        return Err(CodecError::SizeMismatch {
            expected,
            actual: output.len(),
        });
    }
    let payload = &container_bytes[summary.header_len()..];
    debug!(
        "decoding {}x{}x{} cube, {} payload bits (container v{})",
        params.nx, params.ny, params.nz, summary.payload_bits, summary.version
    );
    decode_payload(payload, output, params, summary.payload_bits)
}

fn decode_payload(
    payload: &[u8],
    output: &mut [u16],
    params: &Params,
    payload_bits: u64,
) -> Result<()> {
    let mut bands = create_band_states(params);
    let mut control = ControlState::new(params);
    let mut reader = BitReader::new(payload, payload_bits);
    let mut coder = SampleAdaptiveDecoder::new(params);
    let mut diffs = vec![0i32; params.p as usize + 3];

    let band_stride = params.nx * params.ny;
    let offset = 1i32 << (params.depth - 1);
    let max_value = (1i32 << params.depth) - 1;
    for s in 0..params.total_samples() {
        let step = control.step();
        let ctrl = step.ctrl;
        let z = step.z;
        let pixel = s / params.nz;
        let x = pixel % params.nx;
        let y = pixel / params.nx;
        let band = &mut bands[z];

        // The current sample is unknown here; the predictor chain only
        // consumes the directional differences, which ignore it.
        let neighborhood = band.neighborhood(x, y, params.nx);
        let local = local_diff(&ctrl, &neighborhood, false);
        diffs[0] = local.d_n;
        diffs[1] = local.d_w;
        diffs[2] = local.d_nw;

        let prediction = predict(&PredictorInputs {
            ctrl,
            depth: params.depth,
            omega: params.omega,
            register_bits: params.register_bits,
            prev_band_sample: -1,
            numerator: dot_product(&diffs, &band.weights),
            local_sum: local.local_sum,
        });

        let delta = coder.decode_sample(&ctrl, z, &mut reader)?;
        let residual = residual::unmap(delta, prediction.scaled, params.depth);
        let sample_centered = prediction.predicted + residual;
        output[z * band_stride + pixel] = (sample_centered + offset).clamp(0, max_value) as u16;

        weight_update(
            &mut band.weights,
            &WeightUpdateInputs {
                ctrl,
                depth: params.depth,
                omega: params.omega,
                scaled_pred: prediction.scaled,
                sample: sample_centered,
                diffs: &diffs,
            },
            params.reduced,
        );

        band.curr_row[x] = sample_centered;
        if x == params.nx - 1 {
            band.roll_rows();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel_cube() {
        let params = Params::with_dimensions(1, 1, 1, 8);
        let image = vec![200u16];
        let container = encode(&image, &params).unwrap();
        let (_, decoded) = decode(&container).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_single_column_cube() {
        let params = Params::with_dimensions(1, 6, 2, 8);
        let image: Vec<u16> = (0..12).map(|i| (40 * i % 251) as u16).collect();
        let container = encode(&image, &params).unwrap();
        let (_, decoded) = decode(&container).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_sample_out_of_range_rejected() {
        let params = Params::with_dimensions(2, 2, 1, 8);
        let image = vec![0u16, 255, 256, 0];
        assert!(matches!(
            encode(&image, &params),
            Err(CodecError::SampleOutOfRange { value: 256, depth: 8 })
        ));
    }

    #[test]
    fn test_decode_into_size_mismatch() {
        let params = Params::with_dimensions(2, 2, 1, 8);
        let container = encode(&[1, 2, 3, 4], &params).unwrap();
        let mut short = vec![0u16; 3];
        assert!(matches!(
            decode_into(&container, &mut short),
            Err(CodecError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_truncated_payload_underflows() {
        let params = Params::with_dimensions(4, 4, 2, 8);
        let image: Vec<u16> = (0..32).map(|i| (i * 37 % 256) as u16).collect();
        let container = encode(&image, &params).unwrap();
        let truncated = &container[..container.len() - 1];
        assert!(matches!(
            decode(truncated),
            Err(CodecError::BitstreamUnderflow)
        ));
    }

    #[test]
    fn test_full_depth_roundtrip() {
        let params = Params::with_dimensions(5, 3, 2, 16);
        let image: Vec<u16> = (0..30).map(|i| (i as u32 * 8191 % 65536) as u16).collect();
        let container = encode(&image, &params).unwrap();
        let (_, decoded) = decode(&container).unwrap();
        assert_eq!(decoded, image);
    }
}
