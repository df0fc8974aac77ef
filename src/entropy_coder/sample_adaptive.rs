//! Sample-adaptive Golomb-power-of-2 coder.
//!
//! A single global counter and one accumulator per band drive the code
//! parameter k. Encoder and decoder derive k from identical pre-sample
//! state and apply identical updates afterwards; any divergence corrupts
//! the remainder of the stream.

use crate::control::CtrlSignals;
use crate::entropy_coder::{BitReader, BitWriter};
use crate::params::Params;
use crate::Result;

fn mask_bits(bits: u32) -> u32 {
    if bits == 0 {
        0
    } else if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Counter, per-band accumulators, and the derived constants shared by the
/// encode and decode directions.
struct CoderState {
    depth: u32,
    u_max: u32,
    initial_count_exponent: u32,
    nz: usize,
    accumulators: Vec<u32>,
    counter: u32,
    initial_accumulator: u32,
    max_counter: u32,
}

impl CoderState {
    fn new(params: &Params) -> Self {
        let coder = params.coder;
        let lhs = 3u64 << (coder.kz_prime + 6);
        let initial_accumulator = (((lhs - 49) << coder.initial_count_exponent) >> 7) as u32;
        let max_counter = if coder.counter_size >= 32 {
            u32::MAX
        } else {
            (1u32 << coder.counter_size) - 1
        };
        Self {
            depth: params.depth,
            u_max: coder.u_max,
            initial_count_exponent: coder.initial_count_exponent,
            nz: params.nz,
            accumulators: vec![0; params.nz],
            counter: 0,
            initial_accumulator,
            max_counter,
        }
    }

    /// Select k from the pre-sample counter and band accumulator.
    fn code_parameter(&self, z: usize) -> u32 {
        if self.depth <= 1 {
            return 0;
        }
        let counter = self.counter;
        if counter == 0 {
            return self.depth - 2;
        }
        let rhs = self.accumulators[z].wrapping_add((49 * counter) >> 7);
        if (counter as u64) << 1 > rhs as u64 {
            return 0;
        }
        let mut selected = 0;
        for i in 1..=(self.depth - 2) {
            if (counter as u64) << i <= rhs as u64 {
                selected = i;
            }
        }
        selected
    }

    fn advance(&mut self, first_sample: bool, z: usize, delta: u32) {
        let counter_pre = self.counter;

        if first_sample {
            self.accumulators[z] = self.initial_accumulator;
        } else {
            let sum = self.accumulators[z] as u64 + delta as u64;
            self.accumulators[z] = if counter_pre < self.max_counter {
                sum.min(u32::MAX as u64) as u32
            } else {
                ((sum + 1) >> 1) as u32
            };
        }

        if first_sample {
            self.counter = 1 << self.initial_count_exponent;
        } else if z + 1 >= self.nz {
            self.counter = if counter_pre < self.max_counter {
                counter_pre + 1
            } else {
                (counter_pre + 1) >> 1
            };
        }
    }
}

pub struct SampleAdaptiveEncoder {
    state: CoderState,
}

impl SampleAdaptiveEncoder {
    pub fn new(params: &Params) -> Self {
        Self {
            state: CoderState::new(params),
        }
    }

    pub fn encode_sample(
        &mut self,
        ctrl: &CtrlSignals,
        z: usize,
        delta: u32,
        writer: &mut BitWriter<'_, '_>,
    ) -> Result<()> {
        let first_sample = ctrl.first_line && ctrl.first_in_line;
        if first_sample {
            // The first sample of every band goes out verbatim.
            writer.write_bits(delta & mask_bits(self.state.depth), self.state.depth)?;
        } else {
            let k = self.state.code_parameter(z);
            self.emit_code(delta, k, writer)?;
        }
        self.state.advance(first_sample, z, delta);
        Ok(())
    }

    fn emit_code(&self, delta: u32, k: u32, writer: &mut BitWriter<'_, '_>) -> Result<()> {
        let value = delta & mask_bits(self.state.depth);
        let u = if k >= 32 { 0 } else { value >> k };
        if u >= self.state.u_max {
            for _ in 0..self.state.u_max {
                writer.write_bit(false)?;
            }
            writer.write_bits(value, self.state.depth)?;
        } else {
            for _ in 0..u {
                writer.write_bit(false)?;
            }
            writer.write_bit(true)?;
            if k > 0 {
                writer.write_bits(value & mask_bits(k), k)?;
            }
        }
        Ok(())
    }
}

pub struct SampleAdaptiveDecoder {
    state: CoderState,
}

impl SampleAdaptiveDecoder {
    pub fn new(params: &Params) -> Self {
        Self {
            state: CoderState::new(params),
        }
    }

    pub fn decode_sample(
        &mut self,
        ctrl: &CtrlSignals,
        z: usize,
        reader: &mut BitReader<'_>,
    ) -> Result<u32> {
        let first_sample = ctrl.first_line && ctrl.first_in_line;
        let delta = if first_sample {
            reader.read_bits(self.state.depth)?
        } else {
            let k = self.state.code_parameter(z);
            let u = self.read_unary_limited(reader)?;
            if u >= self.state.u_max {
                reader.read_bits(self.state.depth)?
            } else {
                let remainder = if k == 0 { 0 } else { reader.read_bits(k)? };
                (u << k) | remainder
            }
        };
        self.state.advance(first_sample, z, delta);
        Ok(delta)
    }

    /// Count leading zeros, stopping at the first one bit or at `u_max`.
    fn read_unary_limited(&self, reader: &mut BitReader<'_>) -> Result<u32> {
        let mut zeros = 0;
        while zeros < self.state.u_max {
            if reader.read_bit()? {
                return Ok(zeros);
            }
            zeros += 1;
        }
        Ok(zeros)
    }
}
