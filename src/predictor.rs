//! Scaled sample prediction.
//!
//! The prediction accumulator is reduced modulo `2^register_bits` as two's
//! complement before the final shift, emulating a fixed-width hardware
//! register. Skipping that reduction diverges from bit-exact behavior for
//! extreme weight/difference combinations.

use crate::control::CtrlSignals;

pub struct PredictorInputs {
    pub ctrl: CtrlSignals,
    pub depth: u32,
    pub omega: i32,
    pub register_bits: i32,
    /// Last sample of the previous band, or -1 when unavailable (P = 0).
    pub prev_band_sample: i32,
    /// Weight/difference dot product.
    pub numerator: i64,
    pub local_sum: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    /// The predicted centered sample, `scaled >> 1`.
    pub predicted: i32,
    /// Twice the predicted sample; its LSB carries the mapping parity.
    pub scaled: i64,
}

fn sign_extend(value: i64, bits: i32) -> i64 {
    if bits <= 0 || bits >= 64 {
        return value;
    }
    let mask = (1i64 << bits) - 1;
    let value = value & mask;
    let sign_bit = 1i64 << (bits - 1);
    if value & sign_bit != 0 {
        value - (1i64 << bits)
    } else {
        value
    }
}

fn mod_pow2(value: i64, bits: i32) -> i64 {
    if bits <= 0 {
        return 0;
    }
    if bits >= 64 {
        return value;
    }
    sign_extend(value & ((1i64 << bits) - 1), bits)
}

pub fn predict(inputs: &PredictorInputs) -> Prediction {
    let loc_term = (inputs.local_sum as i64) << inputs.omega;
    let numerator = mod_pow2(
        inputs.numerator.wrapping_add(loc_term),
        inputs.register_bits,
    );
    let scaled = if inputs.ctrl.first_line && inputs.ctrl.first_in_line {
        if inputs.prev_band_sample >= 0 {
            (inputs.prev_band_sample as i64) << 1
        } else {
            0
        }
    } else {
        let candidate = (numerator >> (inputs.omega + 1)) + 1;
        candidate.clamp(-(1i64 << inputs.depth), (1i64 << inputs.depth) - 1)
    };
    Prediction {
        predicted: (scaled >> 1) as i32,
        scaled,
    }
}
