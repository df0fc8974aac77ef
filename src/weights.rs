//! Adaptive prediction weight vector.

use crate::control::CtrlSignals;

/// Initial weight vector. The first `P` central weights start at
/// `7/8 * 2^omega` with each successive weight an eighth of the previous;
/// the three directional weights at the tail start at zero. In reduced mode
/// every component is a central weight.
pub fn init_weights(reduced: bool, omega: i32, components: usize) -> Vec<i32> {
    let mut weights = vec![0i32; components];
    let p = if reduced {
        components
    } else {
        components.saturating_sub(3)
    };
    if p > 0 {
        weights[0] = ((7i64 << omega) / 8) as i32;
        for i in 1..p {
            weights[i] = weights[i - 1] / 8;
        }
    }
    weights
}

pub fn dot_product(diffs: &[i32], weights: &[i32]) -> i64 {
    diffs
        .iter()
        .zip(weights)
        .map(|(&d, &w)| d as i64 * w as i64)
        .sum()
}

pub struct WeightUpdateInputs<'a> {
    pub ctrl: CtrlSignals,
    pub depth: u32,
    pub omega: i32,
    pub scaled_pred: i64,
    pub sample: i32,
    pub diffs: &'a [i32],
}

/// Post-sample weight adjustment. The very first sample reinitializes the
/// vector; afterwards each weight moves by half the (sign-corrected, scaled)
/// difference, clipped to `[-2^(omega+2), 2^(omega+2) - 1]`.
pub fn weight_update(weights: &mut [i32], inputs: &WeightUpdateInputs, reduced: bool) {
    if weights.is_empty() {
        return;
    }
    if inputs.ctrl.first_line && inputs.ctrl.first_in_line {
        let init = init_weights(reduced, inputs.omega, weights.len());
        weights.copy_from_slice(&init);
        return;
    }

    let non_negative_error = (inputs.sample as i64) << 1 >= inputs.scaled_pred;
    let shift = inputs.ctrl.scale_exponent + (inputs.depth as i32 - inputs.omega);
    let limit = 1i64 << (inputs.omega + 2);
    for (weight, &diff) in weights.iter_mut().zip(inputs.diffs) {
        let mut adjusted = diff as i64;
        if !non_negative_error {
            adjusted = -adjusted;
        }
        if shift > 0 {
            adjusted >>= shift.min(63);
        } else if shift < 0 {
            adjusted <<= (-shift).min(63);
        }
        let updated = *weight as i64 + ((adjusted + 1) >> 1);
        *weight = updated.clamp(-limit, limit - 1) as i32;
    }
}
