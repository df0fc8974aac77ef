//! Neighborhood local sums and local differences.

use crate::control::CtrlSignals;

/// Centered samples surrounding the current position. Off-image neighbors
/// are zero; the north-east neighbor falls back to north on the last column.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSamples {
    pub cur: i32,
    pub north: i32,
    pub north_east: i32,
    pub north_west: i32,
    pub west: i32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDiff {
    pub local_sum: i32,
    pub d_c: i32,
    pub d_n: i32,
    pub d_w: i32,
    pub d_nw: i32,
}

/// Neighbor-narrow local sum and the central/directional differences.
///
/// The first line substitutes the north sample for west/north-west in the
/// directional differences; the very first sample forces everything to zero.
pub fn local_diff(ctrl: &CtrlSignals, samples: &LocalSamples, column_oriented: bool) -> LocalDiff {
    let mut out = LocalDiff::default();
    let mut term1 = 0;
    let mut term2 = 0;
    if column_oriented {
        if !ctrl.first_line {
            term1 = 4 * samples.north;
        } else {
            term1 = 4 * samples.west;
        }
    } else if !ctrl.first_line && !ctrl.first_in_line && !ctrl.last_in_line {
        term1 = samples.west + samples.north_west;
        term2 = samples.north + samples.north_east;
    } else if ctrl.first_line && !ctrl.first_in_line {
        term1 = 4 * samples.west;
    } else if !ctrl.first_line && ctrl.first_in_line {
        term1 = 2 * samples.north;
        term2 = 2 * samples.north_east;
    } else if !ctrl.first_line && ctrl.last_in_line {
        term1 = samples.west + samples.north_west;
        term2 = 2 * samples.north;
    }
    out.local_sum = term1 + term2;

    if ctrl.first_line && ctrl.first_in_line {
        out.d_c = 0;
        out.local_sum = 0;
    } else {
        out.d_c = 4 * samples.cur - out.local_sum;
    }

    if !ctrl.first_line {
        out.d_n = 4 * samples.north - out.local_sum;
        if !ctrl.first_in_line {
            out.d_w = 4 * samples.west - out.local_sum;
            out.d_nw = 4 * samples.north_west - out.local_sum;
        } else {
            out.d_w = 4 * samples.north - out.local_sum;
            out.d_nw = 4 * samples.north - out.local_sum;
        }
    }

    out
}
