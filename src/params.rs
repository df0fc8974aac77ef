use crate::{CodecError, Result};

/// Local-sum neighborhood variant. Only `NeighborNarrow` is accepted by the
/// scalar pipeline; the other discriminants exist so that container headers
/// carrying them can be parsed and rejected with a precise error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalSumMode {
    NeighborWide,
    NeighborNarrow,
    ColumnWide,
    ColumnNarrow,
}

impl LocalSumMode {
    pub(crate) fn as_u16(self) -> u16 {
        match self {
            LocalSumMode::NeighborWide => 0,
            LocalSumMode::NeighborNarrow => 1,
            LocalSumMode::ColumnWide => 2,
            LocalSumMode::ColumnNarrow => 3,
        }
    }

    pub(crate) fn from_u16(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(LocalSumMode::NeighborWide),
            1 => Some(LocalSumMode::NeighborNarrow),
            2 => Some(LocalSumMode::ColumnWide),
            3 => Some(LocalSumMode::ColumnNarrow),
            _ => None,
        }
    }
}

/// Sample-adaptive entropy coder sub-parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoderParams {
    pub u_max: u32,
    pub counter_size: u32,
    pub initial_count_exponent: u32,
    pub kz_prime: u32,
}

impl Default for CoderParams {
    fn default() -> Self {
        Self {
            u_max: 18,
            counter_size: 6,
            initial_count_exponent: 1,
            kz_prime: 0,
        }
    }
}

/// Compression parameters, immutable across a single encode or decode.
///
/// `Default` carries the built-in operating point; dimensions and depth must
/// be filled in (or use [`Params::with_dimensions`]) before the struct
/// passes validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    /// Sample bit depth D, in (0, 16].
    pub depth: u32,
    /// Predictor order P. Only 0 is supported.
    pub p: u32,
    pub reduced: bool,
    pub column_oriented: bool,
    pub local_sum: LocalSumMode,
    /// Near-lossless threshold; must be 0 (lossless).
    pub theta: i32,
    /// Weight register scaling exponent Ω, in (0, 31].
    pub omega: i32,
    /// Simulated predictor register width, in (0, 64].
    pub register_bits: i32,
    pub v_min: i32,
    pub v_max: i32,
    pub tinc_log: i32,
    pub coder: CoderParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            nx: 0,
            ny: 0,
            nz: 0,
            depth: 0,
            p: 0,
            reduced: false,
            column_oriented: false,
            local_sum: LocalSumMode::NeighborNarrow,
            theta: 0,
            omega: 19,
            register_bits: 64,
            v_min: -1,
            v_max: 3,
            tinc_log: 6,
            coder: CoderParams::default(),
        }
    }
}

impl Params {
    pub fn with_dimensions(nx: usize, ny: usize, nz: usize, depth: u32) -> Self {
        Self {
            nx,
            ny,
            nz,
            depth,
            ..Self::default()
        }
    }

    pub fn total_samples(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Largest representable raster value, `2^D - 1`.
    pub fn max_sample(&self) -> u16 {
        (((1u32 << self.depth) - 1) & 0xFFFF) as u16
    }

    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return Err(CodecError::InvalidParameter(
                "image dimensions must be positive",
            ));
        }
        if self.nx > 65535 || self.ny > 65535 || self.nz > 65535 {
            return Err(CodecError::InvalidParameter(
                "image dimensions must fit in 16 bits",
            ));
        }
        if self.depth == 0 || self.depth > 16 {
            return Err(CodecError::InvalidParameter(
                "bit depth must be within (0, 16]",
            ));
        }
        if self.p != 0 {
            return Err(CodecError::InvalidParameter(
                "predictor order P > 0 is not supported",
            ));
        }
        if self.reduced {
            return Err(CodecError::InvalidParameter(
                "reduced mode is not supported in the scalar pipeline",
            ));
        }
        if self.local_sum != LocalSumMode::NeighborNarrow {
            return Err(CodecError::InvalidParameter(
                "only neighbor-narrow local sums are implemented",
            ));
        }
        if self.theta != 0 {
            return Err(CodecError::InvalidParameter(
                "theta must be zero for the lossless configuration",
            ));
        }
        if self.omega <= 0 || self.omega > 31 {
            return Err(CodecError::InvalidParameter("OMEGA must be within (0, 31]"));
        }
        if self.register_bits <= 0 || self.register_bits > 64 {
            return Err(CodecError::InvalidParameter(
                "register size must be within (0, 64]",
            ));
        }
        if self.v_min > self.v_max {
            return Err(CodecError::InvalidParameter("V_MIN must not exceed V_MAX"));
        }
        if self.tinc_log < 0 {
            return Err(CodecError::InvalidParameter("TINC_LOG must be non-negative"));
        }
        if self.coder.u_max == 0 || self.coder.u_max > 32 {
            return Err(CodecError::InvalidParameter("UMAX must be within (0, 32]"));
        }
        if self.coder.counter_size == 0 || self.coder.counter_size > 16 {
            return Err(CodecError::InvalidParameter(
                "counter size must be within (0, 16]",
            ));
        }
        if self.coder.initial_count_exponent > 16 {
            return Err(CodecError::InvalidParameter(
                "initial count exponent must be within [0, 16]",
            ));
        }
        if self.coder.kz_prime > 16 {
            return Err(CodecError::InvalidParameter("KZ' must be within [0, 16]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_operating_point_validates() {
        let params = Params::with_dimensions(64, 64, 4, 12);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let params = Params::with_dimensions(0, 64, 4, 12);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_unsupported_modes_rejected() {
        let mut params = Params::with_dimensions(8, 8, 2, 8);
        params.p = 1;
        assert!(params.validate().is_err());

        let mut params = Params::with_dimensions(8, 8, 2, 8);
        params.reduced = true;
        assert!(params.validate().is_err());

        let mut params = Params::with_dimensions(8, 8, 2, 8);
        params.local_sum = LocalSumMode::NeighborWide;
        assert!(params.validate().is_err());

        let mut params = Params::with_dimensions(8, 8, 2, 8);
        params.theta = 2;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_coder_bounds_rejected() {
        let mut params = Params::with_dimensions(8, 8, 2, 8);
        params.coder.u_max = 33;
        assert!(params.validate().is_err());

        let mut params = Params::with_dimensions(8, 8, 2, 8);
        params.coder.counter_size = 17;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_depth_bounds() {
        assert!(Params::with_dimensions(8, 8, 2, 0).validate().is_err());
        assert!(Params::with_dimensions(8, 8, 2, 17).validate().is_err());
        assert!(Params::with_dimensions(8, 8, 2, 16).validate().is_ok());
    }

    #[test]
    fn test_max_sample() {
        assert_eq!(Params::with_dimensions(1, 1, 1, 8).max_sample(), 255);
        assert_eq!(Params::with_dimensions(1, 1, 1, 12).max_sample(), 4095);
        assert_eq!(Params::with_dimensions(1, 1, 1, 16).max_sample(), 65535);
    }

    #[test]
    fn test_local_sum_mode_wire_roundtrip() {
        for mode in [
            LocalSumMode::NeighborWide,
            LocalSumMode::NeighborNarrow,
            LocalSumMode::ColumnWide,
            LocalSumMode::ColumnNarrow,
        ] {
            assert_eq!(LocalSumMode::from_u16(mode.as_u16()), Some(mode));
        }
        assert_eq!(LocalSumMode::from_u16(4), None);
    }
}
