#[cfg(test)]
#[ctor::ctor]
fn init_backtrace() {
    color_backtrace::install();
}

/// Absolute tolerance used when comparing log-odds scores.
pub const SCORE_TOLERANCE: f64 = 1e-9;

pub trait ApproxEq {
    fn approx_eq(self, other: Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(self, other: Self) -> bool {
        (self - other).abs() <= SCORE_TOLERANCE
    }
}

impl ApproxEq for Option<f64> {
    fn approx_eq(self, other: Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.approx_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}
