//! The escape-time test: iterate `z <- z^2 + c` from zero and watch for
//! `|z|^2` leaving the radius-2 disc.

use std::num::NonZeroU32;

use crate::error::{ExplorerError, Result};

/// Squared escape radius.
const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// Maximum number of iterations the test may run for one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IterationBudget(NonZeroU32);

impl IterationBudget {
    pub fn new(max_iterations: u32) -> Result<Self> {
        NonZeroU32::new(max_iterations)
            .map(IterationBudget)
            .ok_or(ExplorerError::InvalidBudget)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Returns the iteration (1-based) at which the orbit of `c = cx + i·cy`
/// left the escape radius, or `None` if it stayed bounded for the whole
/// budget.
///
/// Non-finite constants escape at iteration 0. The magnitude test is
/// written so that a NaN magnitude also counts as escaped.
pub fn escape_time(cx: f64, cy: f64, budget: IterationBudget) -> Option<u32> {
    if !(cx.is_finite() && cy.is_finite()) {
        return Some(0);
    }

    let max_iterations = budget.get();
    let (mut x, mut y) = (0.0_f64, 0.0_f64);
    let mut iteration = 0;
    while iteration < max_iterations {
        let x_next = x * x - y * y + cx;
        let y_next = 2.0 * x * y + cy;
        x = x_next;
        y = y_next;
        iteration += 1;
        if !(x * x + y * y <= ESCAPE_RADIUS_SQR) {
            return Some(iteration);
        }
    }
    None
}

/// True when the point did not escape within the budget.
#[inline]
pub fn is_bounded(cx: f64, cy: f64, budget: IterationBudget) -> bool {
    escape_time(cx, cy, budget).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(n: u32) -> IterationBudget {
        IterationBudget::new(n).unwrap()
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(IterationBudget::new(0).is_err());
        assert_eq!(budget(7).get(), 7);
    }

    #[test]
    fn origin_never_escapes() {
        for n in [1, 2, 50, 1000] {
            assert!(is_bounded(0.0, 0.0, budget(n)));
        }
    }

    #[test]
    fn three_escapes_on_first_iteration() {
        for n in [1, 2, 50] {
            assert_eq!(escape_time(3.0, 0.0, budget(n)), Some(1));
            assert!(!is_bounded(3.0, 0.0, budget(n)));
        }
    }

    #[test]
    fn corners_escape_immediately() {
        for (cx, cy) in [(-2.0, -2.0), (2.0, -2.0), (-2.0, 2.0), (2.0, 2.0)] {
            assert_eq!(escape_time(cx, cy, budget(50)), Some(1));
        }
    }

    #[test]
    fn known_interior_points_stay_bounded() {
        // Main cardioid and period-2 bulb.
        assert!(is_bounded(-0.1, 0.1, budget(500)));
        assert!(is_bounded(-1.0, 0.0, budget(500)));
        assert!(is_bounded(-2.0, 0.0, budget(500)));
    }

    #[test]
    fn escape_is_stable_once_budget_covers_it() {
        // 0.3 lies just right of the cusp and escapes after a while.
        let k = escape_time(0.3, 0.0, budget(10_000)).expect("0.3 escapes");
        assert!(k > 1);
        for n in k..k + 20 {
            assert_eq!(escape_time(0.3, 0.0, budget(n)), Some(k));
        }
        for n in 1..k {
            assert_eq!(escape_time(0.3, 0.0, budget(n)), None);
        }
    }

    #[test]
    fn non_finite_input_escapes_at_zero() {
        assert_eq!(escape_time(f64::NAN, 0.0, budget(50)), Some(0));
        assert_eq!(escape_time(0.0, f64::INFINITY, budget(50)), Some(0));
        assert_eq!(escape_time(f64::NEG_INFINITY, f64::NAN, budget(1)), Some(0));
    }

    #[test]
    fn huge_inputs_escape_instead_of_looping() {
        assert_eq!(escape_time(f64::MAX, f64::MAX, budget(u32::MAX)), Some(1));
    }

    #[test]
    fn deterministic() {
        let a = escape_time(-0.7436, 0.1318, budget(300));
        let b = escape_time(-0.7436, 0.1318, budget(300));
        assert_eq!(a, b);
    }
}
