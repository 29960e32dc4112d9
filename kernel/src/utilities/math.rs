// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Helper functions for common mathematical operations.

/// Greatest common divisor of `a` and `b`. `gcd(0, 0)` is 0.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Find the fraction `n / d` closest to `numerator / denominator` with
/// `n <= max_numerator` and `d <= max_denominator`.
///
/// Walks the continued fraction expansion of the input. When the next
/// convergent would exceed a bound, the result is either the previous
/// convergent or the largest semi-convergent that still fits, whichever is
/// closer. Returns `(n, d)`.
pub fn best_rational_approximation(
    numerator: u64,
    denominator: u64,
    max_numerator: u64,
    max_denominator: u64,
) -> (u64, u64) {
    let mut n = numerator;
    let mut d = denominator;
    let (mut n0, mut d0) = (0u64, 1u64);
    let (mut n1, mut d1) = (1u64, 0u64);

    while d != 0 {
        let dp = d;
        let a = n / d;
        d = n % d;
        n = dp;

        let n2 = n0.saturating_add(a.saturating_mul(n1));
        let d2 = d0.saturating_add(a.saturating_mul(d1));

        if n2 > max_numerator || d2 > max_denominator {
            let mut t = u64::MAX;
            if d1 != 0 {
                t = max_denominator.saturating_sub(d0) / d1;
            }
            if n1 != 0 {
                t = t.min(max_numerator.saturating_sub(n0) / n1);
            }
            // Keep the semi-convergent only if it is closer than the
            // previous convergent.
            let closer = t.saturating_mul(2) > a
                || (t.saturating_mul(2) == a
                    && u128::from(d0) * u128::from(dp) > u128::from(d1) * u128::from(d));
            if closer {
                n1 = n0 + t * n1;
                d1 = d0 + t * d1;
            }
            break;
        }
        n0 = n1;
        n1 = n2;
        d0 = d1;
        d1 = d2;
    }
    (n1, d1)
}
