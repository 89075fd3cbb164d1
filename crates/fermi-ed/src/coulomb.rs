//! Coulomb interaction terms of a single orbital shell.
//!
//! The p shell is written in two bases:
//!
//! - **native** (p_x, p_y, p_z): Kanamori form
//!
//!   H = U Σ_a n_{a↑}n_{a↓} + U' Σ_{a≠b} n_{a↑}n_{b↓} + (U' − J) Σ_{a<b,σ} n_{aσ}n_{bσ}
//!     + J Σ_{a≠b} c†_{a↑}c†_{b↓}c_{a↓}c_{b↑} + J Σ_{a≠b} c†_{a↑}c†_{a↓}c_{b↓}c_{b↑}
//!
//!   with U' = U − 2J. For l = 1 this is the full rotationally invariant
//!   interaction, not an approximation.
//!
//! - **spherical** (m = −1, 0, 1): Slater form
//!
//!   H = ½ Σ U_{m1 m2 m3 m4} c†_{m1σ} c†_{m2σ'} c_{m4σ'} c_{m3σ},
//!   U_{m1 m2 m3 m4} = δ_{m1+m2, m3+m4} Σ_k c^k(m1, m3) c^k(m4, m2) F^k
//!
//!   with Gaunt coefficients c^k from Wigner 3j symbols (Condon–Shortley
//!   phase) and F0 = U − 4J/3, F2 = 25J/3.
//!
//! The two agree under |m=±1⟩ = ∓(|x⟩ ± i|y⟩)/√2, |m=0⟩ = |z⟩.

use crate::term::{Term, TwoBodyAccumulator};

/// Coefficients smaller than this are not emitted as terms.
pub const COEFFICIENT_THRESHOLD: f64 = 1e-12;

/// Bits of one p shell: `[component][spin]`, `None` for undeclared spins.
///
/// Component position is the native index (x, y, z) or `m + 1`.
pub type PShellBits = [[Option<usize>; 2]; 3];

fn factorial(n: i32) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// Wigner 3j symbol for integer angular momenta (Racah formula).
pub fn wigner_3j(j1: i32, j2: i32, j3: i32, m1: i32, m2: i32, m3: i32) -> f64 {
    if m1 + m2 + m3 != 0 {
        return 0.0;
    }
    if j3 < (j1 - j2).abs() || j3 > j1 + j2 {
        return 0.0;
    }
    if m1.abs() > j1 || m2.abs() > j2 || m3.abs() > j3 {
        return 0.0;
    }

    let triangle = factorial(j1 + j2 - j3) * factorial(j1 - j2 + j3) * factorial(-j1 + j2 + j3)
        / factorial(j1 + j2 + j3 + 1);
    let norm = (factorial(j1 + m1)
        * factorial(j1 - m1)
        * factorial(j2 + m2)
        * factorial(j2 - m2)
        * factorial(j3 + m3)
        * factorial(j3 - m3))
    .sqrt();

    let k_min = 0.max(j2 - j3 - m1).max(j1 - j3 + m2);
    let k_max = (j1 + j2 - j3).min(j1 - m1).min(j2 + m2);
    let mut sum = 0.0;
    for k in k_min..=k_max {
        let denom = factorial(k)
            * factorial(j3 - j2 + k + m1)
            * factorial(j3 - j1 + k - m2)
            * factorial(j1 + j2 - j3 - k)
            * factorial(j1 - k - m1)
            * factorial(j2 - k + m2);
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        sum += sign / denom;
    }

    let phase = if (j1 - j2 - m3).rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    };
    phase * triangle.sqrt() * norm * sum
}

/// Gaunt coefficient c^k(l m, l m') within one shell.
pub fn gaunt(l: i32, k: i32, m: i32, mp: i32) -> f64 {
    let phase = if m.rem_euclid(2) == 0 { 1.0 } else { -1.0 };
    phase
        * (2 * l + 1) as f64
        * wigner_3j(l, k, l, 0, 0, 0)
        * wigner_3j(l, k, l, -m, m - mp, mp)
}

/// Slater integrals (F0, F2) of a p shell from Kanamori U and J.
pub fn p_shell_slater_integrals(u: f64, j: f64) -> (f64, f64) {
    let f2 = 25.0 * j / 3.0;
    (u - 4.0 * j / 3.0, f2)
}

/// Slater matrix element U_{m1 m2 m3 m4} of a p shell, m in −1..=1.
pub fn p_shell_slater_element(f0: f64, f2: f64, m: [i32; 4]) -> f64 {
    let [m1, m2, m3, m4] = m;
    if m1 + m2 != m3 + m4 {
        return 0.0;
    }
    [(0, f0), (2, f2)]
        .iter()
        .map(|&(k, fk)| gaunt(1, k, m1, m3) * gaunt(1, k, m4, m2) * fk)
        .sum()
}

/// Interaction terms of a p shell written in the native basis.
pub fn p_native_terms(bits: &PShellBits, u: f64, j: f64) -> Vec<Term> {
    let u_prime = u - 2.0 * j;
    let mut acc = TwoBodyAccumulator::default();
    let bit = |a: usize, spin: usize| bits[a][spin];

    for a in 0..3 {
        if let (Some(up), Some(dn)) = (bit(a, 0), bit(a, 1)) {
            acc.add(up, dn, dn, up, u);
        }
        for b in 0..3 {
            if a == b {
                continue;
            }
            // Opposite spins on different orbitals.
            if let (Some(a_up), Some(b_dn)) = (bit(a, 0), bit(b, 1)) {
                acc.add(a_up, b_dn, b_dn, a_up, u_prime);
            }
            // Equal spins, each unordered pair once.
            if a < b {
                for spin in 0..2 {
                    if let (Some(x), Some(y)) = (bit(a, spin), bit(b, spin)) {
                        acc.add(x, y, y, x, u_prime - j);
                    }
                }
            }
            if let (Some(a_up), Some(a_dn), Some(b_up), Some(b_dn)) =
                (bit(a, 0), bit(a, 1), bit(b, 0), bit(b, 1))
            {
                // Spin flip.
                acc.add(a_up, b_dn, a_dn, b_up, j);
                // Pair hopping.
                acc.add(a_up, a_dn, b_dn, b_up, j);
            }
        }
    }

    acc.into_terms(COEFFICIENT_THRESHOLD)
}

/// Interaction terms of a p shell written in the spherical basis.
pub fn p_spherical_terms(bits: &PShellBits, u: f64, j: f64) -> Vec<Term> {
    let (f0, f2) = p_shell_slater_integrals(u, j);
    let mut acc = TwoBodyAccumulator::default();
    let ms = [-1i32, 0, 1];
    let pos = |m: i32| (m + 1) as usize;

    for &m1 in &ms {
        for &m2 in &ms {
            for &m3 in &ms {
                for &m4 in &ms {
                    let element = p_shell_slater_element(f0, f2, [m1, m2, m3, m4]);
                    if element.abs() < COEFFICIENT_THRESHOLD {
                        continue;
                    }
                    for s in 0..2 {
                        for sp in 0..2 {
                            let legs = (
                                bits[pos(m1)][s],
                                bits[pos(m2)][sp],
                                bits[pos(m4)][sp],
                                bits[pos(m3)][s],
                            );
                            if let (Some(c0), Some(c1), Some(a0), Some(a1)) = legs {
                                acc.add(c0, c1, a0, a1, 0.5 * element);
                            }
                        }
                    }
                }
            }
        }
    }

    acc.into_terms(COEFFICIENT_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn full_shell() -> PShellBits {
        // Component-major layout: (c, up), (c, down).
        let mut bits = [[None; 2]; 3];
        for (c, row) in bits.iter_mut().enumerate() {
            for (s, slot) in row.iter_mut().enumerate() {
                *slot = Some(2 * c + s);
            }
        }
        bits
    }

    #[test]
    fn test_wigner_3j_known_values() {
        assert_relative_eq!(wigner_3j(1, 2, 1, 0, 0, 0), (2.0f64 / 15.0).sqrt(), epsilon = 1e-14);
        assert_relative_eq!(wigner_3j(1, 1, 0, 1, -1, 0), 1.0 / 3.0f64.sqrt(), epsilon = 1e-14);
        assert_relative_eq!(wigner_3j(1, 1, 0, 0, 0, 0), -1.0 / 3.0f64.sqrt(), epsilon = 1e-14);
        assert_eq!(wigner_3j(1, 1, 0, 1, 1, 0), 0.0);
        assert_eq!(wigner_3j(1, 1, 3, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_gaunt_p_shell_table() {
        // Condon–Shortley table for l = 1, k = 2.
        let r3 = 3.0f64.sqrt();
        let r6 = 6.0f64.sqrt();
        assert_relative_eq!(gaunt(1, 2, 0, 0), 2.0 / 5.0, epsilon = 1e-14);
        assert_relative_eq!(gaunt(1, 2, 1, 1), -1.0 / 5.0, epsilon = 1e-14);
        assert_relative_eq!(gaunt(1, 2, -1, -1), -1.0 / 5.0, epsilon = 1e-14);
        assert_relative_eq!(gaunt(1, 2, 1, 0), r3 / 5.0, epsilon = 1e-14);
        assert_relative_eq!(gaunt(1, 2, -1, 0), r3 / 5.0, epsilon = 1e-14);
        assert_relative_eq!(gaunt(1, 2, 0, -1), -r3 / 5.0, epsilon = 1e-14);
        assert_relative_eq!(gaunt(1, 2, 1, -1), -r6 / 5.0, epsilon = 1e-14);
        // k = 0 is the identity.
        assert_relative_eq!(gaunt(1, 0, 1, 1), 1.0, epsilon = 1e-14);
        assert_eq!(gaunt(1, 0, 1, 0), 0.0);
    }

    #[test]
    fn test_slater_elements_match_kanamori_parameters() {
        let (u, j) = (3.0, 0.6);
        let (f0, f2) = p_shell_slater_integrals(u, j);
        // m = 0 is p_z: intra-orbital U.
        assert_relative_eq!(p_shell_slater_element(f0, f2, [0, 0, 0, 0]), u, epsilon = 1e-12);
        // Exchange between m = 1 and m = 0.
        assert_relative_eq!(p_shell_slater_element(f0, f2, [1, 0, 0, 1]), j, epsilon = 1e-12);
        // |m = 1⟩ is a superposition of p_x and p_y: U − J.
        assert_relative_eq!(p_shell_slater_element(f0, f2, [1, 1, 1, 1]), u - j, epsilon = 1e-12);
        // Pair transfer (1, −1) ← (0, 0).
        assert_relative_eq!(p_shell_slater_element(f0, f2, [1, -1, 0, 0]), -j, epsilon = 1e-12);
        // m not conserved.
        assert_eq!(p_shell_slater_element(f0, f2, [1, 0, 0, 0]), 0.0);
    }

    #[test]
    fn test_native_terms_content() {
        let (u, j) = (2.0, 0.5);
        let terms = p_native_terms(&full_shell(), u, j);
        assert!(terms.iter().all(|t| t.order() == 4 && t.is_normal_ordered()));

        let find = |bits: [usize; 4]| {
            terms
                .iter()
                .find(|t| t.bits().collect::<Vec<_>>() == bits)
                .map(Term::coefficient)
        };
        // Intra-orbital Hubbard on p_x: c†_0 c†_1 c_1 c_0.
        assert_relative_eq!(find([0, 1, 1, 0]).unwrap(), u);
        // Same-spin inter-orbital (x↑, y↑): U − 3J.
        assert_relative_eq!(find([0, 2, 2, 0]).unwrap(), u - 3.0 * j);
        // Opposite-spin inter-orbital (x↑, y↓): U − 2J.
        assert_relative_eq!(find([0, 3, 3, 0]).unwrap(), u - 2.0 * j);
    }

    #[test]
    fn test_spin_polarized_shell_has_no_pair_terms() {
        // Only spin up declared: only same-spin density terms survive.
        let mut bits = [[None; 2]; 3];
        for (c, row) in bits.iter_mut().enumerate() {
            row[0] = Some(c);
        }
        let terms = p_native_terms(&bits, 2.0, 0.5);
        assert_eq!(terms.len(), 3);
        for term in &terms {
            assert_relative_eq!(term.coefficient(), 2.0 - 1.5);
        }
    }

    #[test]
    fn test_zero_coupling_gives_no_terms() {
        assert!(p_native_terms(&full_shell(), 0.0, 0.0).is_empty());
        assert!(p_spherical_terms(&full_shell(), 0.0, 0.0).is_empty());
    }
}
