//! Bit classification: configuration tree → bits, hopping matrix, terms.

use crate::bits::{BitInfo, Orbital};
use crate::coulomb::{self, PShellBits};
use crate::error::{ClassificationError, Result};
use crate::term::{Term, TermsList};
use fermi_format::{
    parse_basis_kind, parse_orbital_type, BasisKind, ConfigError, ModelConfig, OrbitalType,
    SiteEntry,
};
use log::{debug, info};
use nalgebra::DMatrix;
use std::collections::{HashMap, HashSet};

/// One declared shell and the bits it produced.
#[derive(Debug, Clone)]
struct Shell {
    orbital_type: OrbitalType,
    energy: f64,
    /// `(component position, spin, bit)`.
    bits: Vec<(usize, u8, usize)>,
}

#[derive(Debug, Clone)]
struct Classified {
    bits: Vec<BitInfo>,
    hopping: DMatrix<f64>,
    terms: TermsList,
}

/// Turns a validated model configuration into the bit list, the hopping
/// matrix and the interaction terms.
///
/// Nothing is available until [`BitClassification::readin`] succeeds; every
/// accessor returns [`ClassificationError::NotInitialized`] before that.
#[derive(Debug, Clone)]
pub struct BitClassification {
    config: ModelConfig,
    classified: Option<Classified>,
}

impl BitClassification {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            classified: None,
        }
    }

    /// Classify the configuration. On error nothing is published.
    pub fn readin(&mut self) -> Result<()> {
        let (bits, shells) = define_bits(&self.config)?;
        let hopping = define_hopping(&self.config, bits.len())?;
        let terms = define_terms(&self.config, &bits, &shells)?;
        debug!(
            "classified {} bits, {} hopping entries, {} terms",
            bits.len(),
            self.config.hopping.len(),
            terms.len()
        );
        self.classified = Some(Classified {
            bits,
            hopping,
            terms,
        });
        Ok(())
    }

    fn classified(&self) -> Result<&Classified> {
        self.classified
            .as_ref()
            .ok_or(ClassificationError::NotInitialized)
    }

    /// Number of bits.
    pub fn bit_size(&self) -> Result<usize> {
        Ok(self.classified()?.bits.len())
    }

    /// Bits in discovery order; `bit_info_list()?[i].bit_number == i`.
    pub fn bit_info_list(&self) -> Result<&[BitInfo]> {
        Ok(&self.classified()?.bits)
    }

    /// Symmetric `bit_size × bit_size` hopping matrix.
    pub fn hopping_matrix(&self) -> Result<&DMatrix<f64>> {
        Ok(&self.classified()?.hopping)
    }

    pub fn terms(&self) -> Result<&TermsList> {
        Ok(&self.classified()?.terms)
    }

    pub fn print_bit_info_list(&self) -> Result<()> {
        for bit in self.bit_info_list()? {
            info!("{bit}");
        }
        Ok(())
    }

    pub fn print_hopping_matrix(&self) -> Result<()> {
        let hopping = self.hopping_matrix()?;
        info!("Hopping matrix:{hopping}");
        Ok(())
    }

    pub fn print_terms(&self) -> Result<()> {
        let terms = self.terms()?;
        info!("{terms}");
        Ok(())
    }
}

fn require(value: Option<f64>, entry: &str, field: &str) -> std::result::Result<f64, ConfigError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(ConfigError::malformed(entry, format!("{field} = {v} is not finite"))),
        None => Err(ConfigError::malformed(entry, format!("missing field {field}"))),
    }
}

/// Orbital variants of one entry, paired with their component position.
fn shell_components(
    entry: &SiteEntry,
    desc: &str,
    orbital_type: OrbitalType,
) -> std::result::Result<Vec<(usize, Orbital)>, ConfigError> {
    match orbital_type {
        OrbitalType::S => {
            let u = require(entry.u, desc, "U")?;
            Ok(vec![(0, Orbital::S { u })])
        }
        OrbitalType::P => {
            let u = require(entry.u, desc, "U")?;
            let j = require(entry.j, desc, "J")?;
            let label = entry
                .basis
                .as_deref()
                .ok_or_else(|| ConfigError::malformed(desc, "missing field basis"))?;
            let basis = parse_basis_kind(desc, label)?;
            let indices: [i8; 3] = match basis {
                BasisKind::Native => [0, 1, 2],
                BasisKind::Spherical => [-1, 0, 1],
            };
            Ok(indices
                .iter()
                .enumerate()
                .map(|(pos, &index)| {
                    (
                        pos,
                        Orbital::P {
                            u,
                            j,
                            basis,
                            index,
                        },
                    )
                })
                .collect())
        }
        OrbitalType::D | OrbitalType::F => Err(ConfigError::malformed(
            desc,
            format!("no couplings are defined for {orbital_type} shells"),
        )),
    }
}

/// Walk the site entries and assign bit numbers in discovery order.
fn define_bits(config: &ModelConfig) -> Result<(Vec<BitInfo>, Vec<Shell>)> {
    let mut bits: Vec<BitInfo> = Vec::new();
    let mut shells = Vec::with_capacity(config.sites.len());
    let mut seen: HashSet<(usize, OrbitalType, i8, u8)> = HashSet::new();

    for (position, entry) in config.sites.iter().enumerate() {
        let desc = entry.describe(position);
        let site = entry
            .site
            .ok_or_else(|| ConfigError::malformed(&desc, "missing site index"))?;
        let label = entry
            .orbital
            .as_deref()
            .ok_or_else(|| ConfigError::malformed(&desc, "missing orbital type"))?;
        let orbital_type = parse_orbital_type(label).map_err(|e| e.at_site(site))?;

        if entry.spins.is_empty() {
            return Err(ConfigError::malformed(&desc, "no spin components declared").into());
        }
        if let Some(&spin) = entry.spins.iter().find(|&&s| s > 1) {
            return Err(
                ConfigError::malformed(&desc, format!("spin {spin} is not 0 (up) or 1 (down)"))
                    .into(),
            );
        }
        if !entry.energy.is_finite() {
            return Err(ConfigError::malformed(&desc, "energy is not finite").into());
        }

        let mut shell = Shell {
            orbital_type,
            energy: entry.energy,
            bits: Vec::new(),
        };
        for (pos, orbital) in shell_components(entry, &desc, orbital_type)? {
            for &spin in &entry.spins {
                if !seen.insert((site, orbital_type, orbital.component(), spin)) {
                    return Err(ConfigError::DuplicateBit {
                        site,
                        orbital: format!("{orbital_type}[{}]", orbital.component()),
                        spin,
                    }
                    .into());
                }
                let bit_number = bits.len();
                if bit_number >= crate::fock::FockState::MAX_BITS {
                    return Err(ConfigError::malformed(
                        &desc,
                        format!("more than {} bits declared", crate::fock::FockState::MAX_BITS),
                    )
                    .into());
                }
                bits.push(BitInfo {
                    site,
                    spin,
                    orbital,
                    bit_number,
                });
                shell.bits.push((pos, spin, bit_number));
            }
        }
        debug!("{desc}: {} bits", shell.bits.len());
        shells.push(shell);
    }

    Ok((bits, shells))
}

/// Zero matrix filled from the explicit hopping declarations.
fn define_hopping(config: &ModelConfig, bit_size: usize) -> Result<DMatrix<f64>> {
    let mut hopping = DMatrix::zeros(bit_size, bit_size);
    let mut declared: HashMap<(usize, usize), f64> = HashMap::new();

    for (position, entry) in config.hopping.iter().enumerate() {
        let desc = format!("hopping #{position}");
        let [i, j] = entry.bits;
        if i >= bit_size || j >= bit_size {
            return Err(ConfigError::malformed(
                desc,
                format!("bits ({i}, {j}) out of range for {bit_size} bits"),
            )
            .into());
        }
        if !entry.value.is_finite() {
            return Err(ConfigError::malformed(desc, "value is not finite").into());
        }
        let key = (i.min(j), i.max(j));
        if let Some(&previous) = declared.get(&key) {
            if previous != entry.value {
                return Err(ConfigError::malformed(
                    desc,
                    format!(
                        "conflicting amplitude for ({i}, {j}): {} vs {previous}",
                        entry.value
                    ),
                )
                .into());
            }
        }
        declared.insert(key, entry.value);
        hopping[(i, j)] = entry.value;
        hopping[(j, i)] = entry.value;
    }

    Ok(hopping)
}

/// Generate on-site levels, shell interactions and explicit terms.
fn define_terms(config: &ModelConfig, bits: &[BitInfo], shells: &[Shell]) -> Result<TermsList> {
    let mut terms = TermsList::new();

    for shell in shells {
        if shell.energy != 0.0 {
            terms.extend(
                shell
                    .bits
                    .iter()
                    .map(|&(_, _, bit)| Term::one_body(bit, bit, shell.energy)),
            );
        }

        match shell.orbital_type {
            OrbitalType::S => {
                let up = shell.bits.iter().find(|b| b.1 == 0).map(|b| b.2);
                let dn = shell.bits.iter().find(|b| b.1 == 1).map(|b| b.2);
                if let (Some(up), Some(dn)) = (up, dn) {
                    let u = bits[up].orbital.u();
                    if u != 0.0 {
                        terms.push(Term::two_body(up, dn, dn, up, u));
                    }
                }
            }
            OrbitalType::P => {
                let mut grid: PShellBits = [[None; 2]; 3];
                for &(pos, spin, bit) in &shell.bits {
                    grid[pos][spin as usize] = Some(bit);
                }
                let Some(&(_, _, first)) = shell.bits.first() else {
                    continue;
                };
                if let Orbital::P { u, j, basis, .. } = bits[first].orbital {
                    let generated = match basis {
                        BasisKind::Native => coulomb::p_native_terms(&grid, u, j),
                        BasisKind::Spherical => coulomb::p_spherical_terms(&grid, u, j),
                    };
                    debug!("p shell ({basis}): {} terms", generated.len());
                    terms.extend(generated);
                }
            }
            // Rejected in define_bits.
            OrbitalType::D | OrbitalType::F => {}
        }
    }

    for (position, entry) in config.terms.iter().enumerate() {
        let desc = format!("term #{position}");
        if let Some(&bit) = entry
            .creation
            .iter()
            .chain(&entry.annihilation)
            .find(|&&b| b >= bits.len())
        {
            return Err(ConfigError::malformed(
                desc,
                format!("bit {bit} out of range for {} bits", bits.len()),
            )
            .into());
        }
        if !entry.value.is_finite() {
            return Err(ConfigError::malformed(desc, "value is not finite").into());
        }
        let term = Term::normal_ordered(&entry.creation, &entry.annihilation, entry.value)
            .ok_or_else(|| {
                ConfigError::malformed(
                    &desc,
                    format!(
                        "{} creation and {} annihilation legs; expected equal counts with a total order in {:?}",
                        entry.creation.len(),
                        entry.annihilation.len(),
                        Term::ORDERS
                    ),
                )
            })?;
        terms.push(term);
    }

    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fermi_format::{HoppingEntry, TermEntry};
    use num_complex::Complex64;

    fn classify(config: ModelConfig) -> Result<BitClassification> {
        let mut classification = BitClassification::new(config);
        classification.readin()?;
        Ok(classification)
    }

    fn sites(sites: Vec<SiteEntry>) -> ModelConfig {
        ModelConfig {
            sites,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_single_s_site() {
        let bc = classify(sites(vec![SiteEntry::s(0, 4.0)])).unwrap();

        assert_eq!(bc.bit_size().unwrap(), 2);
        let quartic = bc.terms().unwrap().of_order(4);
        assert_eq!(quartic.len(), 1);
        assert_eq!(quartic[0].coefficient(), 4.0);
        let mut referenced: Vec<usize> = quartic[0].bits().collect();
        referenced.sort_unstable();
        referenced.dedup();
        assert_eq!(referenced, vec![0, 1]);
        assert_eq!(bc.hopping_matrix().unwrap(), &DMatrix::zeros(2, 2));
    }

    #[test]
    fn test_two_site_chain_hopping() {
        let mut config = sites(vec![
            SiteEntry::s(0, 0.0).with_spins(&[0]),
            SiteEntry::s(1, 0.0).with_spins(&[0]),
        ]);
        config.hopping.push(HoppingEntry {
            bits: [0, 1],
            value: 1.0,
        });
        let bc = classify(config).unwrap();

        let h = bc.hopping_matrix().unwrap();
        assert_eq!(h[(0, 1)], 1.0);
        assert_eq!(h[(1, 0)], 1.0);
        assert_eq!(h[(0, 0)], 0.0);
        assert_eq!(h[(1, 1)], 0.0);
        assert!(bc.terms().unwrap().is_empty());
    }

    #[test]
    fn test_bits_are_dense_and_unique() {
        let bc = classify(sites(vec![
            SiteEntry::s(0, 1.0),
            SiteEntry::p(1, 2.0, 0.5, "native"),
            SiteEntry::p(2, 2.0, 0.5, "spherical").with_spins(&[1]),
        ]))
        .unwrap();

        let list = bc.bit_info_list().unwrap();
        assert_eq!(bc.bit_size().unwrap(), 2 + 6 + 3);
        for (i, bit) in list.iter().enumerate() {
            assert_eq!(bit.bit_number, i);
        }
        let spherical: Vec<i8> = list[8..].iter().map(|b| b.orbital.component()).collect();
        assert_eq!(spherical, vec![-1, 0, 1]);
        assert!(list[8..].iter().all(|b| b.spin == 1 && b.site == 2));
    }

    #[test]
    fn test_accessors_before_readin() {
        let bc = BitClassification::new(sites(vec![SiteEntry::s(0, 1.0)]));
        assert!(matches!(bc.bit_size(), Err(ClassificationError::NotInitialized)));
        assert!(matches!(bc.bit_info_list(), Err(ClassificationError::NotInitialized)));
        assert!(matches!(bc.hopping_matrix(), Err(ClassificationError::NotInitialized)));
        assert!(matches!(bc.terms(), Err(ClassificationError::NotInitialized)));
        assert!(matches!(bc.print_bit_info_list(), Err(ClassificationError::NotInitialized)));
        assert!(matches!(bc.print_hopping_matrix(), Err(ClassificationError::NotInitialized)));
        assert!(matches!(bc.print_terms(), Err(ClassificationError::NotInitialized)));
    }

    #[test]
    fn test_unknown_orbital_type() {
        let mut entry = SiteEntry::s(3, 1.0);
        entry.orbital = Some("g".to_string());
        let mut bc = BitClassification::new(sites(vec![entry]));

        match bc.readin() {
            Err(ClassificationError::Config(ConfigError::UnknownOrbitalType { site, label })) => {
                assert_eq!(site, Some(3));
                assert_eq!(label, "g");
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(bc.bit_size().is_err());
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let mut no_u = SiteEntry::s(0, 1.0);
        no_u.u = None;
        let mut no_basis = SiteEntry::p(0, 1.0, 0.1, "native");
        no_basis.basis = None;
        let mut no_site = SiteEntry::s(0, 1.0);
        no_site.site = None;
        let mut no_j = SiteEntry::p(0, 1.0, 0.1, "native");
        no_j.j = None;

        for entry in [no_u, no_basis, no_site, no_j] {
            let err = classify(sites(vec![entry])).unwrap_err();
            assert!(
                matches!(
                    err,
                    ClassificationError::Config(ConfigError::MalformedEntry { .. })
                ),
                "unexpected error {err:?}"
            );
        }
    }

    #[test]
    fn test_malformed_message_names_site() {
        let mut entry = SiteEntry::p(4, 1.0, 0.1, "native");
        entry.j = None;
        let err = classify(sites(vec![entry])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed entry site 4 (p, entry #0): missing field J"
        );
    }

    #[test]
    fn test_invalid_spin_and_shell() {
        let err = classify(sites(vec![SiteEntry::s(0, 1.0).with_spins(&[2])])).unwrap_err();
        assert!(matches!(err, ClassificationError::Config(ConfigError::MalformedEntry { .. })));

        let mut d = SiteEntry::s(0, 1.0);
        d.orbital = Some("d".to_string());
        let err = classify(sites(vec![d])).unwrap_err();
        assert!(matches!(err, ClassificationError::Config(ConfigError::MalformedEntry { .. })));
    }

    #[test]
    fn test_duplicate_bit() {
        let err = classify(sites(vec![
            SiteEntry::s(0, 1.0),
            SiteEntry::s(0, 1.0).with_spins(&[1]),
        ]))
        .unwrap_err();
        match err {
            ClassificationError::Config(ConfigError::DuplicateBit { site, spin, .. }) => {
                assert_eq!(site, 0);
                assert_eq!(spin, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_hopping_validation() {
        let mut out_of_range = sites(vec![SiteEntry::s(0, 1.0)]);
        out_of_range.hopping.push(HoppingEntry {
            bits: [0, 2],
            value: 1.0,
        });
        assert!(classify(out_of_range).is_err());

        let mut conflicting = sites(vec![SiteEntry::s(0, 1.0)]);
        conflicting.hopping.push(HoppingEntry {
            bits: [0, 1],
            value: 1.0,
        });
        conflicting.hopping.push(HoppingEntry {
            bits: [1, 0],
            value: 2.0,
        });
        assert!(classify(conflicting).is_err());

        let mut repeated = sites(vec![SiteEntry::s(0, 1.0)]);
        for bits in [[0, 1], [1, 0]] {
            repeated.hopping.push(HoppingEntry { bits, value: 0.5 });
        }
        let bc = classify(repeated).unwrap();
        assert_eq!(bc.hopping_matrix().unwrap()[(1, 0)], 0.5);
    }

    #[test]
    fn test_energy_and_explicit_terms() {
        let mut config = sites(vec![
            SiteEntry::s(0, 0.0).with_energy(-0.5),
            SiteEntry::s(1, 0.0),
        ]);
        config.terms.push(TermEntry {
            creation: vec![0, 1, 2],
            annihilation: vec![2, 1, 0],
            value: 0.1,
        });
        config.terms.push(TermEntry {
            creation: vec![0, 1, 2, 3, 0],
            annihilation: vec![3, 2, 1, 0, 1],
            value: 0.2,
        });
        let bc = classify(config).unwrap();
        let terms = bc.terms().unwrap();

        assert_eq!(terms.of_order(2).len(), 2);
        assert!(terms.of_order(2).iter().all(|t| t.coefficient() == -0.5));
        assert!(terms.of_order(4).is_empty());
        assert_eq!(terms.of_order(6).len(), 1);
        assert_eq!(terms.of_order(10).len(), 1);
    }

    #[test]
    fn test_explicit_term_validation() {
        let mut bad_order = sites(vec![SiteEntry::s(0, 1.0)]);
        bad_order.terms.push(TermEntry {
            creation: vec![0, 1],
            annihilation: vec![1],
            value: 1.0,
        });
        assert!(classify(bad_order).is_err());

        let mut out_of_range = sites(vec![SiteEntry::s(0, 1.0)]);
        out_of_range.terms.push(TermEntry {
            creation: vec![5],
            annihilation: vec![0],
            value: 1.0,
        });
        assert!(classify(out_of_range).is_err());
    }

    #[test]
    fn test_order_closure() {
        let bc = classify(sites(vec![
            SiteEntry::s(0, 1.5),
            SiteEntry::p(1, 2.0, 0.4, "native").with_energy(0.3),
            SiteEntry::p(2, 3.0, 0.7, "spherical"),
        ]))
        .unwrap();
        let n = bc.bit_size().unwrap();
        for term in bc.terms().unwrap().iter() {
            assert!(term.bits().all(|b| b < n), "term {term} leaves the bit range");
        }
    }

    /// Antisymmetrized two-body tensor `A[i,j,k,l]` of the quartic terms,
    /// flattened row-major over `n` bits.
    fn antisymmetrized(terms: &TermsList, n: usize) -> Vec<Complex64> {
        let idx = |i: usize, j: usize, k: usize, l: usize| ((i * n + j) * n + k) * n + l;
        let mut a = vec![Complex64::new(0.0, 0.0); n * n * n * n];
        for term in terms.of_order(4) {
            let b: Vec<usize> = term.bits().collect();
            let v = term.coefficient();
            let (i, j, k, l) = (b[0], b[1], b[2], b[3]);
            a[idx(i, j, k, l)] += v;
            a[idx(j, i, k, l)] -= v;
            a[idx(i, j, l, k)] -= v;
            a[idx(j, i, l, k)] += v;
        }
        a
    }

    /// Transform one tensor index with `t[native][spherical]`, conjugating
    /// for creation slots.
    fn rotate_index(a: &[Complex64], t: &[Vec<Complex64>], n: usize, slot: usize) -> Vec<Complex64> {
        let mut out = vec![Complex64::new(0.0, 0.0); a.len()];
        for (flat, value) in a.iter().enumerate() {
            if value.norm() == 0.0 {
                continue;
            }
            let mut digits = [flat / (n * n * n), flat / (n * n) % n, flat / n % n, flat % n];
            let from = digits[slot];
            for (to, row) in t[from].iter().enumerate() {
                let coef = if slot < 2 { row.conj() } else { *row };
                if coef.norm() == 0.0 {
                    continue;
                }
                digits[slot] = to;
                let target = ((digits[0] * n + digits[1]) * n + digits[2]) * n + digits[3];
                out[target] += coef * value;
            }
        }
        out
    }

    #[test]
    fn test_native_and_spherical_p_shell_agree() {
        let (u, j) = (2.3, 0.45);
        let native = classify(sites(vec![SiteEntry::p(0, u, j, "native")])).unwrap();
        let spherical = classify(sites(vec![SiteEntry::p(0, u, j, "spherical")])).unwrap();
        let n = 6;

        // Bit layout is component-major in both bases: bit = 2 * component + spin.
        for (list, first) in [
            (native.bit_info_list().unwrap(), 0i8),
            (spherical.bit_info_list().unwrap(), -1i8),
        ] {
            for bit in list {
                let pos = (bit.orbital.component() - first) as usize;
                assert_eq!(bit.bit_number, 2 * pos + bit.spin as usize);
            }
        }

        // |m=-1> = (|x> - i|y>)/sqrt2, |m=0> = |z>, |m=1> = -(|x> + i|y>)/sqrt2.
        let r = std::f64::consts::FRAC_1_SQRT_2;
        let shell = [
            [Complex64::new(r, 0.0), Complex64::new(0.0, 0.0), Complex64::new(-r, 0.0)],
            [Complex64::new(0.0, -r), Complex64::new(0.0, 0.0), Complex64::new(0.0, -r)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        ];
        let mut t = vec![vec![Complex64::new(0.0, 0.0); n]; n];
        for x in 0..3 {
            for m in 0..3 {
                for spin in 0..2 {
                    t[2 * x + spin][2 * m + spin] = shell[x][m];
                }
            }
        }

        let mut rotated = antisymmetrized(native.terms().unwrap(), n);
        for slot in 0..4 {
            rotated = rotate_index(&rotated, &t, n, slot);
        }
        let expected = antisymmetrized(spherical.terms().unwrap(), n);

        let mut max_diff: f64 = 0.0;
        for (x, y) in rotated.iter().zip(&expected) {
            max_diff = max_diff.max((x - y).norm());
        }
        assert!(max_diff < 1e-10, "native and spherical shells differ by {max_diff}");
        assert!(expected.iter().any(|v| v.norm() > 1e-3));
    }

    #[test]
    fn test_readin_is_repeatable() {
        let mut bc = BitClassification::new(sites(vec![SiteEntry::p(0, 2.0, 0.3, "spherical")]));
        bc.readin().unwrap();
        let first = bc.terms().unwrap().clone();
        bc.readin().unwrap();
        assert_eq!(bc.terms().unwrap(), &first);
    }
}
