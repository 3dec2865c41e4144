//! # 投影 DOS 求和
//!
//! 将投影定义选中的原子 × 轨道子集按能量点求和，再除以**总**原子数
//! (每化学式单元归一化，与总 DOS 的归一化约定一致)。
//!
//! ## 依赖关系
//! - 被 `commands/pdos.rs`, `commands/export.rs` 调用
//! - 使用 `models/`

use crate::error::{DosError, Result};
use crate::models::{Curve, IndexRange, LabeledCurve, ProjectedDos, ProjectionSpec};

use regex::Regex;
use std::sync::OnceLock;

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$").expect("valid range regex"))
}

/// 将 "a-b" (1-based, 闭区间) 转换为零基索引范围
///
/// `max` 为该维度的元素个数；越界时返回 `IndexOutOfRange`，不截断。
pub fn parse_index_range(spec: &str, kind: &'static str, max: usize) -> Result<IndexRange> {
    let caps = range_pattern()
        .captures(spec)
        .ok_or_else(|| DosError::IndexFormat {
            spec: spec.to_string(),
        })?;

    let first: usize = caps[1].parse().map_err(|_| DosError::IndexFormat {
        spec: spec.to_string(),
    })?;
    let last: usize = caps[2].parse().map_err(|_| DosError::IndexFormat {
        spec: spec.to_string(),
    })?;

    if last < first {
        return Err(DosError::IndexFormat {
            spec: spec.to_string(),
        });
    }

    if first < 1 || last > max {
        return Err(DosError::IndexOutOfRange {
            kind,
            first,
            last,
            max,
        });
    }

    Ok(IndexRange {
        first: first - 1,
        last: last - 1,
    })
}

/// 计算单条投影曲线
pub fn aggregate(pdos: &ProjectedDos, spec: &ProjectionSpec) -> Result<Curve> {
    if pdos.spin.is_polarized() {
        return Err(DosError::Unimplemented(
            "summing spin-polarized projected DOS (spin channel layout is undefined)".to_string(),
        ));
    }

    let sites = parse_index_range(&spec.site_range, "site", pdos.site_count())?;
    let orbitals = parse_index_range(&spec.orbital_range, "orbital", pdos.orbital_count())?;

    let natoms = pdos.site_count() as f64;
    let mut values = vec![0.0; pdos.bins()];

    for site in sites.iter() {
        for (bin, row) in pdos.tensor[site].iter().enumerate() {
            values[bin] += row[orbitals.first..=orbitals.last].iter().sum::<f64>();
        }
    }

    for v in values.iter_mut() {
        *v /= natoms;
    }

    Ok(Curve {
        energies: pdos.energies.clone(),
        values,
    })
}

/// 逐条计算投影曲线，每条定义各自成功或失败
pub fn aggregate_all(
    pdos: &ProjectedDos,
    specs: &[ProjectionSpec],
) -> Vec<(ProjectionSpec, Result<LabeledCurve>)> {
    specs
        .iter()
        .map(|spec| {
            let result = aggregate(pdos, spec).map(|curve| LabeledCurve {
                curve,
                label: spec.display_label(),
                color: spec.color.clone(),
            });
            (spec.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpinMode;

    /// `n_sites` 个原子, 3 bins, 4 轨道; 值 = site + bin*0.1 + orb*0.01
    fn synthetic_pdos(n_sites: usize) -> ProjectedDos {
        let tensor = (0..n_sites)
            .map(|site| {
                (0..3)
                    .map(|bin| {
                        (0..4)
                            .map(|orb| site as f64 + bin as f64 * 0.1 + orb as f64 * 0.01)
                            .collect()
                    })
                    .collect()
            })
            .collect();
        ProjectedDos {
            energies: vec![-1.0, 0.0, 1.0],
            tensor,
            spin: SpinMode::NonPolarized,
        }
    }

    fn spec(sites: &str, orbitals: &str) -> ProjectionSpec {
        ProjectionSpec {
            element: "X".into(),
            site_range: sites.into(),
            orbital_range: orbitals.into(),
            label: "all".into(),
            color: "black".into(),
        }
    }

    #[test]
    fn test_parse_index_range() {
        assert_eq!(
            parse_index_range("2-5", "site", 10).unwrap(),
            IndexRange { first: 1, last: 4 }
        );
        assert_eq!(
            parse_index_range("3-3", "site", 10).unwrap(),
            IndexRange { first: 2, last: 2 }
        );
        assert!(matches!(
            parse_index_range("3", "site", 10),
            Err(DosError::IndexFormat { .. })
        ));
        assert!(matches!(
            parse_index_range("a-b", "site", 10),
            Err(DosError::IndexFormat { .. })
        ));
        assert!(matches!(
            parse_index_range("5-2", "site", 10),
            Err(DosError::IndexFormat { .. })
        ));
        assert!(matches!(
            parse_index_range("0-2", "site", 10),
            Err(DosError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_out_of_range_sites() {
        let pdos = synthetic_pdos(10);
        let err = aggregate(&pdos, &spec("1-999", "1-4")).unwrap_err();
        match err {
            DosError::IndexOutOfRange { kind, max, .. } => {
                assert_eq!(kind, "site");
                assert_eq!(max, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            aggregate(&pdos, &spec("1-2", "1-5")),
            Err(DosError::IndexOutOfRange { kind: "orbital", .. })
        ));
    }

    #[test]
    fn test_degenerate_range_selects_single_site() {
        let pdos = synthetic_pdos(4);
        let curve = aggregate(&pdos, &spec("3-3", "2-2")).unwrap();
        // site index 2, orbital index 1, divided by 4 atoms
        for bin in 0..3 {
            let expected = (2.0 + bin as f64 * 0.1 + 0.01) / 4.0;
            assert!((curve.values[bin] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalized_by_total_atom_count() {
        let pdos = synthetic_pdos(4);
        let one = aggregate(&pdos, &spec("1-1", "1-1")).unwrap();
        // site 0, orbital 0, bin 1 = 0.1; divided by 4 (not by 1 selected site)
        assert!((one.values[1] - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_full_range_matches_tensor_sum() {
        let pdos = synthetic_pdos(3);
        let curve = aggregate(&pdos, &spec("1-3", "1-4")).unwrap();
        let total: f64 = curve.values.iter().sum();
        let tensor_sum: f64 = pdos.tensor.iter().flatten().flatten().sum();
        assert!((total - tensor_sum / 3.0).abs() < 1e-9);
        assert_eq!(curve.energies, pdos.energies);
        assert!(curve.values.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_spin_polarized_is_unimplemented() {
        let mut pdos = synthetic_pdos(2);
        pdos.spin = SpinMode::Polarized;
        assert!(matches!(
            aggregate(&pdos, &spec("1-2", "1-2")),
            Err(DosError::Unimplemented(_))
        ));
    }

    #[test]
    fn test_aggregate_all_partial_success() {
        let pdos = synthetic_pdos(2);
        let specs = vec![spec("1-2", "1-4"), spec("1-9", "1-4"), spec("x", "1-1")];
        let results = aggregate_all(&pdos, &specs);
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(DosError::IndexOutOfRange { .. })));
        assert!(matches!(results[2].1, Err(DosError::IndexFormat { .. })));
        assert_eq!(results[0].1.as_ref().unwrap().label, "X-all");
    }
}
