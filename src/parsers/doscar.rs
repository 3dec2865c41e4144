//! # VASP DOSCAR 解析器
//!
//! 两阶段解析：先解码头部得到 `{atom_count, bin_count, fermi_energy}`，
//! 再按头部给出的边界切分总 DOS 块与投影 DOS 块。
//!
//! ## DOSCAR 格式说明
//! ```text
//! natoms natoms 1 0            # line 0: 首个字段为原子数
//! ...                          # lines 1-4: 忽略
//! Emax Emin NEDOS Efermi 1.0   # line 5
//! E dos [idos]                 # lines 6 .. 6+NEDOS-1: 总 DOS
//! E dos_up dos_dn idos_up idos_dn   (自旋极化)
//! Emax Emin NEDOS Efermi 1.0   # 原子 1 分隔行
//! E s p_y p_z p_x ...          # NEDOS 行投影 DOS
//! ...                          # 原子 2..natoms 同上
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/dos.rs`

use crate::error::{DosError, Result};
use crate::models::{DosHeader, ProjectedDos, SpinMode, TotalDos};

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const FORMAT: &str = "doscar";

/// 投影 DOS 列数为这些值时视为自旋极化
const SPIN_ORBITAL_COUNTS: [usize; 3] = [2, 8, 18];

/// 总 DOS 列数为此值时视为自旋极化 (up, down, int_up, int_down)
const SPIN_TOTAL_COLUMNS: usize = 4;

/// 读取文件内容，文件不存在时返回 `FileNotFound`
pub fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(DosError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| DosError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 读取 DOSCAR 并解析头部与总 DOS
pub fn read_total_dos(path: &Path) -> Result<(DosHeader, TotalDos)> {
    let content = read_source(path)?;
    let name = path.display().to_string();
    let header = parse_header(&content, &name)?;
    let total = parse_total_dos(&content, &header, &name)?;
    Ok((header, total))
}

/// 读取 DOSCAR 的投影 DOS 块
///
/// `header` 来自同一文件的 [`read_total_dos`] 或 [`parse_header`]。
pub fn read_projected_dos(path: &Path, header: &DosHeader) -> Result<ProjectedDos> {
    let content = read_source(path)?;
    parse_projected_dos(&content, header, &path.display().to_string())
}

/// 解码头部 (第 0 行与第 5 行)
pub fn parse_header(content: &str, path: &str) -> Result<DosHeader> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < DosHeader::TOTAL_BLOCK_START {
        return Err(DosError::parse(FORMAT, path, "File too short for DOSCAR header"));
    }

    // Line 0: 原子数
    let atom_count: usize = lines[0]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DosError::parse(FORMAT, path, "Line 1: missing atom count"))?;

    if atom_count == 0 {
        return Err(DosError::parse(FORMAT, path, "Line 1: atom count is zero"));
    }

    // Line 5: Emax Emin NEDOS Efermi weight
    let fields = parse_row(lines[5], 5, path)?;
    if fields.len() < 5 {
        return Err(DosError::parse(
            FORMAT,
            path,
            format!("Line 6: expected 5 fields, found {}", fields.len()),
        ));
    }

    let bins = fields[2];
    if bins < 1.0 || bins.fract() != 0.0 {
        return Err(DosError::parse(
            FORMAT,
            path,
            format!("Line 6: invalid bin count {}", bins),
        ));
    }

    let bin_count = bins as usize;
    if layout_len(atom_count, bin_count).is_none() {
        return Err(DosError::parse(
            FORMAT,
            path,
            format!(
                "Line 6: {} bins for {} atoms exceeds any addressable file",
                bins, atom_count
            ),
        ));
    }

    let header = DosHeader {
        atom_count,
        max_energy: fields[0],
        min_energy: fields[1],
        bin_count,
        fermi_energy: fields[3],
        weight: fields[4],
    };

    debug!(
        atoms = header.atom_count,
        bins = header.bin_count,
        fermi = header.fermi_energy,
        "decoded DOSCAR header"
    );

    Ok(header)
}

/// 完整文件行数: 头部 + 总 DOS 块 + 每原子 (分隔行 + bins 行)
///
/// 溢出时返回 `None`；通过检查的头部，其余块边界计算都不会溢出。
fn layout_len(atom_count: usize, bin_count: usize) -> Option<usize> {
    let segment = bin_count.checked_add(1)?;
    let projected = atom_count.checked_mul(segment)?;
    DosHeader::TOTAL_BLOCK_START
        .checked_add(bin_count)?
        .checked_add(projected)
}

/// 解析总 DOS 块
pub fn parse_total_dos(content: &str, header: &DosHeader, path: &str) -> Result<TotalDos> {
    let lines: Vec<&str> = content.lines().collect();
    let start = DosHeader::TOTAL_BLOCK_START;
    let end = start + header.bin_count;

    if lines.len() < end {
        return Err(DosError::parse(
            FORMAT,
            path,
            format!(
                "Total DOS block truncated: expected {} rows, found {}",
                header.bin_count,
                lines.len().saturating_sub(start)
            ),
        ));
    }

    let value_columns = lines[start].split_whitespace().count().saturating_sub(1);
    if value_columns == 0 {
        return Err(DosError::parse(
            FORMAT,
            path,
            format!("Line {}: no DOS columns", start + 1),
        ));
    }

    let spin = if value_columns == SPIN_TOTAL_COLUMNS {
        SpinMode::Polarized
    } else {
        SpinMode::NonPolarized
    };
    // 积分 DOS 列不保留
    let retained = if spin.is_polarized() { 2 } else { 1 };
    let natoms = header.atom_count as f64;

    let mut energies = Vec::with_capacity(header.bin_count);
    let mut channels = Vec::with_capacity(header.bin_count);

    for (idx, line) in lines[start..end].iter().enumerate() {
        let row = parse_row(line, start + idx, path)?;
        if row.len() < retained + 1 {
            return Err(DosError::parse(
                FORMAT,
                path,
                format!("Line {}: expected {} columns", start + idx + 1, retained + 1),
            ));
        }
        energies.push(row[0] - header.fermi_energy);
        channels.push(row[1..=retained].iter().map(|v| v / natoms).collect());
    }

    debug!(bins = energies.len(), %spin, "parsed total DOS");

    Ok(TotalDos {
        energies,
        channels,
        spin,
    })
}

/// 解析投影 DOS 块
///
/// 共 `atom_count` 段，每段 `bin_count + 1` 行，段首为分隔行。
pub fn parse_projected_dos(content: &str, header: &DosHeader, path: &str) -> Result<ProjectedDos> {
    let lines: Vec<&str> = content.lines().collect();
    let start = header.projected_block_start();
    let seg_len = header.segment_len();
    let block_len = header.atom_count * seg_len;

    if lines.len() <= start + 1 || lines[start + 1].trim().is_empty() {
        return Err(DosError::parse(
            FORMAT,
            path,
            "No projected DOS block found (was LORBIT set?)",
        ));
    }

    if lines.len() < start + block_len {
        return Err(DosError::parse(
            FORMAT,
            path,
            format!(
                "Projected DOS block truncated: expected {} lines, found {}",
                block_len,
                lines.len() - start
            ),
        ));
    }

    let orbital_count = lines[start + 1].split_whitespace().count().saturating_sub(1);
    if orbital_count == 0 {
        return Err(DosError::parse(
            FORMAT,
            path,
            format!("Line {}: no orbital columns", start + 2),
        ));
    }

    let spin = if SPIN_ORBITAL_COUNTS.contains(&orbital_count) {
        SpinMode::Polarized
    } else {
        SpinMode::NonPolarized
    };

    let mut energies = Vec::with_capacity(header.bin_count);
    let mut tensor =
        vec![vec![vec![0.0; orbital_count]; header.bin_count]; header.atom_count];

    let mut bin = 0;
    for (offset, line) in lines[start..start + block_len].iter().enumerate() {
        // 段首分隔行
        if offset % seg_len == 0 {
            bin = 0;
            continue;
        }
        let site = offset / seg_len;
        let line_no = start + offset;

        let row = parse_row(line, line_no, path)?;
        if row.len() < orbital_count + 1 {
            return Err(DosError::parse(
                FORMAT,
                path,
                format!(
                    "Line {}: expected {} columns, found {}",
                    line_no + 1,
                    orbital_count + 1,
                    row.len()
                ),
            ));
        }

        if site == 0 {
            energies.push(row[0] - header.fermi_energy);
        }
        tensor[site][bin].copy_from_slice(&row[1..=orbital_count]);
        bin += 1;
    }

    debug!(
        sites = header.atom_count,
        bins = header.bin_count,
        orbitals = orbital_count,
        %spin,
        "parsed projected DOS"
    );

    Ok(ProjectedDos {
        energies,
        tensor,
        spin,
    })
}

/// 检查投影 DOS 能量网格与总 DOS 是否一致，不一致时仅给出警告
pub fn check_energy_grid(total: &TotalDos, projected: &ProjectedDos) -> bool {
    let consistent = total.bins() == projected.bins()
        && total
            .energies
            .iter()
            .zip(&projected.energies)
            .all(|(a, b)| (a - b).abs() < 1e-6);
    if !consistent {
        warn!("projected DOS energy grid differs from the total DOS grid");
    }
    consistent
}

/// 将一行解析为浮点数列表，`line_idx` 为 0-based 行号
fn parse_row(line: &str, line_idx: usize, path: &str) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| {
                DosError::parse(
                    FORMAT,
                    path,
                    format!("Line {}: invalid number '{}'", line_idx + 1, tok),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 原子, 3 bins, 非自旋, 每原子 s/p/d 共 9 列
    fn two_atom_doscar() -> String {
        let mut s = String::from(
            "   2   2   1   0
  0.1E+02  0.1E-09  0.1E-09  0.1E-09  0.5E-15
  1.0E-004
  CAR
 unknown system
      2.000000     0.000000        3      1.000000      1.000000
     2.000   4.000   4.000
     1.000   2.000   6.000
     0.000   0.000   6.000
",
        );
        for site in 0..2 {
            s.push_str("      2.000000     0.000000        3      1.000000      1.000000\n");
            for (bin, e) in [2.0, 1.0, 0.0].iter().enumerate() {
                s.push_str(&format!("  {:.3}", e));
                for orb in 0..9 {
                    let v = (site * 100 + bin * 10 + orb) as f64 * 0.01;
                    s.push_str(&format!("  {:.4}", v));
                }
                s.push('\n');
            }
        }
        s
    }

    #[test]
    fn test_parse_header() {
        let header = parse_header(&two_atom_doscar(), "DOSCAR").unwrap();
        assert_eq!(header.atom_count, 2);
        assert_eq!(header.bin_count, 3);
        assert!((header.fermi_energy - 1.0).abs() < 1e-12);
        assert_eq!(header.projected_block_start(), 9);
        assert_eq!(header.segment_len(), 4);
    }

    #[test]
    fn test_total_dos_shift_and_normalization() {
        let content = two_atom_doscar();
        let header = parse_header(&content, "DOSCAR").unwrap();
        let total = parse_total_dos(&content, &header, "DOSCAR").unwrap();

        assert_eq!(total.spin, SpinMode::NonPolarized);
        assert_eq!(total.energies, vec![1.0, 0.0, -1.0]);
        assert_eq!(total.channels, vec![vec![2.0], vec![1.0], vec![0.0]]);
        assert_eq!(total.bins(), header.bin_count);
        assert_eq!(total.channel_count(), 1);
    }

    #[test]
    fn test_total_dos_reparse_is_idempotent() {
        let content = two_atom_doscar();
        let header = parse_header(&content, "DOSCAR").unwrap();
        let a = parse_total_dos(&content, &header, "DOSCAR").unwrap();
        let b = parse_total_dos(&content, &header, "DOSCAR").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_total_dos_spin_polarized() {
        let content = "   1   1   1   0
x
x
CAR
system
  5.0  -5.0  2  0.5  1.0
  -1.0  2.0  4.0  0.1  0.2
   1.0  6.0  8.0  0.3  0.4
";
        let header = parse_header(content, "DOSCAR").unwrap();
        let total = parse_total_dos(content, &header, "DOSCAR").unwrap();
        assert_eq!(total.spin, SpinMode::Polarized);
        assert_eq!(total.channel_count(), 2);
        assert_eq!(total.channels[0], vec![2.0, 4.0]);
        assert_eq!(total.channels[1], vec![6.0, 8.0]);
        assert_eq!(total.energies, vec![-1.5, 0.5]);
        let down = total.channel_curve(1).unwrap();
        assert_eq!(down.values, vec![4.0, 8.0]);
        assert!(total.channel_curve(2).is_none());
    }

    #[test]
    fn test_projected_dos_shape_and_values() {
        let content = two_atom_doscar();
        let header = parse_header(&content, "DOSCAR").unwrap();
        let pdos = parse_projected_dos(&content, &header, "DOSCAR").unwrap();

        assert_eq!(pdos.spin, SpinMode::NonPolarized);
        assert_eq!(pdos.site_count(), 2);
        assert_eq!(pdos.bins(), 3);
        assert_eq!(pdos.orbital_count(), 9);
        assert_eq!(pdos.energies, vec![1.0, 0.0, -1.0]);

        // site 1, bin 2, orbital 4 → (100 + 20 + 4) * 0.01
        assert!((pdos.tensor[1][2][4] - 1.24).abs() < 1e-9);
        assert!((pdos.tensor[0][0][0] - 0.0).abs() < 1e-9);

        let total = parse_total_dos(&content, &header, "DOSCAR").unwrap();
        assert!(check_energy_grid(&total, &pdos));
    }

    #[test]
    fn test_projected_dos_spin_detection() {
        let content = "   1   1   1   0
x
x
CAR
system
  5.0  -5.0  2  0.0  1.0
  -1.0  2.0  0.1
   1.0  6.0  0.3
  5.0  -5.0  2  0.0  1.0
  -1.0  0.5  0.5
   1.0  0.7  0.7
";
        let header = parse_header(content, "DOSCAR").unwrap();
        let pdos = parse_projected_dos(content, &header, "DOSCAR").unwrap();
        assert_eq!(pdos.orbital_count(), 2);
        assert_eq!(pdos.spin, SpinMode::Polarized);
    }

    /// 1 原子, 2 bins, 投影块每行 `orbitals` 列
    fn one_atom_doscar(orbitals: usize, projected_energies: [f64; 2]) -> String {
        let mut s = String::from(
            "   1   1   1   0
x
x
CAR
system
  5.0  -5.0  2  0.0  1.0
  -1.0  2.0  0.1
   1.0  6.0  0.3
  5.0  -5.0  2  0.0  1.0
",
        );
        for e in projected_energies {
            s.push_str(&format!("  {:.3}", e));
            for _ in 0..orbitals {
                s.push_str("  0.100");
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn test_projected_dos_spin_by_orbital_count() {
        for (orbitals, spin) in [
            (8, SpinMode::Polarized),
            (9, SpinMode::NonPolarized),
            (16, SpinMode::NonPolarized),
            (18, SpinMode::Polarized),
        ] {
            let content = one_atom_doscar(orbitals, [-1.0, 1.0]);
            let header = parse_header(&content, "DOSCAR").unwrap();
            let pdos = parse_projected_dos(&content, &header, "DOSCAR").unwrap();
            assert_eq!(pdos.orbital_count(), orbitals);
            assert_eq!(pdos.spin, spin, "orbital count {}", orbitals);
        }
    }

    #[test]
    fn test_energy_grid_mismatch_detected() {
        let content = one_atom_doscar(9, [-1.0, 1.5]);
        let header = parse_header(&content, "DOSCAR").unwrap();
        let total = parse_total_dos(&content, &header, "DOSCAR").unwrap();
        let pdos = parse_projected_dos(&content, &header, "DOSCAR").unwrap();
        assert!(!check_energy_grid(&total, &pdos));

        let matching = one_atom_doscar(9, [-1.0, 1.0]);
        let pdos = parse_projected_dos(&matching, &header, "DOSCAR").unwrap();
        assert!(check_energy_grid(&total, &pdos));
    }

    #[test]
    fn test_huge_bin_count_is_parse_error() {
        let content = "   2   2   1   0
x
x
CAR
system
  5.0  -5.0  1e30  0.0  1.0
  -1.0  2.0  0.1
";
        let err = parse_header(content, "DOSCAR").unwrap_err();
        assert!(matches!(err, DosError::ParseError { .. }));

        let huge_atoms = format!(
            "   {}   1   1   0\nx\nx\nCAR\nsystem\n  5.0  -5.0  3  0.0  1.0\n",
            usize::MAX / 2
        );
        let err = parse_header(&huge_atoms, "DOSCAR").unwrap_err();
        assert!(matches!(err, DosError::ParseError { .. }));
    }

    #[test]
    fn test_missing_projected_block() {
        let content = "   1   1   1   0
x
x
CAR
system
  5.0  -5.0  2  0.0  1.0
  -1.0  2.0  0.1
   1.0  6.0  0.3
";
        let header = parse_header(content, "DOSCAR").unwrap();
        let err = parse_projected_dos(content, &header, "DOSCAR").unwrap_err();
        assert!(matches!(err, DosError::ParseError { .. }));
    }

    #[test]
    fn test_truncated_total_block() {
        let content = "   1   1   1   0
x
x
CAR
system
  5.0  -5.0  10  0.0  1.0
  -1.0  2.0  0.1
";
        let header = parse_header(content, "DOSCAR").unwrap();
        assert!(parse_total_dos(content, &header, "DOSCAR").is_err());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = read_total_dos(Path::new("/nonexistent/DOSCAR")).unwrap_err();
        assert!(matches!(err, DosError::FileNotFound { .. }));
    }

    #[test]
    fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DOSCAR");
        fs::write(&path, two_atom_doscar()).unwrap();

        let (header, total) = read_total_dos(&path).unwrap();
        let pdos = read_projected_dos(&path, &header).unwrap();
        assert_eq!(total.bins(), 3);
        assert_eq!(pdos.site_count(), header.atom_count);
    }
}
