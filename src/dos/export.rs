//! # DOS 数据导出
//!
//! 将总 DOS 与投影曲线按能量点对齐后导出为 CSV 或 XY 格式。
//!
//! ## 支持格式
//! - CSV: 表头 `energy,<列名>...`
//! - XY: `#` 注释头 + 制表符分隔列
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{DosError, Result};
use crate::models::{LabeledCurve, TotalDos};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 按能量点对齐的列式数据
#[derive(Debug, Clone)]
pub struct DosTable {
    pub energies: Vec<f64>,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl DosTable {
    /// 由总 DOS (1 或 2 通道) 与投影曲线组装
    pub fn build(total: &TotalDos, projections: &[LabeledCurve]) -> Self {
        let mut columns = Vec::new();
        if total.spin.is_polarized() {
            for (channel, name) in ["total_up", "total_down"].iter().enumerate() {
                if let Some(c) = total.channel_curve(channel) {
                    columns.push((name.to_string(), c.values));
                }
            }
        } else if let Some(c) = total.channel_curve(0) {
            columns.push(("total".to_string(), c.values));
        }

        for p in projections {
            columns.push((p.label.clone(), p.curve.values.clone()));
        }

        DosTable {
            energies: total.energies.clone(),
            columns,
        }
    }

    fn header(&self) -> Vec<String> {
        std::iter::once("energy".to_string())
            .chain(self.columns.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    fn row(&self, i: usize) -> Vec<String> {
        std::iter::once(format!("{:.6}", self.energies[i]))
            .chain(self.columns.iter().map(|(_, v)| format!("{:.6}", v[i])))
            .collect()
    }
}

/// 导出为 CSV 格式
pub fn to_csv(table: &DosTable, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(table.header())?;
    for i in 0..table.energies.len() {
        wtr.write_record(table.row(i))?;
    }

    wtr.flush().map_err(|e| DosError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出为 XY 格式
pub fn to_xy(table: &DosTable, source_name: &str, fermi: f64, output_path: &Path) -> Result<()> {
    let write_err = |e: std::io::Error| DosError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    };

    let file = File::create(output_path).map_err(write_err)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# DOS: {}", source_name).map_err(write_err)?;
    writeln!(out, "# Fermi energy: {:.6} eV (energies shifted to E_F = 0)", fermi)
        .map_err(write_err)?;
    writeln!(out, "# Columns: {}", table.header().join("\t")).map_err(write_err)?;
    writeln!(out, "#").map_err(write_err)?;

    for i in 0..table.energies.len() {
        writeln!(out, "{}", table.row(i).join("\t")).map_err(write_err)?;
    }

    out.flush().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Curve, SpinMode};
    use std::fs;

    fn sample() -> DosTable {
        let total = TotalDos {
            energies: vec![-1.0, 0.0],
            channels: vec![vec![0.5], vec![1.0]],
            spin: SpinMode::NonPolarized,
        };
        let proj = LabeledCurve {
            curve: Curve {
                energies: vec![-1.0, 0.0],
                values: vec![0.25, 0.75],
            },
            label: "Fe-d".to_string(),
            color: "red".to_string(),
        };
        DosTable::build(&total, &[proj])
    }

    #[test]
    fn test_build_table_columns() {
        let table = sample();
        assert_eq!(table.header(), vec!["energy", "total", "Fe-d"]);
        assert_eq!(table.row(1), vec!["0.000000", "1.000000", "0.750000"]);
    }

    #[test]
    fn test_spin_table_has_two_total_columns() {
        let total = TotalDos {
            energies: vec![0.0],
            channels: vec![vec![1.0, 2.0]],
            spin: SpinMode::Polarized,
        };
        let table = DosTable::build(&total, &[]);
        assert_eq!(table.header(), vec!["energy", "total_up", "total_down"]);
    }

    #[test]
    fn test_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.csv");
        to_csv(&sample(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "energy,total,Fe-d");
        assert_eq!(lines[1], "-1.000000,0.500000,0.250000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_xy_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.xy");
        to_xy(&sample(), "DOSCAR", 5.0, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# DOS: DOSCAR"));
        assert!(content.contains("-1.000000\t0.500000\t0.250000"));
    }
}
