//! # export 命令实现
//!
//! 将总 DOS (以及可选的投影曲线) 导出为数据文件，便于外部绘图。
//!
//! 投影定义优先取 `--params`，否则使用 DOSCAR 同目录下存在的 params.in；
//! 两者都没有时只导出总 DOS。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的 ExportArgs
//! - 使用 `parsers/`, `dos/aggregate.rs`, `dos/export.rs`

use super::{for_each_input, skip_existing, to_process_result};
use crate::cli::plot::{DataFormat, ExportArgs};
use crate::dos::aggregate_all;
use crate::dos::export::{self, DosTable};
use crate::error::{DosError, Result};
use crate::models::LabeledCurve;
use crate::parsers::{self, doscar, params};
use crate::utils::output;

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 单个 DOSCAR 的导出结果
#[derive(Debug)]
pub struct ExportReport {
    pub rows: usize,
    pub columns: Vec<String>,
    pub skipped_projections: usize,
    pub output: PathBuf,
}

/// 执行 export 命令
pub fn execute(args: ExportArgs) -> Result<()> {
    output::print_header("DOS Data Export");

    let format = args.format;
    let base = args.output.clone();
    let params_file = args.params.clone();
    let overwrite = args.input.overwrite;

    for_each_input(
        &args.input,
        |path| {
            let out = export_path(path, &base, format);
            let report = export_dos(path, params_file.as_deref(), format, &out)?;
            output::print_success(&format!(
                "Exported {} rows × {} columns ({})",
                report.rows,
                report.columns.len() + 1,
                report.columns.join(", ")
            ));
            if report.skipped_projections > 0 {
                output::print_warning(&format!(
                    "{} projection(s) skipped",
                    report.skipped_projections
                ));
            }
            output::print_success(&format!("Data saved to '{}'", report.output.display()));
            Ok(())
        },
        |path| {
            let out = export_path(path, &base, format);
            if let Some(skipped) = skip_existing(&out, overwrite) {
                return skipped;
            }
            to_process_result(path, &out, export_dos(path, params_file.as_deref(), format, &out))
        },
    )
}

/// 数据文件路径: `<DOSCAR 所在目录>/<base>.<ext>`
pub fn export_path(dos_path: &Path, base: &str, format: DataFormat) -> PathBuf {
    let dir = dos_path.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}.{}", base, format.extension()))
}

/// 读取 DOSCAR 并写出数据文件
pub fn export_dos(
    path: &Path,
    params_file: Option<&Path>,
    format: DataFormat,
    output_path: &Path,
) -> Result<ExportReport> {
    let (header, total) = doscar::read_total_dos(path)?;

    let params_file = match params_file {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let sibling = parsers::sibling_file(path, "params.in");
            sibling.is_file().then_some(sibling)
        }
    };

    let mut projections: Vec<LabeledCurve> = Vec::new();
    let mut skipped = 0;
    if let Some(params_file) = params_file {
        let specs = params::parse_params_file(&params_file)?;
        let pdos = doscar::read_projected_dos(path, &header)?;
        doscar::check_energy_grid(&total, &pdos);
        if pdos.spin.is_polarized() {
            return Err(DosError::Unimplemented(
                "exporting spin-polarized projected DOS".to_string(),
            ));
        }

        for (spec, result) in aggregate_all(&pdos, &specs) {
            match result {
                Ok(curve) => projections.push(curve),
                Err(e) => {
                    warn!(projection = %spec.display_label(), error = %e, "skipping projection");
                    skipped += 1;
                }
            }
        }
    } else {
        debug!(path = %path.display(), "no params.in, exporting total DOS only");
    }

    let table = DosTable::build(&total, &projections);
    match format {
        DataFormat::Csv => export::to_csv(&table, output_path)?,
        DataFormat::Xy => {
            let source = path.display().to_string();
            export::to_xy(&table, &source, header.fermi_energy, output_path)?
        }
    }

    Ok(ExportReport {
        rows: table.energies.len(),
        columns: table.columns.iter().map(|(name, _)| name.clone()).collect(),
        skipped_projections: skipped,
        output: output_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DOSCAR: &str = "   2   2   1   0
x
x
CAR
system
  2.0  0.0  3  1.0  1.0
  2.0  4.0  4.0
  1.0  2.0  6.0
  0.0  0.0  6.0
  2.0  0.0  3  1.0  1.0
  2.0  1.0  2.0  0.5
  1.0  3.0  4.0  0.5
  0.0  0.0  0.0  0.0
  2.0  0.0  3  1.0  1.0
  2.0  1.0  1.0  0.5
  1.0  1.0  1.0  0.5
  0.0  0.0  0.0  0.0
";

    #[test]
    fn test_export_total_only() {
        let dir = tempfile::tempdir().unwrap();
        let dos = dir.path().join("DOSCAR");
        fs::write(&dos, DOSCAR).unwrap();

        let out = export_path(&dos, "dos", DataFormat::Csv);
        let report = export_dos(&dos, None, DataFormat::Csv, &out).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.columns, vec!["total"]);

        let content = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "energy,total");
        assert_eq!(lines[1], "1.000000,2.000000");
    }

    #[test]
    fn test_export_with_sibling_params() {
        let dir = tempfile::tempdir().unwrap();
        let dos = dir.path().join("DOSCAR");
        fs::write(&dos, DOSCAR).unwrap();
        fs::write(dir.path().join("params.in"), "X 1-2 1-2 all red\nX 1-5 1-1 bad k\n").unwrap();

        let out = export_path(&dos, "dos", DataFormat::Xy);
        assert_eq!(out, dir.path().join("dos.dat"));
        let report = export_dos(&dos, None, DataFormat::Xy, &out).unwrap();
        assert_eq!(report.columns, vec!["total", "X-all"]);
        assert_eq!(report.skipped_projections, 1);

        // bin 1: (3 + 4 + 1 + 1) / 2 atoms
        let content = fs::read_to_string(&out).unwrap();
        assert!(content.contains("0.000000\t1.000000\t4.500000"));
    }

    #[test]
    fn test_export_rejects_spin_polarized_projections() {
        let dir = tempfile::tempdir().unwrap();
        let dos = dir.path().join("DOSCAR");
        // 每原子 2 列轨道 → 自旋极化
        let spin = DOSCAR.replace("  0.5\n", "\n").replace("  0.0  0.0  0.0  0.0\n", "  0.0  0.0  0.0\n");
        fs::write(&dos, spin).unwrap();
        let params = dir.path().join("proj.in");
        fs::write(&params, "X 1-2 1-1 s red\n").unwrap();

        let out = export_path(&dos, "dos", DataFormat::Csv);
        let err = export_dos(&dos, Some(params.as_path()), DataFormat::Csv, &out).unwrap_err();
        assert!(matches!(err, DosError::Unimplemented(_)));
        assert!(!out.exists());

        // 不带投影时仍可导出总 DOS
        fs::remove_file(&params).unwrap();
        assert!(export_dos(&dos, None, DataFormat::Csv, &out).is_ok());
    }
}
