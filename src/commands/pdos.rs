//! # pdos 命令实现
//!
//! 读取 DOSCAR 投影块、POSCAR 元素表与 params.in 投影定义，
//! 求和得到各投影曲线并绘图。
//!
//! ## 功能
//! - 单条投影定义出错时跳过并报告 (默认)，`--strict` 时直接中止
//! - 元素表只用于标注与一致性提示，不参与数值计算
//! - 终端表格汇总每条投影
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的 PdosArgs
//! - 使用 `parsers/`, `dos/`
//! - 使用 `utils/output.rs`

use super::{axis_estimator, for_each_input, plot_style, skip_existing, to_process_result};
use crate::cli::plot::PdosArgs;
use crate::config::PlotConfig;
use crate::dos::aggregate::{aggregate_all, parse_index_range};
use crate::dos::{axis, plot};
use crate::error::{DosError, Result};
use crate::models::{AxisBounds, Curve, DosHeader, ElementTable, LabeledCurve, ProjectionSpec};
use crate::parsers::{self, doscar, params, poscar};
use crate::utils::output;

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// pdos 运行选项 (配置之外的命令行开关)
#[derive(Debug, Clone, Copy)]
pub struct PdosOptions {
    pub strict: bool,
}

/// 单条投影的处理结果
#[derive(Debug)]
pub struct ProjectionOutcome {
    pub spec: ProjectionSpec,
    /// 选中原子的元素组成，如 "Fe×2"
    pub composition: String,
    pub peak: Option<f64>,
    pub error: Option<String>,
}

/// 单个 DOSCAR 的绘图结果
#[derive(Debug)]
pub struct PdosReport {
    pub header: DosHeader,
    pub orbital_count: usize,
    pub outcomes: Vec<ProjectionOutcome>,
    pub warnings: Vec<String>,
    pub bounds: AxisBounds,
    pub output: PathBuf,
}

/// 执行 pdos 命令
pub fn execute(args: PdosArgs) -> Result<()> {
    output::print_header("Projected Density of States");

    let mut config = PlotConfig::load(args.input.config.as_deref())?;
    args.image.apply(&mut config, true);
    if args.poscar.is_some() {
        config.structure_file = args.poscar.clone();
    }
    if args.params.is_some() {
        config.params_file = args.params.clone();
    }
    if args.no_total {
        config.include_total = false;
    }
    let options = PdosOptions {
        strict: args.strict,
    };
    let overwrite = args.input.overwrite;

    for_each_input(
        &args.input,
        |path| {
            let report = plot_pdos(path, &config, options)?;
            print_report(&report);
            Ok(())
        },
        |path| {
            let out = config.output_path(path, &config.pdos_name);
            if let Some(skipped) = skip_existing(&out, overwrite) {
                return skipped;
            }
            to_process_result(path, &out, plot_pdos(path, &config, options))
        },
    )
}

/// 读取全部输入、求和并绘制投影 DOS
pub fn plot_pdos(path: &Path, config: &PlotConfig, options: PdosOptions) -> Result<PdosReport> {
    let (header, total) = doscar::read_total_dos(path)?;
    let pdos = doscar::read_projected_dos(path, &header)?;
    doscar::check_energy_grid(&total, &pdos);

    if total.spin.is_polarized() || pdos.spin.is_polarized() {
        return Err(DosError::Unimplemented(
            "plotting spin-polarized projected DOS".to_string(),
        ));
    }

    let structure_file = config
        .structure_file
        .clone()
        .unwrap_or_else(|| parsers::sibling_file(path, "POSCAR"));
    let elements = poscar::parse_element_table_file(&structure_file)?;

    let params_file = config
        .params_file
        .clone()
        .unwrap_or_else(|| parsers::sibling_file(path, "params.in"));
    let specs = params::parse_params_file(&params_file)?;

    let mut warnings = Vec::new();
    if elements.len() != header.atom_count {
        warnings.push(format!(
            "{} lists {} atoms but DOSCAR has {}",
            structure_file.display(),
            elements.len(),
            header.atom_count
        ));
    }
    if specs.is_empty() {
        warnings.push(format!("No projections defined in {}", params_file.display()));
    }

    let estimator = axis_estimator(config);
    let mut curves: Vec<LabeledCurve> = Vec::new();
    let mut outcomes = Vec::new();

    for (spec, result) in aggregate_all(&pdos, &specs) {
        let composition = site_composition(&elements, &spec);
        if let Some(w) = element_mismatch(&elements, &spec) {
            warnings.push(w);
        }

        match result {
            Ok(curve) => {
                let peak = estimator.estimate(&[&curve.curve]).y_max;
                outcomes.push(ProjectionOutcome {
                    spec,
                    composition,
                    peak: Some(peak),
                    error: None,
                });
                curves.push(curve);
            }
            Err(e) if options.strict => return Err(e),
            Err(e) => outcomes.push(ProjectionOutcome {
                spec,
                composition,
                peak: None,
                error: Some(e.to_string()),
            }),
        }
    }

    let total_curve = if config.include_total {
        total.channel_curve(0)
    } else {
        None
    };

    let bounds = projected_bounds(total_curve.as_ref(), &curves, config);
    let output_path = config.output_path(path, &config.pdos_name);
    plot::plot_projected_dos(
        total_curve.as_ref(),
        &curves,
        &bounds,
        &output_path,
        &plot_style(config),
    )?;

    Ok(PdosReport {
        header,
        orbital_count: pdos.orbital_count(),
        outcomes,
        warnings,
        bounds,
        output: output_path,
    })
}

/// 显示范围: 含总 DOS 时由总 DOS 决定，否则取全部投影曲线
pub fn projected_bounds(
    total: Option<&Curve>,
    curves: &[LabeledCurve],
    config: &PlotConfig,
) -> AxisBounds {
    let refs: Vec<&Curve> = match total {
        Some(t) => vec![t],
        None => curves.iter().map(|c| &c.curve).collect(),
    };
    if config.plot_range.is_some() {
        let mut all = refs.clone();
        all.extend(curves.iter().map(|c| &c.curve));
        axis::data_bounds(&all)
    } else {
        axis_estimator(config).estimate(&refs)
    }
}

/// 选中原子的元素组成
fn site_composition(elements: &ElementTable, spec: &ProjectionSpec) -> String {
    let range = match parse_index_range(&spec.site_range, "site", elements.len()) {
        Ok(r) => r,
        Err(_) => return "-".to_string(),
    };

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for site in range.iter() {
        if let Some(symbol) = elements.get(site + 1) {
            match counts.iter_mut().find(|(s, _)| *s == symbol) {
                Some((_, n)) => *n += 1,
                None => counts.push((symbol, 1)),
            }
        }
    }

    counts
        .iter()
        .map(|(s, n)| format!("{}×{}", s, n))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 投影声明的元素与 POSCAR 中选中原子不一致时给出提示
fn element_mismatch(elements: &ElementTable, spec: &ProjectionSpec) -> Option<String> {
    let range = parse_index_range(&spec.site_range, "site", elements.len()).ok()?;
    let others: Vec<&str> = range
        .iter()
        .filter_map(|site| elements.get(site + 1))
        .filter(|s| *s != spec.element)
        .collect();

    if others.is_empty() {
        None
    } else {
        Some(format!(
            "Projection '{}' (sites {}) includes non-{} atoms: {}",
            spec.display_label(),
            spec.site_range,
            spec.element,
            others.join(", ")
        ))
    }
}

/// 打印投影汇总表
fn print_report(report: &PdosReport) {
    #[derive(Tabled)]
    struct ProjectionRow {
        #[tabled(rename = "Projection")]
        label: String,
        #[tabled(rename = "Sites")]
        sites: String,
        #[tabled(rename = "Orbitals")]
        orbitals: String,
        #[tabled(rename = "Atoms")]
        composition: String,
        #[tabled(rename = "Axis top")]
        peak: String,
        #[tabled(rename = "Status")]
        status: String,
    }

    output::print_success(&format!(
        "Read {} atoms × {} bins × {} orbitals, E_F = {:.4} eV",
        report.header.atom_count,
        report.header.bin_count,
        report.orbital_count,
        report.header.fermi_energy
    ));

    output::print_info(&format!(
        "Axis: x [{:.1}, {:.1}], y [{:.2}, {:.2}]",
        report.bounds.x_min, report.bounds.x_max, report.bounds.y_min, report.bounds.y_max
    ));

    for w in &report.warnings {
        output::print_warning(w);
    }

    let rows: Vec<ProjectionRow> = report
        .outcomes
        .iter()
        .map(|o| ProjectionRow {
            label: o.spec.display_label(),
            sites: o.spec.site_range.clone(),
            orbitals: o.spec.orbital_range.clone(),
            composition: o.composition.clone(),
            peak: o.peak.map(|p| format!("{:.3}", p)).unwrap_or_else(|| "-".to_string()),
            status: o.error.clone().unwrap_or_else(|| "ok".to_string()),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("{} Projections", rows.len()));
        println!("{}", Table::new(&rows));
    }

    let failed = report.outcomes.iter().filter(|o| o.error.is_some()).count();
    if failed > 0 {
        output::print_warning(&format!("{} projection(s) skipped", failed));
    }
    output::print_success(&format!("pDOS plot saved to '{}'", report.output.display()));
}
