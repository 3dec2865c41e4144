//! # 绘图配置
//!
//! 列出所有可识别的选项及其默认值。可从 TOML 文件加载，
//! 命令行参数再覆盖文件中的值。
//!
//! ```toml
//! structure-file = "CONTCAR"
//! params-file = "projections.in"
//! format = "svg"
//! include-total = false
//! title = "Fe$_3$O$_4$"
//! y-cap = 8.0
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `serde` + `toml` 反序列化

use crate::error::{DosError, Result};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 图像格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// 完整绘图配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PlotConfig {
    /// POSCAR 路径，默认与 DOSCAR 同目录
    pub structure_file: Option<PathBuf>,
    /// 投影定义文件，默认与 DOSCAR 同目录的 params.in
    pub params_file: Option<PathBuf>,
    /// 总 DOS 图像文件名 (不含扩展名)
    pub tdos_name: String,
    /// 投影 DOS 图像文件名 (不含扩展名)
    pub pdos_name: String,
    pub format: ImageFormat,
    /// 投影图中是否绘制总 DOS 背景
    pub include_total: bool,
    pub title: Option<String>,
    /// 指定后作为输出文件名前缀，并关闭自动坐标范围
    pub plot_range: Option<String>,
    pub width: u32,
    pub height: u32,
    pub x_min: f64,
    pub x_max: f64,
    pub y_cap: f64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            structure_file: None,
            params_file: None,
            tdos_name: "tdos".to_string(),
            pdos_name: "pdos".to_string(),
            format: ImageFormat::Png,
            include_total: true,
            title: None,
            plot_range: None,
            width: 1200,
            height: 900,
            x_min: -6.0,
            x_max: 6.0,
            y_cap: 5.0,
        }
    }
}

impl PlotConfig {
    /// 从 TOML 文件加载
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DosError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    pub fn from_toml(content: &str, path: &str) -> Result<Self> {
        let config: PlotConfig = toml::from_str(content).map_err(|e| DosError::ConfigError {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// 加载可选配置文件，否则使用默认值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self, path: &str) -> Result<()> {
        let invalid = |reason: &str| DosError::ConfigError {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        if self.x_max <= self.x_min {
            return Err(invalid("x-max must be greater than x-min"));
        }
        if self.y_cap <= 0.0 {
            return Err(invalid("y-cap must be positive"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(invalid("width and height must be non-zero"));
        }
        Ok(())
    }

    /// 输出图像路径: `<dir>/[<plot_range>_]<name>.<ext>`
    pub fn output_path(&self, dos_path: &Path, name: &str) -> PathBuf {
        let dir = dos_path.parent().unwrap_or_else(|| Path::new(""));
        let file = match &self.plot_range {
            Some(prefix) => format!("{}_{}.{}", prefix, name, self.format.extension()),
            None => format!("{}.{}", name, self.format.extension()),
        };
        dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlotConfig::default();
        assert_eq!(config.tdos_name, "tdos");
        assert_eq!(config.pdos_name, "pdos");
        assert_eq!(config.format, ImageFormat::Png);
        assert!(config.include_total);
        assert_eq!((config.x_min, config.x_max, config.y_cap), (-6.0, 6.0, 5.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PlotConfig::from_toml(
            "format = \"svg\"\ninclude-total = false\ntitle = \"Fe3O4\"\n",
            "dosplot.toml",
        )
        .unwrap();
        assert_eq!(config.format, ImageFormat::Svg);
        assert!(!config.include_total);
        assert_eq!(config.title.as_deref(), Some("Fe3O4"));
        assert_eq!(config.width, 1200);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PlotConfig::from_toml("colour = \"red\"\n", "dosplot.toml").unwrap_err();
        assert!(matches!(err, DosError::ConfigError { .. }));
    }

    #[test]
    fn test_invalid_window_rejected() {
        let err = PlotConfig::from_toml("x-min = 2.0\nx-max = -2.0\n", "dosplot.toml").unwrap_err();
        assert!(matches!(err, DosError::ConfigError { .. }));
    }

    #[test]
    fn test_output_path() {
        let mut config = PlotConfig::default();
        let dos = Path::new("/calc/Fe/DOSCAR");
        assert_eq!(config.output_path(dos, "tdos"), PathBuf::from("/calc/Fe/tdos.png"));

        config.plot_range = Some("wide".to_string());
        config.format = ImageFormat::Svg;
        assert_eq!(
            config.output_path(dos, "pdos"),
            PathBuf::from("/calc/Fe/wide_pdos.svg")
        );
    }
}
