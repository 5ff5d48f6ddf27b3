use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub boundaries: PathBuf,
    pub region_name_column: String,
    pub population: PopulationConfig,
    pub land: LandConfig,
}

/// Settings shared by every delimited attribute file.
#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    pub path: PathBuf,
    pub key_column: String,
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PopulationConfig {
    #[serde(flatten)]
    pub table: TableConfig,
    pub urban_percentage_column: String,
    pub density_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LandConfig {
    #[serde(flatten)]
    pub table: TableConfig,
    pub net_sown_area_column: String,
    pub forest_column: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            // Latin-1 bytes are the first 256 Unicode code points.
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// `[lat, lon]`; computed from the region bounds when absent.
    pub center: Option<[f64; 2]>,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_formats")]
    pub formats: Vec<MapFormat>,
    #[serde(default)]
    pub style: StyleConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: default_output_dir(),
            center: None,
            zoom: default_zoom(),
            formats: default_formats(),
            style: StyleConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MapFormat {
    Html,
    Geojson,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StyleConfig {
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        StyleConfig {
            fill_color: default_fill_color(),
            fill_opacity: default_fill_opacity(),
            weight: default_weight(),
        }
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("maps")
}

fn default_zoom() -> u8 {
    5
}

fn default_formats() -> Vec<MapFormat> {
    vec![MapFormat::Html, MapFormat::Geojson]
}

fn default_fill_color() -> String {
    "blue".to_string()
}

fn default_fill_opacity() -> f64 {
    0.6
}

fn default_weight() -> f64 {
    0.5
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
