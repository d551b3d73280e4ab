//! Shared application-level helpers for examples and tools.
//!
//! These functions wire up I/O (load image, JSON summary, binary map dump)
//! around the `ors` APIs so the examples and the golden generator share the
//! same behavior.

use crate::image::{ors_response_image, ors_response_image_unit};
use anyhow::{Context, Result};
use image::{GrayImage, ImageReader};
use ors_core::window::invert_u8;
use ors_core::{IntegrandMode, OrsMap, OrsParams};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Catalogue,
    Direct,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "catalogue" | "catalog" | "cached" => Ok(Mode::Catalogue),
            "direct" | "uncached" => Ok(Mode::Direct),
            other => Err(format!(
                "invalid mode '{other}', expected catalogue|direct"
            )),
        }
    }
}

// Both directions match exhaustively, so a new core mode fails to build here
// until it gets a config spelling.
impl From<IntegrandMode> for Mode {
    fn from(m: IntegrandMode) -> Self {
        match m {
            IntegrandMode::Catalogue => Mode::Catalogue,
            IntegrandMode::Direct => Mode::Direct,
        }
    }
}

impl From<Mode> for IntegrandMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Catalogue => IntegrandMode::Catalogue,
            Mode::Direct => IntegrandMode::Direct,
        }
    }
}

/// How pixel intensities are turned into heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputScale {
    /// Intensities divided by 255, heights in `[0, 1]`.
    Unit,
    /// Raw 8-bit levels, heights in `0..=255`.
    Levels,
}

impl FromStr for InputScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unit" => Ok(InputScale::Unit),
            "levels" | "u8" => Ok(InputScale::Levels),
            other => Err(format!("invalid input scale '{other}', expected unit|levels")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrsConfig {
    pub image: PathBuf,
    pub half_size: Option<u32>,
    pub mode: Option<Mode>,
    /// Defaults to `levels` in catalogue mode and `unit` in direct mode.
    pub input_scale: Option<InputScale>,
    pub invert: Option<bool>,
    pub output_json: Option<PathBuf>,
    pub output_bin: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl OrsConfig {
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            half_size: None,
            mode: None,
            input_scale: None,
            invert: None,
            output_json: None,
            output_bin: None,
            log_level: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_else(|| IntegrandMode::default().into())
    }

    pub fn input_scale(&self) -> InputScale {
        self.input_scale.unwrap_or(match self.mode() {
            Mode::Catalogue => InputScale::Levels,
            Mode::Direct => InputScale::Unit,
        })
    }

    /// Validated core parameters.
    pub fn params(&self) -> Result<OrsParams> {
        let mut params = OrsParams::default().with_mode(self.mode().into());
        if let Some(hs) = self.half_size {
            if hs == 0 {
                anyhow::bail!("half-size must be >= 1");
            }
            params.half_size = hs;
        }
        if self.mode() == Mode::Catalogue && self.input_scale() == InputScale::Unit {
            anyhow::bail!("catalogue mode needs 8-bit heights; use input_scale = \"levels\"");
        }
        Ok(params)
    }
}

/// Summary statistics over the finite values of a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrsStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl OrsStats {
    pub fn from_map(map: &OrsMap) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut n = 0usize;
        for &v in map.data.iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            n += 1;
        }
        if n == 0 {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        }
        Self {
            min,
            max,
            mean: sum / n as f64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrsDump {
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub half_size: u32,
    pub mode: Mode,
    pub input_scale: InputScale,
    pub inverted: bool,
    pub ors_width: usize,
    pub ors_height: usize,
    pub elapsed_ms: f64,
    pub stats: OrsStats,
    pub output_bin: String,
}

/// Load the configured image, compute its ORS map, and write the JSON
/// summary and the binary map next to it (or where the config says).
pub fn run_ors(cfg: &OrsConfig) -> Result<OrsDump> {
    let params = cfg.params()?;
    let mode = cfg.mode();
    let scale = cfg.input_scale();
    let inverted = cfg.invert.unwrap_or(false);

    let mut img = ImageReader::open(&cfg.image)
        .with_context(|| format!("opening image {}", cfg.image.display()))?
        .decode()
        .with_context(|| format!("decoding image {}", cfg.image.display()))?
        .to_luma8();
    if inverted {
        let (w, h) = img.dimensions();
        img = GrayImage::from_raw(w, h, invert_u8(img.as_raw()))
            .context("inverted image buffer")?;
    }
    info!(
        "image {}: {}x{} px, half_size {}, mode {:?}, scale {:?}",
        cfg.image.display(),
        img.width(),
        img.height(),
        params.half_size,
        mode,
        scale
    );

    let started = Instant::now();
    let map = match scale {
        InputScale::Levels => ors_response_image(&img, &params),
        InputScale::Unit => ors_response_image_unit(&img, &params),
    }
    .with_context(|| format!("computing ORS for {}", cfg.image.display()))?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!("ors map {}x{} in {:.2} ms", map.w, map.h, elapsed_ms);

    let bin_out = cfg
        .output_bin
        .clone()
        .unwrap_or_else(|| cfg.image.with_extension("ors.bin"));
    write_map_bin(&bin_out, &map)?;

    let dump = OrsDump {
        image: cfg.image.to_string_lossy().into_owned(),
        width: img.width(),
        height: img.height(),
        half_size: params.half_size,
        mode,
        input_scale: scale,
        inverted,
        ors_width: map.w,
        ors_height: map.h,
        elapsed_ms,
        stats: OrsStats::from_map(&map),
        output_bin: bin_out.to_string_lossy().into_owned(),
    };

    let json_out = cfg
        .output_json
        .clone()
        .unwrap_or_else(|| cfg.image.with_extension("ors.json"));
    write_json(&json_out, &dump)?;
    info!(
        "saved {} and {}",
        json_out.display(),
        bin_out.display()
    );

    Ok(dump)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let mut json_file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(&mut json_file, value)?;
    json_file.write_all(b"\n")?;
    Ok(())
}

/// Write a map as `w: u32`, `h: u32`, then `w*h` `f32` values, all
/// little-endian.
pub fn write_map_bin(path: &Path, map: &OrsMap) -> Result<()> {
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut buf = Vec::with_capacity(8 + 4 * map.data.len());
    buf.extend_from_slice(&(map.w as u32).to_le_bytes());
    buf.extend_from_slice(&(map.h as u32).to_le_bytes());
    for v in &map.data {
        buf.extend_from_slice(&(*v as f32).to_le_bytes());
    }
    f.write_all(&buf)?;
    Ok(())
}

/// Read a map written by [`write_map_bin`]. Values come back as `f32`
/// precision.
pub fn read_map_bin(path: &Path) -> Result<OrsMap> {
    let mut buf = Vec::new();
    File::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .read_to_end(&mut buf)?;
    if buf.len() < 8 {
        anyhow::bail!("{}: truncated header", path.display());
    }

    let w = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let h = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    let body = &buf[8..];
    if body.len() != 4 * w * h {
        anyhow::bail!(
            "{}: expected {} values for {}x{}, found {} bytes",
            path.display(),
            w * h,
            w,
            h,
            body.len()
        );
    }

    let data = body
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
        .collect();
    Ok(OrsMap { w, h, data })
}

pub fn load_config(path: &Path) -> Result<OrsConfig> {
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let cfg: OrsConfig = serde_json::from_reader(file)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_and_scale_parse_case_insensitively() {
        assert_eq!("Catalogue".parse::<Mode>().unwrap(), Mode::Catalogue);
        assert_eq!("DIRECT".parse::<Mode>().unwrap(), Mode::Direct);
        assert!("fast".parse::<Mode>().is_err());
        assert_eq!("unit".parse::<InputScale>().unwrap(), InputScale::Unit);
        assert_eq!("Levels".parse::<InputScale>().unwrap(), InputScale::Levels);
    }

    #[test]
    fn mode_maps_one_to_one_onto_core_mode() {
        for core in [IntegrandMode::Catalogue, IntegrandMode::Direct] {
            let m = Mode::from(core);
            assert_eq!(IntegrandMode::from(m), core);
            let text = serde_json::to_string(&m).unwrap();
            assert_eq!(text.trim_matches('"').parse::<Mode>().unwrap(), m);
        }
        assert_eq!(Mode::from(IntegrandMode::default()), Mode::Catalogue);
    }

    #[test]
    fn input_scale_defaults_follow_mode() {
        let mut cfg = OrsConfig::new("x.png");
        assert_eq!(cfg.input_scale(), InputScale::Levels);
        cfg.mode = Some(Mode::Direct);
        assert_eq!(cfg.input_scale(), InputScale::Unit);
    }

    #[test]
    fn params_reject_bad_combinations() {
        let mut cfg = OrsConfig::new("x.png");
        cfg.half_size = Some(0);
        assert!(cfg.params().is_err());

        let mut cfg = OrsConfig::new("x.png");
        cfg.input_scale = Some(InputScale::Unit);
        assert!(cfg.params().is_err());

        let mut cfg = OrsConfig::new("x.png");
        cfg.half_size = Some(4);
        cfg.mode = Some(Mode::Direct);
        let p = cfg.params().unwrap();
        assert_eq!(p.half_size, 4);
        assert_eq!(p.mode, IntegrandMode::Direct);
    }

    #[test]
    fn config_parses_from_json() {
        let cfg: OrsConfig = serde_json::from_str(
            r#"{"image": "a.png", "half_size": 12, "mode": "direct", "input_scale": "levels"}"#,
        )
        .unwrap();
        assert_eq!(cfg.image, PathBuf::from("a.png"));
        assert_eq!(cfg.half_size, Some(12));
        assert_eq!(cfg.mode(), Mode::Direct);
        assert_eq!(cfg.input_scale(), InputScale::Levels);
        assert!(cfg.output_json.is_none());
    }

    #[test]
    fn stats_ignore_non_finite_values() {
        let map = OrsMap {
            w: 2,
            h: 2,
            data: vec![1.0, f64::NAN, 3.0, 5.0],
        };
        let s = OrsStats::from_map(&map);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.mean, 3.0);
    }
}
