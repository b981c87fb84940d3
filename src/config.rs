// config.rs — viewer configuration: variant presets, JSON overrides and CLI flags
//
// Resolution order: variant preset -> config file (--config) -> CLI flags. A `--variant`
// flag picks the preset the file's fields are then laid over.

use crate::hotspot::{default_hotspots, Hotspot, Pulse};
use crate::orientation::ORBIT_DAMPING;
use crate::tooltip::TooltipStyle;
use crate::zoom::WheelZoom;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_IMAGE: &str = "assets/shot-panoramic-composition-living-room.jpg";
pub const DEFAULT_FOV: f32 = 75.0;
pub const SPRITE_TTL_MS: u64 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid fov range [{0}, {1}]")]
    FovRange(f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Damped orbit camera, cursor tooltip.
    Orbit,
    /// Manual lon/lat drag, pulsing markers, timed sprite labels.
    Drag,
    /// Manual lon/lat drag, pulsing markers, cursor tooltip.
    DragPulse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMode {
    Orbit { damping: Option<f32> },
    Drag,
}

/// Fully resolved settings for one viewer instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub variant: Variant,
    pub image: PathBuf,
    pub hotspots: Vec<Hotspot>,
    pub control: ControlMode,
    pub fov: f32,
    pub min_fov: f32,
    pub max_fov: f32,
    pub wheel: WheelZoom,
    pub tooltip: TooltipStyle,
    pub pulse: Option<Pulse>,
}

impl ViewerConfig {
    pub fn preset(variant: Variant) -> Self {
        let drag = Self {
            variant,
            image: PathBuf::from(DEFAULT_IMAGE),
            hotspots: default_hotspots(),
            control: ControlMode::Drag,
            fov: DEFAULT_FOV,
            min_fov: 30.0,
            max_fov: 85.0,
            wheel: WheelZoom::Additive { step: 0.05 },
            tooltip: TooltipStyle::Sprite {
                ttl_ms: SPRITE_TTL_MS,
            },
            pulse: Some(Pulse::default()),
        };
        match variant {
            Variant::Orbit => Self {
                control: ControlMode::Orbit {
                    damping: Some(ORBIT_DAMPING),
                },
                max_fov: 120.0,
                wheel: WheelZoom::Multiplicative { factor: 1.05 },
                tooltip: TooltipStyle::Overlay,
                pulse: None,
                ..drag
            },
            Variant::Drag => drag,
            Variant::DragPulse => Self {
                tooltip: TooltipStyle::Overlay,
                ..drag
            },
        }
    }

    /// Lays the file's fields over `self`. The file's `variant` only chooses the preset and is
    /// read by [`ViewerConfig::resolve`], not here.
    fn apply_file(&mut self, file: ConfigFile) -> Result<(), ConfigError> {
        if let Some(p) = file.image {
            self.image = p;
        }
        if let Some(h) = file.hotspots {
            self.hotspots = h;
        }
        if let Some(f) = file.fov {
            self.fov = f;
        }
        if let Some([lo, hi]) = file.fov_range {
            if !(lo > 0.0 && lo <= hi && hi < 180.0) {
                return Err(ConfigError::FovRange(lo, hi));
            }
            self.min_fov = lo;
            self.max_fov = hi;
        }
        if let Some(w) = file.wheel {
            self.wheel = w;
        }
        if let Some(t) = file.tooltip {
            self.tooltip = t;
        }
        if let Some(p) = file.pulse {
            self.pulse = p.then(Pulse::default);
        }
        if let Some(d) = file.damping {
            if let ControlMode::Orbit { damping } = &mut self.control {
                *damping = (d > 0.0).then_some(d);
            }
        }
        Ok(())
    }

    /// Builds the configuration from a parsed command line.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = args.config.as_deref().map(ConfigFile::read).transpose()?;
        Self::resolve(args, file)
    }

    fn resolve(args: &Args, file: Option<ConfigFile>) -> Result<Self, ConfigError> {
        let variant = args
            .variant
            .or_else(|| file.as_ref().and_then(|f| f.variant))
            .unwrap_or(Variant::Orbit);
        let mut cfg = Self::preset(variant);
        if let Some(file) = file {
            cfg.apply_file(file)?;
        }
        if let Some(img) = &args.image {
            cfg.image = img.clone();
        }
        Ok(cfg)
    }

    /// The startup image, if it is there to load.
    pub fn initial_image(&self) -> Option<&Path> {
        self.image.is_file().then_some(self.image.as_path())
    }
}

/// On-disk configuration; every field is optional and overrides the preset.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub variant: Option<Variant>,
    pub image: Option<PathBuf>,
    pub hotspots: Option<Vec<Hotspot>>,
    pub fov: Option<f32>,
    pub fov_range: Option<[f32; 2]>,
    pub wheel: Option<WheelZoom>,
    pub tooltip: Option<TooltipStyle>,
    pub pulse: Option<bool>,
    pub damping: Option<f32>,
}

impl ConfigFile {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Command line options.
#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// JSON file overriding the variant preset.
    #[clap(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Panorama to open at startup.
    #[clap(long = "image", value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Interaction preset.
    #[clap(long = "variant", value_enum)]
    pub variant: Option<Variant>,

    /// UI language (en, zh-Hans, ja, fr); falls back to PANORAMA_LANG.
    #[clap(long = "lang", value_name = "CODE")]
    pub lang: Option<String>,
}
