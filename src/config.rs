// config.rs — tilestorm configuration
//
// Config is loaded from ~/.config/tilestorm/*.conf (or $TILESTORM_CONFIG_DIR).
// Uses key = value / section { } syntax.
//
// Recognised sections and the keys they carry (all optional, and all
// accepted at top level too):
//
//   grid {
//     total_elements, surfaces, cell_size, gap,
//     viewport_width, viewport_height
//   }
//   style {
//     background, border_color, border_width,
//     palette = #d8d8d8 #eaeaea #c9c9c9 #bfbfbf
//   }
//   animation {
//     mutations_per_tick, tick_ms, fade_steps, frame_hz, seed
//   }
//
//   source = other.conf   →  include another file (relative to this one)

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::color::Rgb;
use crate::util::{resolve_path, strip_comment};

/// Upper bound on fade-in steps; longer fades stutter under load.
pub const MAX_FADE_STEPS: u32 = 10;

// ── top-level ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub grid: GridConfig,
    pub style: StyleConfig,
    pub animation: AnimationConfig,
}

// ── grid ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    pub total_elements: u64,
    pub surfaces: u32,
    pub cell_size: u32,
    pub gap: u32,
    /// Width every surface is created with by the controller.
    pub viewport_width: u32,
    /// Initial canvas height before the worker sizes it to its rows.
    pub viewport_height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            total_elements: 100_000,
            surfaces: 10,
            cell_size: 16,
            gap: 4,
            viewport_width: 1000,
            viewport_height: 800,
        }
    }
}

// ── style ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleConfig {
    pub background: Rgb,
    /// Base shades a fresh grid is drawn from.
    pub palette: [Rgb; 4],
    pub border_color: Rgb,
    pub border_width: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: Rgb::WHITE,
            palette: [
                Rgb::new(0xd8, 0xd8, 0xd8),
                Rgb::new(0xea, 0xea, 0xea),
                Rgb::new(0xc9, 0xc9, 0xc9),
                Rgb::new(0xbf, 0xbf, 0xbf),
            ],
            border_color: Rgb::new(0x11, 0x5d, 0xf2),
            border_width: 4,
        }
    }
}

// ── animation ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationConfig {
    pub mutations_per_tick: u32,
    pub tick_ms: u64,
    pub fade_steps: u32,
    pub frame_hz: u64,
    /// Fixed RNG seed; each surface adds its index. `None` → entropy.
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            mutations_per_tick: 200,
            tick_ms: 1000,
            fade_steps: MAX_FADE_STEPS,
            frame_hz: 60,
            seed: None,
        }
    }
}

impl AnimationConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.frame_hz.max(1))
    }
}

// ── loading ───────────────────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        Self::load_from(&Self::config_dir())
    }

    /// Apply every `*.conf` in `dir`, in file-name order, over the defaults.
    pub fn load_from(dir: &Path) -> Self {
        let mut cfg = Config::default();
        let files = match conf_files(dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::info!("No config in {} ({e}), using defaults", dir.display());
                return cfg;
            }
        };
        for path in &files {
            let mut includes = vec![canonical(path)];
            if let Err(e) = load_file(path, &mut includes, &mut cfg) {
                tracing::warn!("Config error in {}: {e}", path.display());
            }
        }
        tracing::info!(
            "Config: {} elements over {} surfaces, {}/{}ms mutations",
            cfg.grid.total_elements,
            cfg.grid.surfaces,
            cfg.animation.mutations_per_tick,
            cfg.animation.tick_ms
        );
        cfg
    }

    /// `$TILESTORM_CONFIG_DIR`, else `$XDG_CONFIG_HOME/tilestorm`, else
    /// `~/.config/tilestorm`.
    pub fn config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("TILESTORM_CONFIG_DIR") {
            return dir.into();
        }
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .unwrap_or_default()
            .join("tilestorm")
    }
}

fn conf_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == "conf"))
        .collect();
    files.sort();
    Ok(files)
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn load_file(path: &Path, includes: &mut Vec<PathBuf>, cfg: &mut Config) -> Result<(), String> {
    tracing::debug!("Loading config: {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    parse_into(&text, path, includes, cfg)
}

// ── parser ────────────────────────────────────────────────────────────────────

fn parse_into(
    text: &str,
    file: &Path,
    includes: &mut Vec<PathBuf>,
    cfg: &mut Config,
) -> Result<(), String> {
    let mut section_stack: Vec<String> = Vec::new();

    for (raw_no, raw_line) in text.lines().enumerate() {
        let lineno = raw_no + 1;
        let line = strip_comment(raw_line).trim();

        if line.is_empty() {
            continue;
        }

        if line.ends_with('{') {
            let name = line.trim_end_matches('{').trim().to_lowercase();
            section_stack.push(name);
            continue;
        }

        if line == "}" {
            section_stack
                .pop()
                .ok_or_else(|| format!("{}:{}: unexpected `}}`", file.display(), lineno))?;
            continue;
        }

        let (key, value) = split_kv(line).ok_or_else(|| {
            format!(
                "{}:{}: expected `key = value`, got `{line}`",
                file.display(),
                lineno
            )
        })?;

        let section = section_stack.last().map(String::as_str).unwrap_or("");

        if key == "source" && section.is_empty() {
            let path = resolve_path(value, file);
            let canon = canonical(&path);
            if !path.exists() {
                tracing::warn!("{}:{lineno}: source {} not found", file.display(), path.display());
            } else if includes.contains(&canon) {
                tracing::warn!("{}:{lineno}: source {} is circular", file.display(), path.display());
            } else {
                includes.push(canon);
                if let Err(e) = load_file(&path, includes, cfg) {
                    tracing::warn!("{}:{lineno}: {e}", file.display());
                }
                includes.pop();
            }
            continue;
        }

        let applied = match section {
            "" => {
                apply_grid(key, value, &mut cfg.grid)
                    .or_else(|| apply_style(key, value, &mut cfg.style))
                    .or_else(|| apply_animation(key, value, &mut cfg.animation))
            }
            "grid" => apply_grid(key, value, &mut cfg.grid),
            "style" => apply_style(key, value, &mut cfg.style),
            "animation" => apply_animation(key, value, &mut cfg.animation),
            other => {
                tracing::warn!("{}:{}: unknown section `{other}`", file.display(), lineno);
                continue;
            }
        };

        match applied {
            Some(Ok(())) => {}
            Some(Err(())) => {
                tracing::warn!("{}:{}: bad value for `{key}`: `{value}`", file.display(), lineno)
            }
            None => tracing::warn!("{}:{}: unknown key `{key}`", file.display(), lineno),
        }
    }

    if !section_stack.is_empty() {
        return Err(format!(
            "{}: unclosed section(s): {}",
            file.display(),
            section_stack.join(" > ")
        ));
    }
    Ok(())
}

// ── section appliers ──────────────────────────────────────────────────────────
//
// `None` → key not recognised here; `Some(Err)` → recognised but unparsable,
// the previous value is kept.

type Applied = Option<Result<(), ()>>;

fn apply_grid(key: &str, value: &str, g: &mut GridConfig) -> Applied {
    match key {
        "total_elements" => Some(parse_num(value).map(|n| g.total_elements = n)),
        "surfaces" => Some(parse_positive(value).map(|n| g.surfaces = n)),
        "cell_size" => Some(parse_positive(value).map(|n| g.cell_size = n)),
        "gap" => Some(parse_num(value).map(|n| g.gap = n)),
        "viewport_width" => Some(parse_positive(value).map(|n| g.viewport_width = n)),
        "viewport_height" => Some(parse_positive(value).map(|n| g.viewport_height = n)),
        _ => None,
    }
}

fn apply_style(key: &str, value: &str, s: &mut StyleConfig) -> Applied {
    match key {
        "background" | "background_color" => Some(parse_color(value).map(|c| s.background = c)),
        "border_color" => Some(parse_color(value).map(|c| s.border_color = c)),
        "border_width" => Some(parse_num(value).map(|n| s.border_width = n)),
        "palette" => {
            let colors: Vec<Rgb> = value
                .split_whitespace()
                .filter_map(|c| Rgb::from_hex(c).ok())
                .collect();
            Some(
                <[Rgb; 4]>::try_from(colors)
                    .map(|p| s.palette = p)
                    .map_err(|_| ()),
            )
        }
        _ => None,
    }
}

fn apply_animation(key: &str, value: &str, a: &mut AnimationConfig) -> Applied {
    match key {
        "mutations_per_tick" => Some(parse_num(value).map(|n| a.mutations_per_tick = n)),
        "tick_ms" => Some(parse_positive(value).map(|n| a.tick_ms = n)),
        "fade_steps" => Some(
            parse_positive::<u32>(value).map(|n| a.fade_steps = n.min(MAX_FADE_STEPS)),
        ),
        "frame_hz" => Some(parse_positive(value).map(|n| a.frame_hz = n)),
        "seed" => Some(parse_num(value).map(|n| a.seed = Some(n))),
        _ => None,
    }
}

// ── primitive parsers ─────────────────────────────────────────────────────────

fn split_kv(line: &str) -> Option<(&str, &str)> {
    line.find('=')
        .map(|i| (line[..i].trim(), line[i + 1..].trim()))
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Result<T, ()> {
    s.trim().replace('_', "").parse().map_err(|_| ())
}

fn parse_positive<T: std::str::FromStr + PartialOrd + Default>(s: &str) -> Result<T, ()> {
    parse_num(s).and_then(|n: T| if n > T::default() { Ok(n) } else { Err(()) })
}

fn parse_color(s: &str) -> Result<Rgb, ()> {
    s.parse::<Rgb>().map_err(|e| tracing::debug!("{e}"))
}

// ── tests ─────────────────────────────────────────────────────────────────────
