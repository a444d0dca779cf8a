use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub(crate) const TANK_WIDTH: f32 = 800.0;
pub(crate) const TANK_HEIGHT: f32 = 600.0;
pub(crate) const DEFAULT_FISH: usize = 15;
pub(crate) const SEAWEED_PLANTS: usize = 15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) frame_delay_ms: u64,
    pub(crate) seed: u64,
    pub(crate) enable_color: bool,
    pub(crate) show_hud: bool,
    pub(crate) log_level: String,
    pub(crate) log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_delay_ms: 30,
            seed: 0,
            enable_color: true,
            show_hud: true,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Settings {
    pub(crate) fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "fishtank", "Fishtank")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("fishtank.log"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    // rename replaces an existing file in one step
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Startup parameters taken from the command line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Options {
    pub(crate) fish: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) frame_delay_ms: Option<u64>,
    pub(crate) help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fish: DEFAULT_FISH,
            seed: None,
            frame_delay_ms: None,
            help: false,
        }
    }
}

impl Options {
    /// Frame delay for this run; the flag wins over the stored setting without replacing it.
    pub(crate) fn frame_delay(&self, settings: &Settings) -> Duration {
        let ms = self.frame_delay_ms.unwrap_or(settings.frame_delay_ms);
        Duration::from_millis(ms.clamp(5, 1000))
    }
}

pub(crate) const USAGE: &str = "fishtank\n\n\
Usage:\n\
\tfishtank [--fish N] [--seed N] [--delay MS]\n\n\
Controls:\n\
\tRight click  drop food\n\
\tF            drop food somewhere\n\
\tP / Space    pause\n\
\tH            toggle HUD\n\
\tQ / Esc      quit\n";

pub(crate) fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Options {
    let mut opts = Options::default();
    let mut it = args.into_iter();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--fish" => {
                if let Some(v) = it.next() {
                    opts.fish = v.parse().unwrap_or(opts.fish);
                }
            }
            "--seed" => {
                if let Some(v) = it.next() {
                    opts.seed = v.parse().ok().or(opts.seed);
                }
            }
            "--delay" => {
                if let Some(v) = it.next() {
                    opts.frame_delay_ms = v.parse().ok().or(opts.frame_delay_ms);
                }
            }
            "--help" | "-h" => opts.help = true,
            _ => {}
        }
    }
    opts
}

pub(crate) fn options_from_env() -> Options {
    parse_args(env::args().skip(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        assert_eq!(parse_args(Vec::new()), Options::default());
        assert_eq!(Options::default().fish, 15);
    }

    #[test]
    fn flags_override_defaults() {
        let o = parse_args(args(&["--fish", "4", "--seed", "99", "--delay", "16"]));
        assert_eq!(o.fish, 4);
        assert_eq!(o.seed, Some(99));
        assert_eq!(o.frame_delay_ms, Some(16));
        assert!(!o.help);
    }

    #[test]
    fn junk_values_keep_defaults() {
        let o = parse_args(args(&["--fish", "lots", "--seed", "-3", "--bogus", "-h"]));
        assert_eq!(o.fish, DEFAULT_FISH);
        assert_eq!(o.seed, None);
        assert!(o.help);
    }

    #[test]
    fn delay_flag_overrides_only_this_run() {
        let dir = env::temp_dir().join(format!("fishtank-delay-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        let settings = Settings::default();
        let opts = parse_args(args(&["--delay", "5"]));
        assert_eq!(opts.frame_delay(&settings), Duration::from_millis(5));
        assert_eq!(Options::default().frame_delay(&settings), Duration::from_millis(30));

        save_settings_atomic(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).frame_delay_ms, 30);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn settings_fill_missing_fields() {
        let s: Settings = serde_json::from_str(r#"{ "show_hud": false }"#).unwrap();
        assert!(!s.show_hud);
        assert_eq!(s.frame_delay_ms, 30);
        assert_eq!(s.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn bad_level_falls_back_to_info() {
        let s = Settings {
            log_level: "chatty".into(),
            ..Settings::default()
        };
        assert_eq!(s.level_filter(), log::LevelFilter::Info);
        let s = Settings {
            log_level: "debug".into(),
            ..Settings::default()
        };
        assert_eq!(s.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn settings_survive_a_save_and_load() {
        let dir = env::temp_dir().join(format!("fishtank-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        let s = Settings {
            seed: 7,
            enable_color: false,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        assert!(!path.with_extension("json.tmp").exists());

        fs::write(&path, "not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
        let _ = fs::remove_dir_all(&dir);
    }
}
