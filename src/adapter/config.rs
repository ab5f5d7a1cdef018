//! TOML config loading (grounded on `utils/config.rs`'s `Config::get_config`)
//! plus the bridge from keybind strings to `core::global_shortcuts`.

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::global_shortcuts::{GlobalShortcuts, RegularShortcut, Shortcut, Trigger};
use crate::core::xkb_keyboard::ModMask;

/// What a global shortcut or keybind actually does once triggered. Window
/// manipulation actions go through `core::Space`; `Exec`/`Exit`/`ReloadConfig`
/// stay host-level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum WmAction {
    Exec { command: String },
    KillActive,
    CloseActive,
    ToggleFullscreen,
    ToggleMaximize,
    QuickTile { edge: QuickTileEdge },
    SwitchWindow { direction: SwitchDirection },
    Desktop { index: u32 },
    MoveToDesktop { index: u32 },
    ReloadConfig,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickTileEdge {
    Left,
    Right,
    Top,
    Bottom,
    Maximize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchDirection {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct KeyboardConfig {
    pub layouts: Vec<String>,
    pub repeat_rate: i32,
    pub repeat_delay: i32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BorderConfig {
    pub thickness: i32,
    pub active: String,
    pub inactive: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OutputConfig {
    pub resolution: (i32, i32),
    pub refresh_rate: i32,
    pub scale: f64,
    pub position: (i32, i32),
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub border: BorderConfig,
    pub keyboard: KeyboardConfig,
    pub outputs: IndexMap<String, OutputConfig>,
    pub autostart: Vec<String>,
    pub keybinds: IndexMap<String, WmAction>,
    pub focus_follows_mouse: bool,
    pub placement_policy: PlacementPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    Smart,
    Centered,
    Cascade,
}

impl Default for Config {
    fn default() -> Self {
        let border = BorderConfig { thickness: 2, active: "#8B4000".into(), inactive: "#2A2A2A".into() };
        let keyboard =
            KeyboardConfig { layouts: vec!["us".into()], repeat_rate: 25, repeat_delay: 200 };
        let mut outputs = IndexMap::new();
        outputs.insert(
            "DP-1".to_string(),
            OutputConfig { resolution: (1920, 1080), refresh_rate: 60, scale: 1.0, position: (0, 0), enabled: true },
        );

        let mut keybinds = IndexMap::new();
        keybinds.insert("Super+q".into(), WmAction::CloseActive);
        keybinds.insert("Super+Shift+q".into(), WmAction::KillActive);
        keybinds.insert("Super+f".into(), WmAction::ToggleFullscreen);
        keybinds.insert("Super+m".into(), WmAction::ToggleMaximize);
        keybinds.insert("Super+Left".into(), WmAction::QuickTile { edge: QuickTileEdge::Left });
        keybinds.insert("Super+Right".into(), WmAction::QuickTile { edge: QuickTileEdge::Right });
        keybinds.insert("Super+Up".into(), WmAction::QuickTile { edge: QuickTileEdge::Maximize });
        keybinds.insert("Super+h".into(), WmAction::SwitchWindow { direction: SwitchDirection::West });
        keybinds.insert("Super+l".into(), WmAction::SwitchWindow { direction: SwitchDirection::East });
        keybinds.insert("Super+k".into(), WmAction::SwitchWindow { direction: SwitchDirection::North });
        keybinds.insert("Super+j".into(), WmAction::SwitchWindow { direction: SwitchDirection::South });
        keybinds.insert("Super+r".into(), WmAction::ReloadConfig);
        keybinds.insert("Super+Shift+e".into(), WmAction::Exit);
        keybinds.insert("Super+Return".into(), WmAction::Exec { command: "kitty".into() });
        for index in 1..=9 {
            keybinds.insert(format!("Super+{index}"), WmAction::Desktop { index });
            keybinds.insert(format!("Super+Shift+{index}"), WmAction::MoveToDesktop { index });
        }

        Self {
            border,
            keyboard,
            outputs,
            autostart: Vec::new(),
            keybinds,
            focus_follows_mouse: false,
            placement_policy: PlacementPolicy::Smart,
        }
    }
}

impl Config {
    /// Reads `~/.config/wincore/config.toml`, writing the default config on
    /// first run. Same round trip as `utils/config.rs::Config::get_config`.
    pub fn load() -> anyhow::Result<Config> {
        let home = std::env::var("HOME")?;
        let mut dir_path = PathBuf::from(home);
        dir_path.push(".config/wincore");
        let mut config_path = dir_path.clone();
        config_path.push("config.toml");

        if config_path.exists() {
            let data = fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&data)?)
        } else {
            let config = Config::default();
            fs::create_dir_all(&dir_path)?;
            fs::write(&config_path, toml::to_string(&config)?)?;
            Ok(config)
        }
    }

    /// Builds the `core` global-shortcut registry from `keybinds`, skipping
    /// (and logging) any binding text `parse_keybind` can't make sense of.
    pub fn build_global_shortcuts(&self) -> GlobalShortcuts<WmAction> {
        let mut shortcuts = GlobalShortcuts::new();
        for (text, action) in &self.keybinds {
            match parse_keybind(text) {
                Some((mods, keysym)) => {
                    shortcuts.add_if_not_exists(
                        Shortcut::Regular(RegularShortcut { mods, trigger: Trigger::Key(keysym) }),
                        action.clone(),
                    );
                }
                None => tracing::warn!("unrecognised keybind {text:?}, skipping"),
            }
        }
        shortcuts
    }
}

/// Parses `"Super+Shift+q"`-style text into a modifier mask and an xkb
/// keysym, mirroring `utils/config.rs::parse_keybind` but targeting the
/// core's own `ModMask` instead of `smithay::input::keyboard::ModifiersState`.
pub fn parse_keybind(keybind: &str) -> Option<(ModMask, u32)> {
    let parts: Vec<&str> = keybind.split('+').map(str::trim).collect();
    let (key_part, mod_parts) = parts.split_last()?;

    let mut mods = ModMask::NONE;
    for part in mod_parts {
        mods = mods.union(match part.to_lowercase().as_str() {
            "super" | "logo" => ModMask::LOGO,
            "shift" => ModMask::SHIFT,
            "ctrl" | "control" => ModMask::CTRL,
            "alt" => ModMask::ALT,
            _ => return None,
        });
    }

    let keysym = keysym_from_name(key_part)?;
    Some((mods, keysym))
}

/// Looks up an xkb keysym by name using `smithay`'s keysym table, the same
/// constants `utils/config.rs::parse_keybind` matches on.
fn keysym_from_name(name: &str) -> Option<u32> {
    use smithay::input::keyboard::keysyms::*;
    Some(match name.to_lowercase().as_str() {
        "a" => KEY_a, "b" => KEY_b, "c" => KEY_c, "d" => KEY_d, "e" => KEY_e,
        "f" => KEY_f, "g" => KEY_g, "h" => KEY_h, "i" => KEY_i, "j" => KEY_j,
        "k" => KEY_k, "l" => KEY_l, "m" => KEY_m, "n" => KEY_n, "o" => KEY_o,
        "p" => KEY_p, "q" => KEY_q, "r" => KEY_r, "s" => KEY_s, "t" => KEY_t,
        "u" => KEY_u, "v" => KEY_v, "w" => KEY_w, "x" => KEY_x, "y" => KEY_y,
        "z" => KEY_z,
        "0" => KEY_0, "1" => KEY_1, "2" => KEY_2, "3" => KEY_3, "4" => KEY_4,
        "5" => KEY_5, "6" => KEY_6, "7" => KEY_7, "8" => KEY_8, "9" => KEY_9,
        "up" => KEY_Up, "down" => KEY_Down, "left" => KEY_Left, "right" => KEY_Right,
        "escape" | "esc" => KEY_Escape,
        "tab" => KEY_Tab,
        "enter" | "return" => KEY_Return,
        "space" => KEY_space,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_modifier_keybind() {
        let (mods, keysym) = parse_keybind("Super+Shift+q").unwrap();
        assert!(mods.contains(ModMask::LOGO));
        assert!(mods.contains(ModMask::SHIFT));
        assert_eq!(keysym, smithay::input::keyboard::keysyms::KEY_q);
    }

    #[test]
    fn unknown_modifier_fails_to_parse() {
        assert!(parse_keybind("Hyper+q").is_none());
    }

    #[test]
    fn default_config_keybinds_all_parse() {
        let config = Config::default();
        let shortcuts = config.build_global_shortcuts();
        // every default keybind is well-formed, so none should be dropped
        let _ = shortcuts;
        for text in config.keybinds.keys() {
            assert!(parse_keybind(text).is_some(), "failed to parse default keybind {text}");
        }
    }
}
