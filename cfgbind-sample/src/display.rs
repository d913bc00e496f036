use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowMode {
    Windowed,
    Borderless,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Display settings. Never instantiated; it only carries the entries.
#[cfgbind::generate_config]
pub enum Screen {}

impl Screen {
    #[cfgbind::entry("Screen", "Mode", "How the window is presented")]
    pub const MODE: WindowMode = WindowMode::Windowed;

    #[cfgbind::entry("Screen", "Resolution", "Initial window size in pixels")]
    pub const RESOLUTION: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

cfgbind::include_config!("display.screen");

/// Color scheme; the entry stores the selected variant of the type itself.
#[cfgbind::generate_config]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[cfgbind::entry("Theme", "Current", "Color scheme of the interface")]
    pub const CURRENT: Self = Self::Dark;
}

cfgbind::include_config!("display.theme");
