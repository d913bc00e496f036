use cfgbind::entry as setting;
use cfgbind::generate_config as settings;

#[settings]
pub struct Audio;

impl Audio {
    const DEFAULT_CHANNELS: u8 = 2;

    #[setting("Audio", "Volume", "Master volume")]
    pub const VOLUME: f32 = 1.0;

    #[setting("Audio", "Channels", "Number of output channels")]
    pub const CHANNELS: u8 = Self::DEFAULT_CHANNELS;
}

cfgbind::include_config!("audio.audio");
