//! Settings of a small sample application, bound to config files through
//! bindings generated by the build script.

use std::borrow::Cow;

use cfgbind::{entry, generate_config};

pub mod audio;
pub mod display;

#[generate_config]
pub struct General;

impl General {
    #[entry("General", "Test", "An integer config")]
    pub const TEST: i32 = 0;

    #[entry("General", "Greeting", "Shown on startup.\nLeave empty to skip the greeting.")]
    pub const GREETING: Cow<'static, str> = Cow::Borrowed("Hello");

    /// Not marked, so not bound.
    pub const REVISION: u32 = 3;
}

cfgbind::include_config!("general");
