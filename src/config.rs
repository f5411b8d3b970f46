use crate::mate::ControlMode;
use crate::variant::Species;
use clap::Parser;

pub const DEFAULT_LOG_FILTER: &str = "info,wgpu=error,naga=warn";

#[derive(Parser, Clone, Debug)]
#[command(
    name = "desktop-mate",
    version,
    about = "An animated character living on top of your desktop"
)]
pub struct Settings {
    /// Which character to show.
    #[arg(long, value_enum, env = "DESKTOP_MATE_CHARACTER", default_value_t = Species::Human)]
    pub character: Species,

    /// `menu`: right-click menu and keyboard toggles.
    /// `timed`: control bar, behaviors end on their own.
    #[arg(long, value_enum, env = "DESKTOP_MATE_CONTROLS", default_value_t = ControlMode::Menu)]
    pub controls: ControlMode,

    /// Keep the whole window clickable instead of letting clicks through around the character.
    #[arg(long, env = "DESKTOP_MATE_NO_PASSTHROUGH")]
    pub no_passthrough: bool,

    /// `tracing` filter directives.
    #[arg(long, env = "DESKTOP_MATE_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Settings {
    pub fn passthrough(&self) -> bool {
        !self.no_passthrough
    }
}
