use crate::app::App;
use crate::mpris::{ControlCmd, MprisHandle};

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    mpris.publish(&app.now_playing());
}

/// Apply a media-key command. Returns `true` when the app should quit.
pub fn handle_control_cmd(cmd: ControlCmd, app: &mut App) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => app.resume_last(),
        ControlCmd::Pause | ControlCmd::Stop => app.stop_all(),
        ControlCmd::PlayPause => app.play_pause(),
    }
    false
}
