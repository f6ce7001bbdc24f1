//! Audio cues.
//!
//! Gameplay fires cues and forgets them. Playback is owned by whatever sits on
//! the other end of the message queue; the default consumer just logs.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    PlayerShoot,
    EmptyClip,
    ReloadStart,
    ReloadDone,
    Jump,
    EnemyAlert,
    EnemyAttack,
    EnemyShoot,
    Hurt,
    Death,
}

pub fn plugin(app: &mut App) {
    app.add_message::<AudioCue>()
        .add_systems(Last, drain_audio_cues);
}

fn drain_audio_cues(mut cues: MessageReader<AudioCue>) {
    for cue in cues.read() {
        debug!("cue: {cue:?}");
    }
}
