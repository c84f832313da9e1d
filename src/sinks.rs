//! Host sink contracts (§6 "Host contract"): the render/audio surfaces the
//! embedding environment provides to the core. The core only ever writes to
//! these; gameplay logic never reads back through them (spec §5).

use bevy::math::Vec3;

/// Opaque scene submission. The core treats the scene graph as a handle it
/// owns and mutates; its actual representation is the host's concern.
pub struct SceneGraph {
    pub draw_calls: u32,
}

/// Audio playback options shared by `play_2d`/`play_3d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    pub gain: f32,
    pub looped: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            gain: 1.0,
            looped: false,
        }
    }
}

/// `submitScene` (spec §6). Failures are a host fault (render sinks are not
/// expected to fail once initialized), not a per-call recoverable error.
pub trait RenderSink: Send + Sync {
    fn submit_scene(&mut self, scene: &SceneGraph);
}

/// `loadSample/play2D/play3D/stop/setMasterGain` (spec §6). Every method
/// returns `bool` success rather than an error type: failures here are
/// `resource-missing` and are swallowed by the Audio Director (§7), never
/// propagated as exceptions.
pub trait AudioSink: Send + Sync {
    fn load_sample(&mut self, id: &str, url: &str, category: &str) -> bool;
    fn play_2d(&mut self, id: &str, opts: PlaybackOptions) -> bool;
    fn play_3d(&mut self, id: &str, position: Vec3, opts: PlaybackOptions) -> bool;
    fn stop(&mut self, id: &str);
    fn set_master_gain(&mut self, gain: f32);
}

/// Discards every submission. Default sink until the host installs a real
/// one, and the sink used by headless tests.
#[derive(Debug, Default)]
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
    fn submit_scene(&mut self, _scene: &SceneGraph) {}
}

/// Reports every call as failed, matching "missing audio asset" being the
/// common case in a headless/test environment.
#[derive(Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn load_sample(&mut self, _id: &str, _url: &str, _category: &str) -> bool {
        false
    }

    fn play_2d(&mut self, _id: &str, _opts: PlaybackOptions) -> bool {
        false
    }

    fn play_3d(&mut self, _id: &str, _position: Vec3, _opts: PlaybackOptions) -> bool {
        false
    }

    fn stop(&mut self, _id: &str) {}

    fn set_master_gain(&mut self, _gain: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sinks_report_failure_without_panicking() {
        let mut audio = NullAudioSink;
        assert!(!audio.load_sample("explosion", "explosion.ogg", "sfx"));
        assert!(!audio.play_2d("explosion", PlaybackOptions::default()));
        audio.stop("explosion");
        audio.set_master_gain(0.5);

        let mut render = NullRenderSink;
        render.submit_scene(&SceneGraph { draw_calls: 0 });
    }
}
