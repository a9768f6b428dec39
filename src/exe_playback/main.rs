mod rig_file;

use std::error::Error;
use std::path::PathBuf;
use clap::Parser;
use glam::Vec3;
use anim_ossa::{ClipCache, LoopBehavior, SkinnedRig};
use nab_ossa::app::{AppRun, ExitReason};
use nab_ossa::timing::{Clock, FSeconds};
use rig_file::RigFile;

#[derive(Debug, Parser)]
struct CliArgs
{
    /// Rig description (skeleton + clip) to play
    #[arg(long)]
    rig: PathBuf,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 10)]
    frames: u32,

    /// Fixed time step in seconds; wall-clock time between frames if omitted
    #[arg(long)]
    delta: Option<f32>,

    /// Stop at the last keyframe instead of looping
    #[arg(long, default_value_t = false)]
    no_loop: bool,
}

fn main() -> ExitReason
{
    let app_run = AppRun::<CliArgs>::startup("ossa_playback", env!("CARGO_PKG_VERSION"));

    if let Err(err) = play(&app_run.args)
    {
        log::error!("Failed to play {:?}: {err}", app_run.args.rig);
        app_run.set_exit_reason(ExitReason::LoadFailed);
    }
    app_run.get_exit_reason()
}

fn play(args: &CliArgs) -> Result<(), Box<dyn Error>>
{
    let rig_file = RigFile::load(&args.rig)?;
    let skeleton = rig_file.build_skeleton()?;

    let clips = ClipCache::new();
    let clip = clips.get_or_load(&args.rig, |_| rig_file.build_clip())?;

    let loop_behavior = match args.no_loop
    {
        true => LoopBehavior::StopAtLastFrame,
        false => LoopBehavior::Loop,
    };
    let mut rig = SkinnedRig::new(skeleton, loop_behavior);
    rig.assign_clip(clip);

    let clock = Clock::new();
    for frame in 0..args.frames
    {
        let delta = match args.delta
        {
            Some(seconds) => FSeconds(seconds),
            None => clock.tick().delta_secs(),
        };
        rig.tick(delta);

        log::info!("Frame {frame} @ {}", rig.animator().current_time());
        let skin = rig.skin_matrices();
        for joint in rig.skeleton().joints()
        {
            let Some(matrix) = skin.get(joint.index()) else { continue; };
            let pivot = joint.animated_transform().transform_point3(Vec3::ZERO);
            log::info!("  {:>12} {} pivot {pivot:?} skin {:?}", joint.name(), joint.index(), matrix.to_cols_array());
        }
    }

    log::debug!("{} clip(s) cached, {} purged", clips.len(), clips.purge_unused());
    Ok(())
}
