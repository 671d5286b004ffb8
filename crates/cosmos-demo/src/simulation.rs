//! Headless run of the particle background: picks a profile from the
//! configured device, drives the engine through a frame loop and stands in
//! for the renderer by consuming upload flags.

use std::error::Error;

use cosmos_config::Config;
use cosmos_particles::motion::REFERENCE_FRAME_DT;
use cosmos_particles::{
    DeviceCapabilities, DeviceClass, DeviceProfile, FrameLoop, FrameStatus, NebulaMotion,
    ParticleError, ParticleFieldEngine, QualityThresholds, QualityTrigger,
};
use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// What happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub class: DeviceClass,
    pub points: usize,
    pub ticks: u64,
    pub elapsed: f64,
    pub uploads: usize,
    pub camera: Vec3,
    pub last_fps: Option<u32>,
    pub trigger: Option<QualityTrigger>,
    pub narrow_viewport: bool,
    pub viewport: (u32, u32),
}

/// Device facts from the config.
pub fn capabilities(config: &Config) -> DeviceCapabilities {
    DeviceCapabilities {
        user_agent: config.device.user_agent.clone(),
        hardware_concurrency: config.device.hardware_concurrency,
        device_pixel_ratio: config.display.device_pixel_ratio,
    }
}

/// Choose the profile to run with, or `None` when the device should get no
/// background at all.
pub fn select_profile(config: &Config) -> Result<Option<DeviceProfile>, ParticleError> {
    if let Some(name) = &config.device.force_class {
        let class: DeviceClass = name.parse()?;
        debug!("Device class forced to {class}");
        return Ok(Some(DeviceProfile::for_class(
            class,
            config.display.device_pixel_ratio,
        )));
    }

    let capabilities = capabilities(config);
    if capabilities.should_skip_background() {
        warn!("Device too constrained for the particle background, skipping");
        return Ok(None);
    }
    if capabilities.is_constrained() {
        warn!("Some visual effects are disabled on this device");
    }
    Ok(Some(DeviceProfile::select(&capabilities)))
}

/// Synthetic pointer offset from the viewport centre at `elapsed` seconds.
pub fn pointer_at(elapsed: f64, sweep: f32) -> Vec2 {
    let t = elapsed as f32;
    Vec2::new((t * 0.7).sin(), (t * 0.4).cos()) * sweep
}

/// Clear every upload flag, returning how many buffers were "uploaded".
fn upload_dirty(engine: &mut ParticleFieldEngine) -> usize {
    let mut uploaded = 0;
    let field = engine.field_mut();
    let layers = [&mut field.star_field, &mut field.spiral, &mut field.dust]
        .into_iter()
        .flatten()
        .chain(field.nebulae.iter_mut().map(|n| &mut n.layer));
    for layer in layers {
        if layer.cloud.needs_upload() {
            layer.cloud.mark_uploaded();
            uploaded += 1;
        }
    }
    if let Some(floating) = &mut field.floating {
        let cloud = floating.particles.cloud_mut();
        if cloud.needs_upload() {
            cloud.mark_uploaded();
            uploaded += 1;
        }
    }
    for burst in engine.bursts_mut() {
        let cloud = &mut burst.layer_mut().cloud;
        if cloud.needs_upload() {
            cloud.mark_uploaded();
            uploaded += 1;
        }
    }
    uploaded
}

/// Run the configured number of frames. Returns `None` if the background was
/// skipped for this device.
pub fn run(config: &Config) -> Result<Option<RunSummary>, Box<dyn Error>> {
    let Some(profile) = select_profile(config)? else {
        return Ok(None);
    };
    let class = profile.class;
    let motion: NebulaMotion = config.simulation.nebula_motion.parse()?;

    let mut rng = match config.simulation.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };

    let thresholds = QualityThresholds {
        low_fps: config.performance.low_fps_threshold,
        memory_limit_mb: config.performance.memory_limit_mb,
    };
    let mut engine = ParticleFieldEngine::new(profile, &mut rng)?
        .with_nebula_motion(motion)
        .with_quality_thresholds(thresholds);

    let narrow_viewport = config
        .display
        .is_narrow(config.performance.narrow_viewport_width);
    if narrow_viewport {
        engine.reduce_for_narrow_viewport();
    }

    let total = config.simulation.frames;
    let burst_at = config.simulation.burst_at_frame;
    let memory_sample = config.performance.simulated_memory_mb;
    let sweep = config.simulation.pointer_sweep;

    // Initial upload of every generated buffer.
    let mut uploads = upload_dirty(&mut engine);
    let mut trigger = None;
    let mut frame = 0u32;
    let mut frames = FrameLoop::new();

    while !frames.is_cancelled() {
        frames.advance(REFERENCE_FRAME_DT, |dt, elapsed| {
            if frame >= total {
                engine.stop();
            }
            if burst_at == Some(frame) {
                engine.trigger_burst(elapsed, &mut rng);
            }
            if frame == total / 2 {
                if let Some(used_mb) = memory_sample {
                    trigger = trigger.or(engine.record_memory_usage(used_mb));
                }
            }

            let Some(_update) = engine.tick(dt, elapsed, pointer_at(elapsed, sweep)) else {
                return FrameStatus::Stopped;
            };
            uploads += upload_dirty(&mut engine);
            trigger = trigger.or(engine.record_frame(elapsed));
            frame += 1;
            FrameStatus::Continue
        });
    }

    let summary = RunSummary {
        class,
        points: engine.field().point_count(),
        ticks: engine.ticks(),
        elapsed: frames.elapsed(),
        uploads,
        camera: engine.camera().position(),
        last_fps: engine.last_fps(),
        trigger,
        narrow_viewport,
        viewport: (config.display.viewport_width, config.display.viewport_height),
    };
    info!(
        "Simulated {} frames ({:.2}s) of {} points on {} at {}x{}",
        summary.ticks,
        summary.elapsed,
        summary.points,
        summary.class,
        summary.viewport.0,
        summary.viewport.1
    );
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_IOS: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 12_4 like Mac OS X) AppleWebKit/605.1.15";

    fn config(frames: u32) -> Config {
        let mut config = Config::default();
        config.simulation.frames = frames;
        config.simulation.seed = Some(11);
        config.device.force_class = Some("legacy".to_string());
        config
    }

    #[test]
    fn test_pointer_sweep_is_bounded() {
        for i in 0..500 {
            let p = pointer_at(i as f64 * 0.1, 300.0);
            assert!(p.abs().max_element() <= 300.0 + 1e-3, "pointer out of range: {p}");
        }
    }

    #[test]
    fn test_forced_class_wins() {
        let profile = select_profile(&config(1)).unwrap().unwrap();
        assert_eq!(profile.class, DeviceClass::LegacyMobile);

        let mut bad = config(1);
        bad.device.force_class = Some("tablet".to_string());
        assert!(select_profile(&bad).is_err());
    }

    #[test]
    fn test_constrained_legacy_device_is_skipped() {
        let mut config = Config::default();
        config.device.user_agent = LEGACY_IOS.to_string();
        config.device.hardware_concurrency = 1;
        assert!(select_profile(&config).unwrap().is_none());
        assert!(run(&config).unwrap().is_none());
    }

    #[test]
    fn test_run_ticks_requested_frames() {
        let summary = run(&config(30)).unwrap().unwrap();
        assert_eq!(summary.ticks, 30);
        assert!((summary.elapsed - 31.0 * REFERENCE_FRAME_DT).abs() < 1e-9);
        assert!(summary.uploads >= 30, "floating buffer uploads every frame");
        assert!(!summary.narrow_viewport);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = run(&config(20)).unwrap().unwrap();
        let b = run(&config(20)).unwrap().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_memory_sample_triggers_optimization() {
        let mut config = config(10);
        config.performance.simulated_memory_mb = Some(250.0);
        let summary = run(&config).unwrap().unwrap();
        assert_eq!(summary.trigger, Some(QualityTrigger::MemoryPressure(250.0)));
    }

    #[test]
    fn test_narrow_viewport_is_reported() {
        let mut config = config(5);
        config.display.viewport_width = 375;
        config.display.viewport_height = 812;
        config.simulation.burst_at_frame = Some(2);
        let summary = run(&config).unwrap().unwrap();
        assert!(summary.narrow_viewport);
        assert_eq!(summary.viewport, (375, 812));
        assert_eq!(summary.ticks, 5);
    }

    #[test]
    fn test_unknown_nebula_motion_is_an_error() {
        let mut config = config(5);
        config.simulation.nebula_motion = "spin".to_string();
        assert!(run(&config).is_err());
    }
}
