//! Lighting debug dump (F3 by default).
//!
//! Writes the last light sample, every sampled light, the current effect
//! values and process memory to `debug-dumps/lighting-<epoch>.txt`.
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use sysinfo::{Pid, PidExt, ProcessExt, System, SystemExt};

use crate::effects::{DepthOfField, ScreenEffects};
use crate::lighting::{LightIntensity, LightKind};
use crate::player::Player;
use crate::settings::Settings;

/// Where dumps are written.
#[derive(Resource, Clone, Debug)]
pub struct DebugDumpDir(pub PathBuf);

impl Default for DebugDumpDir {
    fn default() -> Self {
        Self(PathBuf::from("debug-dumps"))
    }
}

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugDumpDir>()
            .add_systems(Update, debug_dump_system);
    }
}

fn kb_to_mb(kb: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mb = kb as f64 / 1024.0;
    format!("{mb:.2} MB")
}

fn kind_label(kind: LightKind) -> &'static str {
    match kind {
        LightKind::Point => "point",
        LightKind::Spot => "spot",
        LightKind::Ambient => "ambient",
    }
}

/// Build the text of a lighting dump.
#[must_use]
pub fn lighting_report(
    intensity: &LightIntensity,
    screen: Option<&ScreenEffects>,
    dof: Option<&DepthOfField>,
) -> String {
    let mut out = String::new();
    let p = intensity.player_position;

    writeln!(out, "Player: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z).ok();
    writeln!(
        out,
        "Light intensity: {:.2} ({} contributing of {} sampled)",
        intensity.value,
        intensity.contributing,
        intensity.samples.len()
    )
    .ok();
    writeln!(out, "Sampler: {:?}", intensity.status).ok();

    writeln!(out, "\nLights:").ok();
    if intensity.samples.is_empty() {
        writeln!(out, "  (none)").ok();
    }
    for s in &intensity.samples {
        let contribution = s
            .contribution_at(p)
            .map_or_else(|| "-".to_string(), |c| format!("{c:.3}"));
        writeln!(
            out,
            "  {:<7} at ({:.1}, {:.1}, {:.1}) brightness={:.3} x{:.2} range={} enabled={} contribution={}",
            kind_label(s.kind),
            s.position.x,
            s.position.y,
            s.position.z,
            s.brightness,
            s.brightness_multiplier,
            if s.range.is_finite() { format!("{:.1}", s.range) } else { "inf".to_string() },
            s.enabled,
            contribution,
        )
        .ok();
    }

    writeln!(out, "\nEffects:").ok();
    match screen {
        Some(s) => {
            writeln!(
                out,
                "  saturation={:.3} sharpen={:.2} vignette={:.3} (round {:.2}, smooth {:.2}) grain={:.3} (response {:.2}) motion_blur={:.2}",
                s.saturation,
                s.sharpen,
                s.vignette.intensity,
                s.vignette.roundness,
                s.vignette.smoothness,
                s.film_grain.intensity,
                s.film_grain.response,
                s.motion_blur_scale,
            )
            .ok();
        }
        None => {
            writeln!(out, "  (no screen effects hook)").ok();
        }
    }
    match dof {
        Some(d) => {
            writeln!(
                out,
                "  depth_of_field enabled={} focal={:.2} blur={:.2}",
                d.enabled, d.focal_distance, d.blur_size
            )
            .ok();
        }
        None => {
            writeln!(out, "  (no depth of field hook)").ok();
        }
    }

    out
}

#[allow(clippy::needless_pass_by_value)]
fn debug_dump_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    dir: Res<DebugDumpDir>,
    diagnostics: Option<Res<DiagnosticsStore>>,
    intensity: Res<LightIntensity>,
    player: Query<(Option<&ScreenEffects>, Option<&DepthOfField>), With<Player>>,
) {
    if !keys.just_pressed(settings.controls.key_for("dump_debug", KeyCode::F3)) {
        return;
    }

    let now = SystemTime::now();
    let ts_secs = now.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
    let human_ts = DateTime::<Utc>::from(now).format("%Y-%m-%d %H:%M:%S");
    let fname = dir.0.join(format!("lighting-{ts_secs}.txt"));

    let fps = diagnostics
        .as_ref()
        .and_then(|d| d.get(&FrameTimeDiagnosticsPlugin::FPS))
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let mut sys = System::new();
    let pid = Pid::from_u32(std::process::id());
    sys.refresh_process(pid);
    sys.refresh_memory();
    let (proc_mem_kb, proc_virt_kb) = sys
        .process(pid)
        .map_or((0, 0), |p| (p.memory() / 1024, p.virtual_memory() / 1024));

    let (screen, dof) = player.get_single().unwrap_or((None, None));

    let mut out = String::new();
    writeln!(out, "Lighting dump: {human_ts} (epoch secs: {ts_secs})").ok();
    writeln!(out, "FPS: {fps:.1}").ok();
    writeln!(
        out,
        "Process memory: {} (virtual {})",
        kb_to_mb(proc_mem_kb),
        kb_to_mb(proc_virt_kb)
    )
    .ok();
    writeln!(out).ok();
    out.push_str(&lighting_report(&intensity, screen, dof));

    if let Err(e) = fs::create_dir_all(&dir.0) {
        error!("debug dump: failed to create dir '{}': {}", dir.0.display(), e);
        return;
    }
    if let Err(e) = fs::write(&fname, out) {
        error!("debug dump: failed to write {}: {}", fname.display(), e);
    } else {
        info!("wrote debug dump: {}", fname.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::LightSample;

    #[test]
    fn report_marks_out_of_range_lights() {
        let intensity = LightIntensity {
            value: 1.0,
            contributing: 1,
            samples: vec![
                LightSample::point(Vec3::ZERO, 1.0, 5.0),
                LightSample::spot(Vec3::new(50.0, 0.0, 0.0), 1.0, 5.0),
                LightSample::ambient(Vec3::Y, 0.2).disabled(),
            ],
            player_position: Vec3::ZERO,
            ..default()
        };
        let report = lighting_report(&intensity, Some(&ScreenEffects::default()), None);
        assert!(report.contains("Light intensity: 1.00 (1 contributing of 3 sampled)"));
        assert!(report.contains("contribution=1.000"));
        assert!(report.contains("range=inf enabled=false contribution=-"));
        assert!(report.contains("(no depth of field hook)"));
    }

    #[test]
    fn dump_is_written_on_key() {
        let dir = std::env::temp_dir().join(format!("gloom-dump-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut app = App::new();
        app.insert_resource(Settings::defaults())
            .insert_resource(DebugDumpDir(dir.clone()))
            .init_resource::<LightIntensity>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, debug_dump_system);
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::F3);
        app.update();

        let written: Vec<_> = fs::read_dir(&dir).unwrap().flatten().collect();
        assert_eq!(written.len(), 1);
        let text = fs::read_to_string(written[0].path()).unwrap();
        assert!(text.starts_with("Lighting dump:"));

        let _ = fs::remove_dir_all(&dir);
    }
}
