use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_app::ScheduleRunnerPlugin;
use bevy_log::info;
use bevy_rapier3d::prelude::*;
use shared::physics::rapier::apply_buoyancy_forces;
use shared::physics::{BuoyancyPlugin, OceanWaves, ShipBuoyancy, ShipPhysicsBundle};
use std::path::Path;
use std::time::Duration;

use crate::scenario::ScenarioConfig;

/// Options of one headless run.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimSettings {
    /// Fixed steps per simulated second
    pub tick_rate: f64,
    /// Stop after this many fixed steps (None = run forever)
    pub max_ticks: Option<u64>,
    /// Log every ship every N ticks (0 = never)
    pub log_every: u64,
}

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct TickCounter(pub u64);

#[derive(Component, Debug, Clone)]
pub struct ShipName(pub String);

/// Build the app for `scenario` without running it.
///
/// Every configuration error (waves, hulls, force constants) surfaces here,
/// before the first tick.
pub fn build_app(
    scenario: &ScenarioConfig,
    base_dir: &Path,
    settings: SimSettings,
) -> Result<App, Box<dyn std::error::Error>> {
    let waves = scenario.wave_config().build()?;
    let mut ships = Vec::with_capacity(scenario.ships.len());
    for ship in &scenario.ships {
        ships.push((ship, ship.build_buoyancy(base_dir)?));
    }

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / settings.tick_rate,
        ))),
    );
    app.add_plugins(TransformPlugin);
    app.add_plugins(BuoyancyPlugin);

    app.insert_resource(Time::<Fixed>::from_hz(settings.tick_rate));
    app.insert_resource(TimestepMode::Fixed {
        dt: (1.0 / settings.tick_rate) as f32,
        substeps: 1,
    });
    app.insert_resource(OceanWaves(waves));
    app.insert_resource(settings);
    app.init_resource::<TickCounter>();

    for (config, buoyancy) in ships {
        let mut bundle = ShipPhysicsBundle::new(buoyancy, config.half_extents, config.mass);
        bundle.velocity = Velocity::linear(config.linear_velocity);
        app.world_mut().spawn((
            ShipName(config.name.clone()),
            Transform::from_translation(config.position).with_rotation(config.rotation),
            bundle,
        ));
    }

    app.add_systems(
        FixedUpdate,
        (count_ticks, log_ships, stop_after_max_ticks)
            .chain()
            .after(apply_buoyancy_forces),
    );

    Ok(app)
}

pub fn init(scenario: ScenarioConfig, base_dir: &Path, settings: SimSettings) {
    let mut app = match build_app(&scenario, base_dir, settings) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Invalid scenario: {err}");
            std::process::exit(1);
        }
    };
    app.add_plugins(bevy_log::LogPlugin::default());

    info!(
        "Starting simulation: {} ships at {} Hz",
        scenario.ships.len(),
        settings.tick_rate
    );

    app.run();
}

fn count_ticks(mut counter: ResMut<TickCounter>) {
    counter.0 += 1;
}

fn log_ships(
    counter: Res<TickCounter>,
    settings: Res<SimSettings>,
    ships: Query<(&ShipName, &Transform, &Velocity, &ShipBuoyancy)>,
) {
    if settings.log_every == 0 || counter.0 % settings.log_every != 0 {
        return;
    }

    for (name, transform, velocity, buoyancy) in ships.iter() {
        let (yaw, pitch, roll) = transform.rotation.to_euler(EulerRot::YXZ);
        let slamming = buoyancy
            .sample_states()
            .iter()
            .filter(|state| state.slamming)
            .count();
        info!(
            "[tick {}] {}: pos=({:.2}, {:.2}, {:.2}) vel.y={:.2} ypr=({:.1}, {:.1}, {:.1}) submerged={:.0}% slamming={}",
            counter.0,
            name.0,
            transform.translation.x,
            transform.translation.y,
            transform.translation.z,
            velocity.linvel.y,
            yaw.to_degrees(),
            pitch.to_degrees(),
            roll.to_degrees(),
            buoyancy.submerged_fraction() * 100.0,
            slamming
        );
    }
}

fn stop_after_max_ticks(
    counter: Res<TickCounter>,
    settings: Res<SimSettings>,
    mut ev_app_exit: EventWriter<AppExit>,
) {
    if settings.max_ticks.is_some_and(|max| counter.0 >= max) {
        info!("Reached {} ticks, stopping", counter.0);
        ev_app_exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ShipConfig;
    use bevy::time::TimeUpdateStrategy;
    use shared::water::WavePreset;

    fn still_water_app(ships: Vec<ShipConfig>) -> App {
        let scenario = ScenarioConfig {
            preset: Some(WavePreset::Still),
            ships,
            ..Default::default()
        };
        let settings = SimSettings {
            tick_rate: 50.0,
            max_ticks: None,
            log_every: 0,
        };
        let mut app = build_app(&scenario, Path::new("."), settings).unwrap();
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)));
        app
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        let mut scenario = ScenarioConfig::default();
        scenario.ships[0].buoyancy.gravity = -1.0;
        let settings = SimSettings {
            tick_rate: 50.0,
            max_ticks: Some(1),
            log_every: 0,
        };
        assert!(build_app(&scenario, Path::new("."), settings).is_err());
    }

    #[test]
    fn test_ships_are_spawned() {
        let mut app = still_water_app(ScenarioConfig::default().ships);
        let world = app.world_mut();
        let names: Vec<String> = world
            .query::<&ShipName>()
            .iter(world)
            .map(|name| name.0.clone())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"skiff".to_string()));
        assert!(names.contains(&"barge".to_string()));
    }

    #[test]
    fn test_dropped_ship_floats() {
        let mut app = still_water_app(vec![ShipConfig {
            position: Vec3::new(0.0, 2.0, 0.0),
            hull: crate::scenario::HullSource::Cuboid { resolution: 6 },
            ..Default::default()
        }]);

        for _ in 0..600 {
            app.update();
        }

        assert!(app.world().resource::<TickCounter>().0 > 0);
        let world = app.world_mut();
        let (transform, buoyancy) = world
            .query::<(&Transform, &ShipBuoyancy)>()
            .single(world)
            .unwrap();
        assert!(transform.translation.is_finite());
        assert!(
            transform.translation.y < 1.0 && transform.translation.y > -1.0,
            "ship should settle near the surface, got y={}",
            transform.translation.y
        );
        assert!(buoyancy.submerged_fraction() > 0.0);
    }
}
