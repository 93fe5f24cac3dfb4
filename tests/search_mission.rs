use pollen_seeker::robot::config::{RoverConfig, SearchConfig};
use pollen_seeker::robot::{ControlLoop, Platform, Rover, StepOutcome, StopSignal};
use pollen_seeker::sim::flowers::{Flower, FlowerField};
use pollen_seeker::sim::{SimConfig, SimWorld};
use rand::rngs::StdRng;
use rand::SeedableRng;

const STEP_MS: u64 = 20;

fn mission(flowers: Vec<Flower>) -> ControlLoop<Rover<SimWorld>> {
    let config = SimConfig::default().ideal();
    let field = FlowerField::new(flowers, config.flower_regrow_ms);
    let world = SimWorld::with_flowers(config, field, StdRng::seed_from_u64(11), 5).unwrap();
    let rover = Rover::new(world, RoverConfig::default()).unwrap();
    ControlLoop::new(rover, SearchConfig::default()).unwrap()
}

fn tick(control: &mut ControlLoop<Rover<SimWorld>>, stop: &StopSignal) -> StepOutcome {
    control.platform_mut().hardware_mut().advance(STEP_MS);
    control.step(stop)
}

#[test]
fn empty_arena_widens_spiral_step_by_step() {
    let mut control = mission(Vec::new());
    let stop = StopSignal::new();
    let mut spiral_steps = Vec::new();

    for _ in 0..20_000 {
        let outcome = tick(&mut control, &stop);
        assert_ne!(outcome, StepOutcome::Faulted);
        assert_ne!(outcome, StepOutcome::ApproachedTarget);
        if let StepOutcome::Escalated { length } = outcome {
            spiral_steps.push(length);
        }

        let state = control.state();
        assert!(state.spin_count <= 5);
        assert_eq!(state.spiral_length as usize, spiral_steps.len() + 1);
        assert!((0.0..360.0).contains(&control.spin().total_angle()));
    }

    assert!(spiral_steps.len() >= 3, "only {} spiral steps", spiral_steps.len());
    let expected: Vec<u32> = (1..=spiral_steps.len() as u32).collect();
    assert_eq!(spiral_steps, expected);

    let world = control.platform().hardware();
    assert!(world.distance_travelled() > 1.0);
    assert!(world.turned_degrees() > 90.0);
}

#[test]
fn flower_ahead_is_approached_and_harvested() {
    let mut control = mission(vec![Flower::new(4.0, 1.5)]);
    let stop = StopSignal::new();

    let mut outcome = StepOutcome::Idle;
    for _ in 0..200 {
        outcome = tick(&mut control, &stop);
        if outcome != StepOutcome::Idle {
            break;
        }
    }

    assert_eq!(outcome, StepOutcome::ApproachedTarget);
    assert!(control.platform().have_pollen());
    let world = control.platform().hardware();
    assert!(world.carrying());
    assert!(world.pose().x > 3.8);
    assert!(!world.flowers()[0].has_pollen);

    assert!(matches!(
        tick(&mut control, &stop),
        StepOutcome::Spun {
            delivering: true,
            ..
        } | StepOutcome::ApproachedDrop
    ));
}

#[test]
fn stop_signal_halts_the_loop() {
    let mut control = mission(Vec::new());
    let stop = StopSignal::new();
    let remote = stop.clone();

    let handle = std::thread::spawn(move || {
        remote.trigger();
    });
    handle.join().unwrap();

    control.run(&stop);
    assert_eq!(tick(&mut control, &stop), StepOutcome::Cancelled);
}
