/// Entry point and game loop.
///
/// Usage: `lodechase [LEVEL]` where LEVEL is a level number (looked up in
/// the configured levels directory) or a path to a level file. Without an
/// argument the built-in level is played.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use lodechase::config::SimConfig;
use lodechase::sim::event::SimEvent;
use lodechase::sim::level::load_world;
use lodechase::sim::runner::Command;
use lodechase::sim::step::step;
use lodechase::sim::world::{Phase, World};
use lodechase::ui::input::{InputState, Meta};
use lodechase::ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> ExitCode {
    env_logger::init();

    let config = SimConfig::load();
    let arg = std::env::args().nth(1);
    let mut world = match load_world(arg.as_deref(), &config) {
        Ok(world) => world,
        Err(e) => {
            log::error!("{e}");
            eprintln!("lodechase: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }
    let mut input = InputState::new();
    input.enable_release_events();

    let result = game_loop(&mut world, &mut renderer, &mut input, &config);

    if let Err(e) = input.restore() {
        eprintln!("Keyboard restore failed: {e}");
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => {
            println!("Gold collected: {}", world.runner.gold_collected);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("simulation stopped: {e}");
            eprintln!("lodechase: {e}");
            ExitCode::FAILURE
        }
    }
}

fn game_loop(
    world: &mut World,
    renderer: &mut Renderer,
    input: &mut InputState,
    config: &SimConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut pending_dig: Option<Command> = None;

    loop {
        input.drain_events();
        match input.meta() {
            Some(Meta::Quit) => break,
            Some(Meta::Restart) => world.restart(),
            None => {}
        }

        // Dig presses are edge-triggered; hold them until the next tick.
        if let Some(dig @ (Command::DigLeft | Command::DigRight)) = input.command() {
            pending_dig = Some(dig);
        }

        if last_tick.elapsed() >= tick_rate {
            if world.phase == Phase::Playing {
                let cmd = pending_dig.take().or_else(|| input.command());
                let events = step(world, cmd)?;
                log_events(&events);
            } else {
                pending_dig = None;
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn log_events(events: &[SimEvent]) {
    for event in events {
        match event {
            SimEvent::RunnerKilled => log::info!("runner killed"),
            SimEvent::LevelCleared => log::info!("level cleared"),
            other => log::trace!("{other:?}"),
        }
    }
}
