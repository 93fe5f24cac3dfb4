use pollen_seeker::{app::App, logging, terminal::TerminalManager, ui::render_app};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::Backend, Terminal};
use std::time::{Duration, Instant};

const WORLD_SEED: u64 = 45;
const SLIP_SEED: u32 = 34;

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::setup_logging(logging::level_from_env())?;

    log::info!("Application starting...");

    let mut app = App::new(WORLD_SEED, SLIP_SEED)?;
    let mut terminal_manager = TerminalManager::new()?;

    run_app(&mut app, terminal_manager.get_terminal())?;

    log::info!("Application stopped.");
    Ok(())
}

fn run_app<B: Backend>(app: &mut App, terminal: &mut Terminal<B>) -> Result<()> {
    let mut last_update = Instant::now();
    let tick_rate = Duration::from_millis(100);

    while !app.should_quit() {
        // Update app state at regular intervals
        let now = Instant::now();
        if now.duration_since(last_update) >= tick_rate {
            app.update();
            last_update = now;
        }

        terminal.draw(|frame| {
            let area = frame.area();
            render_app(frame, area, app);
        })?;

        let timeout = tick_rate.saturating_sub(last_update.elapsed());
        handle_input(app, timeout)?;
    }
    Ok(())
}

fn handle_input(app: &mut App, timeout: Duration) -> Result<()> {
    if !event::poll(timeout)? {
        return Ok(());
    }
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
            KeyCode::Char(' ') => app.toggle_pause(),
            _ => {}
        }
    }
    Ok(())
}
