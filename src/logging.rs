use color_eyre::Result;
use log::LevelFilter;
use ratatui::style::{Color, Style, Stylize};
use ratatui::widgets::{Block, Borders};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

/// Overrides the level shown in the log panel, e.g. `debug` or `warn`.
pub const LOG_LEVEL_ENV: &str = "POLLEN_SEEKER_LOG";

/// Parses a level name, falling back to `Info`.
pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

pub fn level_from_env() -> LevelFilter {
    parse_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
}

/// Routes the `log` macros into tui-logger. Everything is captured; the
/// panel shows `level` and above.
pub fn setup_logging(level: LevelFilter) -> Result<()> {
    tui_logger::init_logger(LevelFilter::Trace)?;
    tui_logger::set_default_level(level);

    log::info!("Logger initialized at {}.", level);
    Ok(())
}

pub fn create_log_widget<'a>() -> TuiLoggerWidget<'a> {
    TuiLoggerWidget::default()
        .block(
            Block::default()
                .title("Robot log")
                .border_style(Style::default().fg(Color::White))
                .borders(Borders::ALL),
        )
        .output_separator('|')
        .output_timestamp(Some("%H:%M:%S%.3f".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style_error(Style::default().fg(Color::Red).bold())
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Green))
        .style_debug(Style::default().fg(Color::Blue))
        .style_trace(Style::default().fg(Color::Gray))
}
