use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::mission::MissionEventKind;
use crate::robot::{Platform, StepOutcome};

const RECENT_EVENTS: usize = 4;

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<14}"), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

pub fn outcome_label(outcome: StepOutcome) -> String {
    match outcome {
        StepOutcome::Cancelled => "stopped".to_string(),
        StepOutcome::Idle => "waiting on timer".to_string(),
        StepOutcome::Danced => "danced".to_string(),
        StepOutcome::ApproachedTarget => "approached flower".to_string(),
        StepOutcome::ApproachedDrop => "approached drop zone".to_string(),
        StepOutcome::Spun {
            rotation_completed: true,
            ..
        } => "spin (full turn)".to_string(),
        StepOutcome::Spun { .. } => "spin".to_string(),
        StepOutcome::Escalated { length } => format!("spiral step {length}s"),
        StepOutcome::Faulted => "actuator fault".to_string(),
    }
}

fn event_label(kind: MissionEventKind) -> String {
    match kind {
        MissionEventKind::Pickup => "pickup".to_string(),
        MissionEventKind::Delivery => "delivery".to_string(),
        MissionEventKind::SpiralStep { length } => format!("spiral {length}s"),
        MissionEventKind::Dance => "dance".to_string(),
        MissionEventKind::Fault => "fault".to_string(),
    }
}

pub fn status_lines(app: &App) -> Vec<Line<'static>> {
    let control = &app.control;
    let world = app.world();
    let state = control.state();

    let (mode, mode_color) = if control.platform().have_pollen() {
        ("DELIVER", Color::Yellow)
    } else {
        ("SEARCH", Color::Cyan)
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<14}", "Mode"), Style::default().fg(Color::Gray)),
            Span::styled(
                mode,
                Style::default().fg(mode_color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(if app.paused { "  (paused)" } else { "" }),
        ]),
        row("Spiral length", format!("{}", state.spiral_length)),
        row(
            "Spin count",
            format!("{} / {}", state.spin_count, control.config().escalation_threshold),
        ),
        row("Est. angle", format!("{:.0}°", control.spin().total_angle())),
        row("Heading", format!("{:.0}°", world.pose().heading_degrees())),
        row("Turned", format!("{:.0}°", world.turned_degrees())),
        row("Travelled", format!("{:.2} m", world.distance_travelled())),
        row("Robot time", format!("{:.1} s", world_time_s(app))),
        row(
            "Delivered",
            format!("{} (spilled {})", world.delivered(), world.spilled()),
        ),
        row("Last step", outcome_label(app.last_outcome)),
        Line::from(""),
    ];

    for event in app.mission.recent(RECENT_EVENTS) {
        lines.push(row(
            &event.timestamp.format("%H:%M:%S").to_string(),
            event_label(event.kind),
        ));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "q quit  space pause",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn world_time_s(app: &App) -> f64 {
    app.control.platform().now_ms() as f64 / 1000.0
}

pub fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let widget = Paragraph::new(status_lines(app))
        .block(Block::default().borders(Borders::ALL).title("Search state"));
    frame.render_widget(widget, area);
}
