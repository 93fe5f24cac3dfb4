use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::fmt;

use crate::app::App;
use crate::logging;
use crate::sim::SimWorld;
use crate::ui::status;

const FLOOR: char = '.';
const DROP_ZONE: char = 'D';
const FLOWER: char = '*';
const HARVESTED: char = 'o';

/// Character grid of the arena, north up.
pub struct ArenaView {
    cells: Vec<Vec<char>>,
    carrying: bool,
}

impl ArenaView {
    pub fn new(world: &SimWorld, cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let config = world.config();
        let to_cell = |x: f64, y: f64| -> (usize, usize) {
            let col = (x / config.arena_width * cols as f64).floor() as isize;
            let row = ((config.arena_height - y) / config.arena_height * rows as f64).floor() as isize;
            (
                col.clamp(0, cols as isize - 1) as usize,
                row.clamp(0, rows as isize - 1) as usize,
            )
        };

        let mut cells = vec![vec![FLOOR; cols]; rows];

        let (zone_x, zone_y) = config.drop_zone;
        for (row, line) in cells.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let x = (col as f64 + 0.5) / cols as f64 * config.arena_width;
                let y = config.arena_height - (row as f64 + 0.5) / rows as f64 * config.arena_height;
                if (x - zone_x).hypot(y - zone_y) <= config.drop_zone_radius {
                    *cell = DROP_ZONE;
                }
            }
        }

        for flower in world.flowers() {
            let (col, row) = to_cell(flower.x, flower.y);
            cells[row][col] = if flower.has_pollen { FLOWER } else { HARVESTED };
        }

        let pose = world.pose();
        let (col, row) = to_cell(pose.x, pose.y);
        cells[row][col] = heading_glyph(pose.heading_degrees());

        Self {
            cells,
            carrying: world.carrying(),
        }
    }
}

impl fmt::Display for ArenaView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for &cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn heading_glyph(degrees: f64) -> char {
    match degrees.rem_euclid(360.0) {
        d if !(45.0..315.0).contains(&d) => '>',
        d if d < 135.0 => '^',
        d if d < 225.0 => '<',
        _ => 'v',
    }
}

pub fn render_app(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(10)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(40)])
        .split(rows[0]);

    render_arena(frame, top[0], app.world());
    status::render_status(frame, top[1], app);
    frame.render_widget(logging::create_log_widget(), rows[1]);
}

pub fn render_arena(frame: &mut Frame, area: Rect, world: &SimWorld) {
    let cols = usize::from(area.width.saturating_sub(2));
    let rows = usize::from(area.height.saturating_sub(2));
    let view = ArenaView::new(world, cols, rows);
    let lines = create_styled_lines(&view);
    frame.render_widget(create_arena_widget(lines), area);
}

fn create_styled_lines(view: &ArenaView) -> Vec<Line<'static>> {
    view.to_string()
        .lines()
        .map(|line| create_styled_line(line, view.carrying))
        .collect()
}

fn create_styled_line(line: &str, carrying: bool) -> Line<'static> {
    let spans: Vec<Span> = line
        .chars()
        .map(|c| create_styled_span(c, carrying))
        .collect();
    Line::from(spans)
}

fn create_styled_span(c: char, carrying: bool) -> Span<'static> {
    let style = match c {
        FLOOR => Style::default().fg(Color::DarkGray),
        DROP_ZONE => Style::default().fg(Color::Blue),
        FLOWER => Style::default().fg(Color::Magenta),
        HARVESTED => Style::default().fg(Color::Gray),
        _ if carrying => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    };
    Span::styled(c.to_string(), style)
}

fn create_arena_widget(lines: Vec<Line<'static>>) -> Paragraph<'static> {
    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Pollination Arena"),
    )
}
