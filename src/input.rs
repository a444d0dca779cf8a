use crate::math::Vec2;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    DropFoodAt { col: u16, row: u16 },
    DropFoodAnywhere,
    PauseToggle,
    HudToggle,
    Redraw,
    Resize(u16, u16),
    Quit,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<Event>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        out.push(event::read()?);
        if out.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(ev: &Event) -> Option<Action> {
    match ev {
        Event::Mouse(m) => match m.kind {
            MouseEventKind::Down(MouseButton::Right) => Some(Action::DropFoodAt {
                col: m.column,
                row: m.row,
            }),
            _ => None,
        },
        Event::Key(k) if k.kind == KeyEventKind::Press => match k.code {
            KeyCode::Char('l') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Redraw),
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('f') | KeyCode::Char('F') => Some(Action::DropFoodAnywhere),
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Some(Action::PauseToggle),
            KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::HudToggle),
            _ => None,
        },
        Event::Resize(w, h) => Some(Action::Resize(*w, *h)),
        _ => None,
    }
}

/// Center of a terminal cell in tank coordinates.
pub(crate) fn cell_to_world(col: u16, row: u16, cols: u16, rows: u16, tank_w: f32, tank_h: f32) -> Vec2 {
    let nx = (col as f32 + 0.5) / (cols.max(1) as f32);
    let ny = (row as f32 + 0.5) / (rows.max(1) as f32);
    Vec2::new(nx * tank_w, ny * tank_h)
}
