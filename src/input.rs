use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Quit,
    Orbit { left: i32, up: i32 },
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleLabels,
    ToggleOrbits,
    SelectControl(usize),
    CycleControl(i32),
    Nudge(i32),
    ZeroSpeed,
    EditOpen,
    EditChar(char),
    EditBackspace,
    EditCommit,
    EditCancel,
    DragStart(u16, u16),
    Drag(u16, u16),
    DragEnd,
    Resize(u16, u16),
}

pub fn collect_events_nonblocking() -> anyhow::Result<Vec<Event>> {
    let mut out = Vec::new();
    while event::poll(Duration::from_millis(0))? {
        out.push(event::read()?);
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

pub fn map_event(editing: bool, ev: Event) -> Option<Action> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => map_key(editing, k),
        Event::Mouse(m) => match m.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Action::DragStart(m.column, m.row)),
            MouseEventKind::Drag(MouseButton::Left) => Some(Action::Drag(m.column, m.row)),
            MouseEventKind::Up(MouseButton::Left) => Some(Action::DragEnd),
            MouseEventKind::ScrollUp => Some(Action::ZoomIn),
            MouseEventKind::ScrollDown => Some(Action::ZoomOut),
            _ => None,
        },
        Event::Resize(w, h) => Some(Action::Resize(w, h)),
        _ => None,
    }
}

fn map_key(editing: bool, k: KeyEvent) -> Option<Action> {
    if k.modifiers.contains(KeyModifiers::CONTROL) && matches!(k.code, KeyCode::Char('c')) {
        return Some(Action::Quit);
    }

    if editing {
        return match k.code {
            KeyCode::Enter => Some(Action::EditCommit),
            KeyCode::Esc => Some(Action::EditCancel),
            KeyCode::Backspace => Some(Action::EditBackspace),
            KeyCode::Char(ch) if !ch.is_control() => Some(Action::EditChar(ch)),
            _ => None,
        };
    }

    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),

        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::Orbit { left: 1, up: 0 }),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Orbit { left: -1, up: 0 }),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::Orbit { left: 0, up: 1 }),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Orbit { left: 0, up: -1 }),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::ZoomIn),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::ZoomOut),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::ResetView),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(Action::ToggleLabels),
        KeyCode::Char('o') | KeyCode::Char('O') => Some(Action::ToggleOrbits),

        KeyCode::Char(c @ '1'..='8') => Some(Action::SelectControl(c as usize - '1' as usize)),
        KeyCode::Tab => Some(Action::CycleControl(1)),
        KeyCode::BackTab => Some(Action::CycleControl(-1)),
        KeyCode::Char('[') => Some(Action::Nudge(-1)),
        KeyCode::Char(']') => Some(Action::Nudge(1)),
        KeyCode::Char('{') => Some(Action::Nudge(-10)),
        KeyCode::Char('}') => Some(Action::Nudge(10)),
        KeyCode::Char('0') => Some(Action::ZeroSpeed),
        KeyCode::Enter => Some(Action::EditOpen),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn digits_select_controls() {
        assert_eq!(map_event(false, key(KeyCode::Char('1'))), Some(Action::SelectControl(0)));
        assert_eq!(map_event(false, key(KeyCode::Char('8'))), Some(Action::SelectControl(7)));
        assert_eq!(map_event(false, key(KeyCode::Char('9'))), None);
    }

    #[test]
    fn editing_captures_text_keys() {
        assert_eq!(map_event(true, key(KeyCode::Char('q'))), Some(Action::EditChar('q')));
        assert_eq!(map_event(true, key(KeyCode::Enter)), Some(Action::EditCommit));
        assert_eq!(map_event(true, key(KeyCode::Esc)), Some(Action::EditCancel));
        assert_eq!(map_event(false, key(KeyCode::Char('q'))), Some(Action::Quit));
    }

    #[test]
    fn mouse_maps_to_orbit_gestures() {
        let ev = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 4,
            row: 9,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(false, ev), Some(Action::Drag(4, 9)));
        let wheel = Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(false, wheel), Some(Action::ZoomOut));
    }

    #[test]
    fn resize_passes_through() {
        assert_eq!(map_event(false, Event::Resize(100, 30)), Some(Action::Resize(100, 30)));
    }
}
