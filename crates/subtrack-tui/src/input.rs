use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use subtrack_core::motion::{Clock, PointerEvent, PointerType, RowAction};

use crate::app::{App, Mode, SheetTab};

/// Pointer id used for the terminal mouse
pub const MOUSE_POINTER_ID: u32 = 1;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    ToggleSheet,
    CyclePeriod,
    CycleCategory,
    ShowTab(SheetTab),
    OpenRail,
    CloseRail,
    Row(RowAction),
    Refresh,
    Escape,
    Confirm,
    Cancel,
    PickNext,
    PickPrev,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event<C: Clock>(key: KeyEvent, app: &App<C>) -> Action {
    match app.mode {
        Mode::DeleteConfirm(_) | Mode::DisableConfirm(_) => return handle_confirm_mode(key),
        Mode::MovePick { .. } => return handle_pick_mode(key),
        Mode::Normal => {}
    }

    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Navigation within the list
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::MoveUp,
        (KeyCode::Down, KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Up, KeyModifiers::NONE) => Action::MoveUp,

        // Action rail
        (KeyCode::Char('h'), KeyModifiers::NONE) => Action::OpenRail,
        (KeyCode::Left, KeyModifiers::NONE) => Action::OpenRail,
        (KeyCode::Char('l'), KeyModifiers::NONE) => Action::CloseRail,
        (KeyCode::Right, KeyModifiers::NONE) => Action::CloseRail,
        (KeyCode::Char('e'), KeyModifiers::NONE) => Action::Row(RowAction::Edit),
        (KeyCode::Char('m'), KeyModifiers::NONE) => Action::Row(RowAction::Move),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Action::Row(RowAction::Disable),
        (KeyCode::Char('d'), KeyModifiers::NONE) => Action::Row(RowAction::Delete),

        // Stats sheet
        (KeyCode::Char('s'), KeyModifiers::NONE) => Action::ToggleSheet,
        (KeyCode::Char('p'), KeyModifiers::NONE) => Action::CyclePeriod,
        (KeyCode::Tab, KeyModifiers::NONE) => Action::CyclePeriod,
        (KeyCode::Char('1'), KeyModifiers::NONE) => Action::ShowTab(SheetTab::All),
        (KeyCode::Char('2'), KeyModifiers::NONE) => Action::ShowTab(SheetTab::ByCategory),

        // Category filter for the list and summary
        (KeyCode::Char('c'), KeyModifiers::NONE) => Action::CycleCategory,

        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Refresh,
        (KeyCode::Esc, KeyModifiers::NONE) => Action::Escape,

        _ => Action::None,
    }
}

/// Handle key events in confirmation mode
fn handle_confirm_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Action::Confirm,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Action::Cancel,
        _ => Action::None,
    }
}

/// Handle key events while choosing a category to move to
fn handle_pick_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => Action::PickNext,
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => Action::PickPrev,
        KeyCode::Enter | KeyCode::Char('y') => Action::Confirm,
        KeyCode::Esc | KeyCode::Char('n') => Action::Cancel,
        _ => Action::None,
    }
}

/// DOM-style button number
fn button_number(button: MouseButton) -> i16 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
    }
}

/// Translate a terminal mouse event into an engine pointer event
///
/// Columns become pixels through `cell_width_px`. Hover and wheel events
/// carry no gesture and map to `None`.
pub fn mouse_to_pointer(mouse: &MouseEvent, cell_width_px: f64) -> Option<PointerEvent> {
    let x = f64::from(mouse.column) * cell_width_px;
    let event = match mouse.kind {
        MouseEventKind::Down(button) => {
            PointerEvent::down(MOUSE_POINTER_ID, x).with_button(button_number(button))
        }
        MouseEventKind::Drag(_) => PointerEvent::moved(MOUSE_POINTER_ID, x),
        MouseEventKind::Up(_) => PointerEvent::up(MOUSE_POINTER_ID, x),
        _ => return None,
    };
    Some(event.with_type(PointerType::Mouse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use std::sync::Arc;
    use subtrack_core::motion::PointerKind;
    use subtrack_core::AppConfig;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_normal_mode_keys() {
        let app = App::new(Arc::new(AppConfig::default()), Theme::default());
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), &app), Action::Quit);
        assert_eq!(handle_key_event(key(KeyCode::Char('s')), &app), Action::ToggleSheet);
        assert_eq!(handle_key_event(key(KeyCode::Tab), &app), Action::CyclePeriod);
        assert_eq!(
            handle_key_event(key(KeyCode::Char('2')), &app),
            Action::ShowTab(SheetTab::ByCategory)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('x')), &app),
            Action::Row(RowAction::Disable)
        );
        assert_eq!(handle_key_event(key(KeyCode::Char('z')), &app), Action::None);
    }

    #[test]
    fn test_confirm_mode_keys() {
        let mut app = App::new(Arc::new(AppConfig::default()), Theme::default());
        app.mode = Mode::DeleteConfirm(4);
        assert_eq!(handle_key_event(key(KeyCode::Char('y')), &app), Action::Confirm);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &app), Action::Cancel);
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), &app), Action::None);

        app.mode = Mode::DisableConfirm(4);
        assert_eq!(handle_key_event(key(KeyCode::Enter), &app), Action::Confirm);
        assert_eq!(handle_key_event(key(KeyCode::Char('n')), &app), Action::Cancel);
    }

    #[test]
    fn test_category_keys() {
        let mut app = App::new(Arc::new(AppConfig::default()), Theme::default());
        assert_eq!(handle_key_event(key(KeyCode::Char('c')), &app), Action::CycleCategory);

        app.mode = Mode::MovePick { row_id: 1, choice: 0 };
        assert_eq!(handle_key_event(key(KeyCode::Char('j')), &app), Action::PickNext);
        assert_eq!(handle_key_event(key(KeyCode::Up), &app), Action::PickPrev);
        assert_eq!(handle_key_event(key(KeyCode::Enter), &app), Action::Confirm);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &app), Action::Cancel);
        assert_eq!(handle_key_event(key(KeyCode::Char('c')), &app), Action::None);
    }

    #[test]
    fn test_mouse_to_pointer() {
        let down = mouse_to_pointer(&mouse(MouseEventKind::Down(MouseButton::Left), 10), 12.0).unwrap();
        assert_eq!(down.kind, PointerKind::Down);
        assert_eq!(down.button, 0);
        assert_eq!(down.client_x, 120.0);
        assert_eq!(down.pointer_id, MOUSE_POINTER_ID);

        let right = mouse_to_pointer(&mouse(MouseEventKind::Down(MouseButton::Right), 10), 12.0).unwrap();
        assert_eq!(right.button, 2);

        let drag = mouse_to_pointer(&mouse(MouseEventKind::Drag(MouseButton::Left), 4), 12.0).unwrap();
        assert_eq!(drag.kind, PointerKind::Move);
        assert_eq!(drag.client_x, 48.0);

        let up = mouse_to_pointer(&mouse(MouseEventKind::Up(MouseButton::Left), 4), 12.0).unwrap();
        assert_eq!(up.kind, PointerKind::Up);

        assert!(mouse_to_pointer(&mouse(MouseEventKind::Moved, 4), 12.0).is_none());
        assert!(mouse_to_pointer(&mouse(MouseEventKind::ScrollDown, 4), 12.0).is_none());
    }
}
