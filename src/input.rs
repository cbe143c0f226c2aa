//! Terminal input to document events.

use crossterm::event::{Event, KeyEventKind, MouseButton, MouseEventKind};

use crate::constants::WHEEL_SCROLL_ROWS;
use crate::document::DocEvent;
use crate::geometry::Viewport;

/// A terminal event as the overlay host sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostInput {
    Doc(DocEvent),
    Resize(Viewport),
}

/// Translate a crossterm event. Right and middle clicks, mouse-up, key
/// releases, focus changes and paste are not part of the overlay contract.
pub fn translate(event: &Event) -> Option<HostInput> {
    let doc = match *event {
        Event::Key(key) if key.kind != KeyEventKind::Release => DocEvent::KeyDown(key),
        Event::Mouse(mouse) => {
            let (x, y) = (i32::from(mouse.column), i32::from(mouse.row));
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => DocEvent::PointerDown { x, y },
                MouseEventKind::Moved => DocEvent::PointerMove { x, y },
                MouseEventKind::ScrollDown => DocEvent::Scroll {
                    delta: WHEEL_SCROLL_ROWS,
                },
                MouseEventKind::ScrollUp => DocEvent::Scroll {
                    delta: -WHEEL_SCROLL_ROWS,
                },
                _ => return None,
            }
        }
        Event::Resize(width, height) => return Some(HostInput::Resize(Viewport::new(width, height))),
        _ => return None,
    };
    Some(HostInput::Doc(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn left_click_and_wheel_map_to_document_events() {
        assert_eq!(
            translate(&mouse(MouseEventKind::Down(MouseButton::Left), 4, 7)),
            Some(HostInput::Doc(DocEvent::PointerDown { x: 4, y: 7 }))
        );
        assert_eq!(
            translate(&mouse(MouseEventKind::ScrollUp, 0, 0)),
            Some(HostInput::Doc(DocEvent::Scroll {
                delta: -WHEEL_SCROLL_ROWS
            }))
        );
        assert_eq!(
            translate(&mouse(MouseEventKind::Down(MouseButton::Right), 4, 7)),
            None
        );
        assert_eq!(translate(&mouse(MouseEventKind::Up(MouseButton::Left), 4, 7)), None);
    }

    #[test]
    fn key_releases_are_dropped() {
        let press = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(
            translate(&Event::Key(press)),
            Some(HostInput::Doc(DocEvent::KeyDown(press)))
        );
        let mut release = press;
        release.kind = KeyEventKind::Release;
        assert_eq!(translate(&Event::Key(release)), None);
    }

    #[test]
    fn resize_reports_viewport() {
        assert_eq!(
            translate(&Event::Resize(100, 30)),
            Some(HostInput::Resize(Viewport::new(100, 30)))
        );
    }
}
