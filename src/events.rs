use std::io;
use std::time::Duration;

use crossterm::event;
use crossterm::event::Event as CtEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use tracing::debug;
use tracing::info;

/// Input, reduced to what the application reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Normal termination was requested
    Quit,

    /// The user interrupted the application with `Ctrl+C`
    Interrupt,

    KeyDown(KeyEvent),

    MouseDown(MouseEvent),

    /// Anything else. Ignored.
    Other,
}

impl From<CtEvent> for Event {
    fn from(event: CtEvent) -> Self {
        match event {
            CtEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => match key_event {
                KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers,
                    ..
                } if modifiers.contains(KeyModifiers::CONTROL) => Event::Interrupt,
                KeyEvent {
                    code: KeyCode::Char('q') | KeyCode::Esc,
                    ..
                } => Event::Quit,
                key_event => Event::KeyDown(key_event),
            },
            CtEvent::Mouse(
                mouse_event @ MouseEvent {
                    kind: MouseEventKind::Down(_),
                    ..
                },
            ) => Event::MouseDown(mouse_event),
            _ => Event::Other,
        }
    }
}

/// How the application came to a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    Quit,
    Interrupted,
}

impl Shutdown {
    pub const fn exit_code(self) -> u8 {
        match self {
            Shutdown::Quit => 0,
            // 128 + SIGINT, as shells report it
            Shutdown::Interrupted => 130,
        }
    }
}

/// Receives the key and mouse presses forwarded by [`dispatch`]
pub trait InputHandler {
    fn handle_key(&mut self, key: KeyEvent);

    fn handle_mouse(&mut self, mouse: MouseEvent);
}

/// Route a single event. Returns the reason to stop, if the event asks for one.
pub fn dispatch<H: InputHandler>(event: Event, handler: &mut H) -> Option<Shutdown> {
    match event {
        Event::Quit => {
            info!("Quit requested");
            Some(Shutdown::Quit)
        }
        Event::Interrupt => {
            info!("Interrupt received");
            Some(Shutdown::Interrupted)
        }
        Event::KeyDown(key) => {
            debug!(?key, "Key pressed");
            handler.handle_key(key);
            None
        }
        Event::MouseDown(mouse) => {
            debug!(?mouse, "Mouse pressed");
            handler.handle_mouse(mouse);
            None
        }
        Event::Other => None,
    }
}

/// Where events for a tick come from
pub trait EventSource {
    /// Everything pending right now. Never blocks waiting for input.
    fn drain(&mut self) -> io::Result<Vec<Event>>;
}

/// Events read from the controlling terminal
#[derive(Default)]
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn drain(&mut self) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();

        while event::poll(Duration::ZERO)? {
            events.push(Event::from(event::read()?));
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::MouseButton;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        keys: Vec<KeyEvent>,
        mice: Vec<MouseEvent>,
    }

    impl InputHandler for Recorder {
        fn handle_key(&mut self, key: KeyEvent) {
            self.keys.push(key);
        }

        fn handle_mouse(&mut self, mouse: MouseEvent) {
            self.mice.push(mouse);
        }
    }

    fn press(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn quit_stops_with_zero() {
        let mut recorder = Recorder::default();
        let shutdown = dispatch(Event::Quit, &mut recorder);

        assert_eq!(shutdown, Some(Shutdown::Quit));
        assert_eq!(shutdown.map(Shutdown::exit_code), Some(0));
        assert!(recorder.keys.is_empty() && recorder.mice.is_empty());
    }

    #[test]
    fn interrupt_has_distinct_code() {
        let shutdown = dispatch(Event::Interrupt, &mut Recorder::default());

        assert_eq!(shutdown, Some(Shutdown::Interrupted));
        assert_ne!(Shutdown::Interrupted.exit_code(), Shutdown::Quit.exit_code());
    }

    #[test]
    fn key_reaches_key_handler_only() {
        let mut recorder = Recorder::default();
        let key = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);

        assert_eq!(dispatch(Event::KeyDown(key), &mut recorder), None);
        assert_eq!(recorder.keys, vec![key]);
        assert!(recorder.mice.is_empty());
    }

    #[test]
    fn mouse_reaches_mouse_handler_only() {
        let mut recorder = Recorder::default();
        let mouse = press(MouseEventKind::Down(MouseButton::Left));

        assert_eq!(dispatch(Event::MouseDown(mouse), &mut recorder), None);
        assert_eq!(recorder.mice, vec![mouse]);
        assert!(recorder.keys.is_empty());
    }

    #[test]
    fn other_is_ignored() {
        let mut recorder = Recorder::default();

        assert_eq!(dispatch(Event::Other, &mut recorder), None);
        assert!(recorder.keys.is_empty() && recorder.mice.is_empty());
    }

    #[test]
    fn converts_terminal_events() {
        let key = |code, modifiers| CtEvent::Key(KeyEvent::new(code, modifiers));

        assert_eq!(Event::from(key(KeyCode::Char('q'), KeyModifiers::NONE)), Event::Quit);
        assert_eq!(Event::from(key(KeyCode::Esc, KeyModifiers::NONE)), Event::Quit);
        assert_eq!(
            Event::from(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Event::Interrupt
        );
        assert_eq!(
            Event::from(key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Event::KeyDown(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE))
        );

        let release =
            KeyEvent::new_with_kind(KeyCode::Char('n'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(Event::from(CtEvent::Key(release)), Event::Other);

        let down = press(MouseEventKind::Down(MouseButton::Right));
        assert_eq!(Event::from(CtEvent::Mouse(down)), Event::MouseDown(down));
        assert_eq!(Event::from(CtEvent::Mouse(press(MouseEventKind::Moved))), Event::Other);
        assert_eq!(
            Event::from(CtEvent::Mouse(press(MouseEventKind::Up(MouseButton::Left)))),
            Event::Other
        );
        assert_eq!(Event::from(CtEvent::Resize(80, 24)), Event::Other);
        assert_eq!(Event::from(CtEvent::FocusLost), Event::Other);
    }
}
