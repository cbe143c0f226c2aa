use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Single-threaded pump that feeds terminal input to the overlay host.
///
/// The handler is called with `None` once per iteration before input is
/// read. That call is where timers (search debounce, log tail) are polled
/// and the frame is drawn. Each available event is then passed as
/// `Some(event)`; bursts are drained before the next tick.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if handler(&mut self.driver, None)? == ControlFlow::Quit {
                return Ok(());
            }
            if self.driver.poll(self.poll_interval)? {
                loop {
                    let event = self.driver.read()?;
                    if handler(&mut self.driver, Some(event))? == ControlFlow::Quit {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedInputDriver;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn drains_burst_between_ticks_and_stops_on_quit() {
        let key = |c| Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        let driver = ScriptedInputDriver::new([key('a'), key('b'), key('q')]);
        let mut event_loop = EventLoop::new(driver, Duration::ZERO);
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                seen.push(event.clone());
                Ok(match event {
                    Some(Event::Key(k)) if k.code == KeyCode::Char('q') => ControlFlow::Quit,
                    _ => ControlFlow::Continue,
                })
            })
            .unwrap();
        assert_eq!(seen, vec![None, Some(key('a')), Some(key('b')), Some(key('q'))]);
        assert_eq!(event_loop.driver().remaining(), 0);
    }

    #[test]
    fn idle_loop_keeps_ticking() {
        let mut event_loop = EventLoop::new(ScriptedInputDriver::default(), Duration::ZERO);
        let mut ticks = 0;
        event_loop
            .run(|_, event| {
                assert!(event.is_none());
                ticks += 1;
                Ok(if ticks == 3 {
                    ControlFlow::Quit
                } else {
                    ControlFlow::Continue
                })
            })
            .unwrap();
        assert_eq!(ticks, 3);
    }
}
