use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace};

use crate::controller::{Controller, ControllerError, EventOutcome};
use crate::page::{EventTarget, Page};
use crate::utils::{throttle, Key, Throttled};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EventParseError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' expects {expected}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },
}

/// One line of an event script.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Click { id: String },
    Key { key: Key, id: String },
    Scroll { dy: f64 },
    Wait { duration: Duration },
    Quit,
}

/// Parses a single script line; blank lines and `#` comments give `None`.
pub fn parse_command(line_no: usize, raw: &str) -> Result<Option<Command>, EventParseError> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let missing = |command: &'static str, expected: &'static str| EventParseError::MissingArgument {
        line: line_no,
        command,
        expected,
    };
    let number = |value: &str| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| EventParseError::InvalidNumber {
                line: line_no,
                value: value.to_string(),
            })
    };

    let parsed = match command.as_str() {
        "click" => {
            let id = args.first().ok_or_else(|| missing("click", "an element id"))?;
            Command::Click { id: id.to_string() }
        }
        "key" | "keydown" => {
            let (key, id) = match args.as_slice() {
                [key, id, ..] => (key, id),
                _ => return Err(missing("key", "a key name and an element id")),
            };
            Command::Key {
                key: Key::parse(key),
                id: id.to_string(),
            }
        }
        "scroll" => {
            let dy = args.first().ok_or_else(|| missing("scroll", "a pixel offset"))?;
            Command::Scroll { dy: number(*dy)? }
        }
        "wait" | "sleep" => {
            let ms = args.first().ok_or_else(|| missing("wait", "milliseconds"))?;
            let ms = number(*ms)?;
            if ms < 0.0 {
                return Err(EventParseError::InvalidNumber {
                    line: line_no,
                    value: ms.to_string(),
                });
            }
            Command::Wait {
                duration: Duration::from_micros((ms * 1000.0).round() as u64),
            }
        }
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(EventParseError::UnknownCommand {
                line: line_no,
                command: other.to_string(),
            })
        }
    };
    Ok(Some(parsed))
}

pub fn parse_script(contents: &str) -> Result<Vec<Command>, EventParseError> {
    let mut out = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if let Some(command) = parse_command(idx + 1, line)? {
            out.push(command);
        }
    }
    Ok(out)
}

/// Events as the page delivers them to its listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    Click { target: EventTarget },
    KeyDown { target: EventTarget, key: Key },
    Scroll,
}

type ScrollHandler<P> = fn(&mut Controller<P>);

/// Routes page events to the controller. Scroll events go through a
/// throttle, so a burst of them renders at most once per interval plus one
/// trailing run.
pub struct EventDispatcher<P: Page> {
    controller: Controller<P>,
    on_scroll: Throttled<ScrollHandler<P>>,
}

impl<P: Page> EventDispatcher<P> {
    pub fn new(controller: Controller<P>) -> Self {
        let interval = controller.settings().scroll_timeout;
        let handler: ScrollHandler<P> = Controller::on_scroll;
        Self {
            controller,
            on_scroll: throttle(handler, interval),
        }
    }

    pub fn controller(&self) -> &Controller<P> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<P> {
        &mut self.controller
    }

    pub fn into_controller(self) -> Controller<P> {
        self.controller
    }

    pub fn dispatch(&mut self, event: PageEvent, now: Instant) -> Result<EventOutcome, ControllerError> {
        trace!(?event, "dispatching");
        match event {
            PageEvent::Click { target } => self.controller.on_filter_click(&target),
            PageEvent::KeyDown { target, key } => self.controller.on_filter_keydown(&target, &key),
            PageEvent::Scroll => {
                let ran = self.on_scroll.call(now, &mut self.controller);
                if !ran {
                    debug!("scroll throttled");
                }
                Ok(EventOutcome {
                    handled: ran,
                    default_prevented: false,
                })
            }
        }
    }

    /// Instant at which a throttled scroll is due to run.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.on_scroll.deadline()
    }

    // runs the trailing scroll call once its window has closed
    pub fn flush(&mut self, now: Instant) -> bool {
        self.on_scroll.flush(now, &mut self.controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, FILTER_CLASSNAME};
    use crate::filter::FilterType;
    use crate::host::Host;
    use crate::page::{Geometry, MemoryPage};

    #[test]
    fn parses_a_script() {
        let script = "# warm up\nclick filter-cheapest\n\nkey Enter filter-all\nscroll 250\nwait 120\nquit\n";
        let commands = parse_script(script).unwrap();
        assert_eq!(
            commands,
            vec![
                Command::Click {
                    id: "filter-cheapest".to_string()
                },
                Command::Key {
                    key: Key::Enter,
                    id: "filter-all".to_string()
                },
                Command::Scroll { dy: 250.0 },
                Command::Wait {
                    duration: Duration::from_millis(120)
                },
                Command::Quit,
            ]
        );
    }

    #[test]
    fn rejects_bad_lines_with_their_line_number() {
        assert_eq!(
            parse_script("click a\nhover a\n").unwrap_err(),
            EventParseError::UnknownCommand {
                line: 2,
                command: "hover".to_string()
            }
        );
        assert!(matches!(
            parse_command(3, "scroll far"),
            Err(EventParseError::InvalidNumber { line: 3, .. })
        ));
        assert!(matches!(
            parse_command(1, "key Enter"),
            Err(EventParseError::MissingArgument { command: "key", .. })
        ));
        assert!(parse_command(1, "wait -5").is_err());
        assert!(parse_command(1, "scroll NaN").is_err());
    }

    fn dispatcher(n: usize) -> EventDispatcher<MemoryPage> {
        let page = MemoryPage::with_filter_controls(Geometry::default(), FILTER_CLASSNAME);
        let mut controller = Controller::new(page, Settings::default()).unwrap();
        let hosts = (0..n)
            .map(|i| Host {
                name: format!("host-{i}"),
                ..Default::default()
            })
            .collect();
        controller.on_hosts_loaded(hosts).unwrap();
        EventDispatcher::new(controller)
    }

    #[test]
    fn scroll_bursts_are_throttled_with_one_trailing_run() {
        let mut d = dispatcher(100);
        let start = Instant::now();
        assert_eq!(d.controller().page_number(), 1);

        d.controller_mut().page_mut().scroll_by(300.0);
        assert!(d.dispatch(PageEvent::Scroll, start).unwrap().handled);
        assert_eq!(d.controller().page_number(), 2);

        for ms in [10u64, 30, 60] {
            d.controller_mut().page_mut().scroll_by(300.0);
            let outcome = d.dispatch(PageEvent::Scroll, start + Duration::from_millis(ms)).unwrap();
            assert!(!outcome.handled);
        }
        assert_eq!(d.controller().page_number(), 2);
        assert_eq!(d.next_deadline(), Some(start + Duration::from_millis(100)));

        assert!(d.flush(start + Duration::from_millis(100)));
        assert_eq!(d.controller().page_number(), 3);
        assert_eq!(d.next_deadline(), None);
    }

    #[test]
    fn keyboard_activation_reports_prevented_default() {
        let mut d = dispatcher(20);
        let target = d.controller().page().event_target("filter-five-stars");
        let outcome = d
            .dispatch(
                PageEvent::KeyDown {
                    target,
                    key: Key::Enter,
                },
                Instant::now(),
            )
            .unwrap();
        assert!(outcome.default_prevented);
        assert_eq!(d.controller().active_filter(), Some(FilterType::FiveStars));
    }
}
