//! Crossterm terminal driver for duelist.
//!
//! Provides a [`CrosstermDriver`] that implements [`duelist_core::Driver`]:
//! raw mode and the alternate screen, one input listener thread that turns
//! terminal events into [`Msg`]s, and line-based flushing of styled frames.

use std::io::{self, Write};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{self, Attribute, Color as CtColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use duelist_core::{
    app::{Context, Driver},
    frame::Frame,
    messages::{Key, ModMask, Msg},
    style::{AttrMask, Color},
};

/// How often the listener wakes up to check for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Identical key presses closer together than this are dropped.
pub const DEBOUNCE: Duration = Duration::from_millis(50);

/// Maps a [`duelist_core::Color`] to a [`crossterm::style::Color`].
fn to_ct_color(c: Color) -> CtColor {
    if c.is_default() {
        CtColor::Reset
    } else {
        let (r, g, b) = (c.r(), c.g(), c.b());
        CtColor::Rgb { r, g, b }
    }
}

/// Maps crossterm key modifiers to a [`ModMask`].
fn to_mod_mask(mods: KeyModifiers) -> ModMask {
    let mut m = ModMask::NONE;
    if mods.contains(KeyModifiers::SHIFT) {
        m = m | ModMask::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        m = m | ModMask::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        m = m | ModMask::ALT;
    }
    m
}

/// Maps a crossterm [`KeyCode`] to a [`Key`].
fn to_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        _ => None,
    }
}

/// Drops a key press identical to the previous one when it arrives within
/// [`DEBOUNCE`] of it.
#[derive(Debug, Default)]
pub struct Debounce {
    last: Option<(Key, Instant)>,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` pressed at `now` should be delivered.
    pub fn accept(&mut self, key: Key, now: Instant) -> bool {
        if let Some((prev, at)) = self.last {
            if prev == key && now.saturating_duration_since(at) < DEBOUNCE {
                return false;
            }
        }
        self.last = Some((key, now));
        true
    }
}

/// Translate one terminal event. Only key presses are considered; repeat
/// and release events are ignored.
fn translate(ev: Event, debounce: &mut Debounce) -> Option<Msg> {
    match ev {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => {
            if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                return Some(Msg::Quit);
            }
            let key = to_key(code)?;
            let now = Instant::now();
            if !debounce.accept(key, now) {
                return None;
            }
            Some(Msg::KeyDown {
                key,
                modifiers: to_mod_mask(modifiers),
                time: now,
            })
        }
        Event::Resize(w, h) => Some(Msg::Screen {
            width: w as i32,
            height: h as i32,
            time: Instant::now(),
        }),
        _ => None,
    }
}

/// Restore the terminal to cooked mode. Safe to call more than once, and
/// from a panic hook.
pub fn restore_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        style::SetAttribute(Attribute::Reset),
        cursor::Show,
        terminal::LeaveAlternateScreen
    );
    let _ = terminal::disable_raw_mode();
}

/// A terminal back-end using crossterm.
#[derive(Debug, Default)]
pub struct CrosstermDriver {
    active: bool,
}

impl CrosstermDriver {
    /// Create a new driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current terminal size, falling back to 80x24.
    pub fn size() -> (i32, i32) {
        terminal::size()
            .map(|(w, h)| (w as i32, h as i32))
            .unwrap_or((80, 24))
    }
}

impl Driver for CrosstermDriver {
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        self.active = true;
        Ok(())
    }

    fn spawn_input(
        &mut self,
        ctx: Context,
        tx: Sender<Msg>,
    ) -> Result<JoinHandle<()>, Box<dyn std::error::Error>> {
        let handle = thread::Builder::new()
            .name("input".into())
            .spawn(move || {
                let mut debounce = Debounce::new();
                while !ctx.is_done() {
                    match event::poll(POLL_INTERVAL) {
                        Ok(false) => continue,
                        Ok(true) => {}
                        Err(e) => {
                            log::warn!("terminal poll failed: {e}");
                            tx.send(Msg::Quit).ok();
                            return;
                        }
                    }
                    let ev = match event::read() {
                        Ok(ev) => ev,
                        Err(e) => {
                            log::warn!("terminal read failed: {e}");
                            continue;
                        }
                    };
                    if let Some(msg) = translate(ev, &mut debounce) {
                        if tx.send(msg).is_err() {
                            return;
                        }
                    }
                }
            })?;
        Ok(handle)
    }

    fn flush(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = io::stdout();
        queue!(stdout, terminal::Clear(ClearType::All))?;

        let rows = frame.height.max(0) as usize;
        for (y, line) in frame.lines.iter().take(rows).enumerate() {
            queue!(stdout, cursor::MoveTo(0, y as u16))?;
            let mut col = 0usize;
            for span in &line.spans {
                if col >= frame.width.max(0) as usize {
                    break;
                }
                let room = frame.width.max(0) as usize - col;
                let text: String = span.text.chars().take(room).collect();
                col += text.chars().count();

                let st = span.style;
                queue!(
                    stdout,
                    SetForegroundColor(to_ct_color(st.fg)),
                    SetBackgroundColor(to_ct_color(st.bg))
                )?;
                if st.attrs.contains(AttrMask::BOLD) {
                    queue!(stdout, style::SetAttribute(Attribute::Bold))?;
                }
                if st.attrs.contains(AttrMask::ITALIC) {
                    queue!(stdout, style::SetAttribute(Attribute::Italic))?;
                }
                if st.attrs.contains(AttrMask::UNDERLINE) {
                    queue!(stdout, style::SetAttribute(Attribute::Underlined))?;
                }
                if st.attrs.contains(AttrMask::REVERSE) {
                    queue!(stdout, style::SetAttribute(Attribute::Reverse))?;
                }
                if st.attrs.contains(AttrMask::DIM) {
                    queue!(stdout, style::SetAttribute(Attribute::Dim))?;
                }
                queue!(stdout, style::Print(text))?;
                if !st.attrs.is_empty() {
                    queue!(stdout, style::SetAttribute(Attribute::Reset))?;
                }
            }
        }

        stdout.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        if self.active {
            restore_terminal();
            self.active = false;
        }
    }
}
