//! Interactive terminal prompts
//!
//! Credentials are read with reedline (the token through a masking
//! highlighter); the number is picked with an arrow-key list drawn with
//! crossterm.

use std::borrow::Cow;
use std::io::{self, Write};
use std::ops::Range;

use async_trait::async_trait;
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    terminal::{self, Clear, ClearType},
};
use nu_ansi_term::{Color, Style};
use reedline::{
    Highlighter, Prompt, PromptEditMode, PromptHistorySearch, Reedline, Signal, StyledText,
};
use twicat_core::{AccountSid, AuthToken, CoreError};
use twicat_provider::PhoneNumber;

use crate::error::PromptError;

/// Source of operator input for the startup sequence
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask until a well-formed Account SID is entered
    async fn account_sid(&self) -> Result<AccountSid, PromptError>;

    /// Ask until a well-formed Auth Token is entered
    async fn auth_token(&self) -> Result<AuthToken, PromptError>;

    /// Let the operator pick one of `numbers`; returns its SID
    async fn select_number(&self, numbers: &[PhoneNumber]) -> Result<String, PromptError>;
}

/// Prompter backed by the controlling terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn account_sid(&self) -> Result<AccountSid, PromptError> {
        tokio::task::spawn_blocking(|| read_validated("Account SID", false, AccountSid::parse))
            .await?
    }

    async fn auth_token(&self) -> Result<AuthToken, PromptError> {
        tokio::task::spawn_blocking(|| read_validated("Auth Token", true, AuthToken::parse))
            .await?
    }

    async fn select_number(&self, numbers: &[PhoneNumber]) -> Result<String, PromptError> {
        if numbers.is_empty() {
            return Err(PromptError::NoChoices);
        }

        let items: Vec<String> = numbers.iter().map(|n| n.phone_number.clone()).collect();
        let index =
            tokio::task::spawn_blocking(move || run_selector("Select Number", &items)).await??;

        Ok(numbers[index].sid.clone())
    }
}

/// Prompt showing a label
struct LabelPrompt {
    label: String,
    style: Style,
}

impl LabelPrompt {
    fn new(label: &str) -> Self {
        Self {
            label: format!("{}: ", label),
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for LabelPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint(&self.label).to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// Renders every character of the buffer as `*`
struct MaskHighlighter;

impl Highlighter for MaskHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        styled.push((Style::new(), mask(line)));
        styled
    }
}

/// One `*` per input byte so the cursor math stays aligned
fn mask(line: &str) -> String {
    "*".repeat(line.len())
}

/// Read lines until `parse` accepts one. Invalid input re-prompts.
fn read_validated<T>(
    label: &str,
    masked: bool,
    parse: fn(&str) -> twicat_core::Result<T>,
) -> Result<T, PromptError> {
    let mut line_editor = Reedline::create();
    if masked {
        line_editor = line_editor.with_highlighter(Box::new(MaskHighlighter));
    }
    let prompt = LabelPrompt::new(label);

    prompt_loop(|| line_editor.read_line(&prompt), parse, print_invalid)
}

/// Pull signals from `next` until one parses. Each rejected line is
/// reported through `on_invalid`.
fn prompt_loop<T>(
    mut next: impl FnMut() -> io::Result<Signal>,
    parse: fn(&str) -> twicat_core::Result<T>,
    mut on_invalid: impl FnMut(&CoreError),
) -> Result<T, PromptError> {
    loop {
        match next()? {
            Signal::Success(line) => match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => on_invalid(&e),
            },
            Signal::CtrlC => return Err(PromptError::Interrupted),
            Signal::CtrlD => return Err(PromptError::Eof),
        }
    }
}

fn print_invalid(err: &CoreError) {
    eprintln!("{} {}", Color::Red.paint("✗"), err);
}

/// Outcome of one key press in the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectAction {
    Moved,
    Chosen(usize),
    Cancelled,
    Ignored,
}

/// Rows of items shown at once; longer lists scroll
const PAGE_SIZE: usize = 5;

/// Cursor over a non-empty list of items, viewed through a window of at
/// most [`PAGE_SIZE`] rows
#[derive(Debug)]
struct Selection {
    cursor: usize,
    offset: usize,
    len: usize,
}

impl Selection {
    fn new(len: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            len,
        }
    }

    /// Indices of the items currently on screen
    fn visible(&self) -> Range<usize> {
        self.offset..(self.offset + PAGE_SIZE).min(self.len)
    }

    /// Terminal rows taken by the label plus the window
    fn height(&self) -> u16 {
        // Bounded by PAGE_SIZE + 1
        (self.len.min(PAGE_SIZE) + 1) as u16
    }

    fn scroll_to_cursor(&mut self) {
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + PAGE_SIZE {
            self.offset = self.cursor + 1 - PAGE_SIZE;
        }
    }

    fn handle(&mut self, key: KeyEvent) -> SelectAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => SelectAction::Cancelled,
            KeyCode::Esc => SelectAction::Cancelled,
            KeyCode::Enter => SelectAction::Chosen(self.cursor),
            KeyCode::Up | KeyCode::Char('k') if self.cursor > 0 => {
                self.cursor -= 1;
                self.scroll_to_cursor();
                SelectAction::Moved
            }
            KeyCode::Down | KeyCode::Char('j') if self.cursor + 1 < self.len => {
                self.cursor += 1;
                self.scroll_to_cursor();
                SelectAction::Moved
            }
            _ => SelectAction::Ignored,
        }
    }
}

/// Restores cooked mode even when the selector bails out early
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Draw the list and return the index picked with Enter
fn run_selector(label: &str, items: &[String]) -> Result<usize, PromptError> {
    let mut out = io::stdout();
    let _raw = RawModeGuard::enable()?;
    let mut selection = Selection::new(items.len());

    render(&mut out, label, items, &selection, false)?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match selection.handle(key) {
            SelectAction::Moved => render(&mut out, label, items, &selection, true)?,
            SelectAction::Chosen(index) => {
                finish(&mut out, label, selection.height(), Some(&items[index]))?;
                return Ok(index);
            }
            SelectAction::Cancelled => {
                finish(&mut out, label, selection.height(), None)?;
                return Err(PromptError::Interrupted);
            }
            SelectAction::Ignored => {}
        }
    }
}

fn render(
    out: &mut impl Write,
    label: &str,
    items: &[String],
    selection: &Selection,
    redraw: bool,
) -> io::Result<()> {
    if redraw {
        queue!(out, MoveUp(selection.height()))?;
    }
    queue!(out, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;

    write!(out, "{}\r\n", Color::Cyan.bold().paint(label))?;
    for i in selection.visible() {
        let item = &items[i];
        if i == selection.cursor {
            write!(out, "{} {}\r\n", Color::Cyan.paint("▸"), Style::new().underline().paint(item))?;
        } else {
            write!(out, "  {}\r\n", item)?;
        }
    }
    out.flush()
}

/// Replace the list with a one-line summary
fn finish(
    out: &mut impl Write,
    label: &str,
    height: u16,
    chosen: Option<&str>,
) -> io::Result<()> {
    queue!(out, MoveUp(height), MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
    match chosen {
        Some(item) => write!(out, "{} {}: {}\r\n", Color::Green.paint("✔"), label, item)?,
        None => write!(out, "{} {}\r\n", Color::Red.paint("✗"), label)?,
    }
    out.flush()
}
