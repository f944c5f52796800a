// ── Console front end ─────────────────────────────────────────────────────────
//
// A line-oriented text surface.  Plain lines are appended to the document;
// lines starting with `:` are commands.  Every change is reported to the
// lifecycle through `App::notify_edited`, exactly like a GUI surface would.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use crate::{
    app::{App, Phase},
    editor::{word_count, EditorSurface, SharedBuffer},
    error::Result,
    platform::FilePicker,
    settings::{self, Settings},
    theme::{self, Palette, Themeable},
};

// ── Commands ──────────────────────────────────────────────────────────────────

/// One line of user input.
#[derive(Debug, PartialEq)]
pub(crate) enum Command {
    /// `:o [path]`; no path means prompt.
    Open(Option<PathBuf>),
    /// `:w [path]`; no path means prompt.
    SaveAs(Option<PathBuf>),
    /// `:set key value`
    Set { key: String, value: String },
    /// `:close` stops autosave and forgets the document.
    Close,
    /// `:clear` empties the document.
    Clear,
    /// `:show` prints the document.
    Show,
    /// `:count` prints the word count.
    Count,
    /// `:q`
    Quit,
    /// Any other `:`-prefixed line.
    Unknown(String),
    /// Text to append.
    Text(String),
}

pub(crate) fn parse(line: &str) -> Command {
    let Some(cmd) = line.strip_prefix(':') else {
        return Command::Text(line.to_owned());
    };
    let (name, arg) = match cmd.trim().split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim())),
        None => (cmd.trim(), None),
    };
    let path = || arg.filter(|a| !a.is_empty()).map(PathBuf::from);
    match name {
        "o" | "open" => Command::Open(path()),
        "w" | "save" => Command::SaveAs(path()),
        "set" => match arg.and_then(|a| a.split_once(char::is_whitespace)) {
            Some((key, value)) => Command::Set {
                key: key.to_owned(),
                value: value.trim().to_owned(),
            },
            None => Command::Unknown(line.to_owned()),
        },
        "close" => Command::Close,
        "clear" => Command::Clear,
        "show" => Command::Show,
        "count" => Command::Count,
        "q" | "quit" => Command::Quit,
        _ => Command::Unknown(line.to_owned()),
    }
}

// ── View ──────────────────────────────────────────────────────────────────────

/// Rows rendered by `:show`.
const VIEW_ROWS: usize = 24;

/// Status line and page styling, refreshed through `Themeable`.
#[derive(Debug, Default)]
pub(crate) struct ConsoleView {
    bg: Option<(u8, u8, u8)>,
    fg: Option<(u8, u8, u8)>,
    caret: Option<(u8, u8, u8)>,
    /// Row of the caret line as a fraction of `VIEW_ROWS`.
    typewriter: f64,
    font: String,
    font_size: u32,
    width: usize,
    show_word_count: bool,
}

impl ConsoleView {
    pub(crate) fn new(settings: &Settings) -> Self {
        let mut view = Self::default();
        view.apply_theme(&theme::palette_for(settings), settings);
        view
    }

    /// `name · N words`, coloured with the theme when it parses.
    pub(crate) fn status(&self, name: &str, text: &str) -> String {
        let mut line = name.to_owned();
        if self.show_word_count {
            line.push_str(&format!(" \u{00b7} {} words", word_count(text)));
        }
        match (self.bg, self.fg) {
            (Some((br, bg, bb)), Some((fr, fg, fb))) => {
                format!("\x1b[48;2;{br};{bg};{bb}m\x1b[38;2;{fr};{fg};{fb}m {line} \x1b[0m")
            }
            _ => line,
        }
    }

    /// One-line greeting naming the configured typeface.
    pub(crate) fn banner(&self) -> String {
        format!(
            "Quillpad: {} {}pt, {} columns. :o open, :w save as, :q quit",
            self.font, self.font_size, self.width
        )
    }

    /// A page of `text` wrapped at the column width, typewriter style: the
    /// caret line sits `typewriter` of the way down a `VIEW_ROWS` page, with
    /// blank rows above it or earlier lines scrolled off.
    pub(crate) fn page(&self, text: &str) -> String {
        let wrapped = wrap(text, self.width);
        let lines: Vec<&str> = wrapped.split('\n').collect();
        let caret_row = ((VIEW_ROWS as f64 * self.typewriter.clamp(0.0, 1.0)).round() as usize).min(VIEW_ROWS - 1);
        let shown = lines.len().min(caret_row + 1);

        let mut out = "\n".repeat(caret_row + 1 - shown);
        out.push_str(&lines[lines.len() - shown..].join("\n"));
        match self.caret {
            Some((r, g, b)) => out.push_str(&format!("\x1b[38;2;{r};{g};{b}m|\x1b[0m")),
            None => out.push('|'),
        }
        out.push('\n');
        out
    }
}

impl Themeable for ConsoleView {
    fn apply_theme(&mut self, palette: &Palette<'_>, settings: &Settings) {
        self.bg = rgb(palette.bg);
        self.fg = rgb(palette.fg);
        self.caret = rgb(palette.insert);
        self.typewriter = settings.typewriter_position;
        self.font = theme::font_family(settings).to_owned();
        self.font_size = settings.font_size;
        self.width = settings.max_char_width as usize;
        self.show_word_count = settings.show_word_count;
    }
}

/// Greedy word wrap at `width` characters; existing line breaks are kept
/// and words longer than `width` stay whole.
pub(crate) fn wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        let mut col = 0;
        for word in body.split_whitespace() {
            let len = word.chars().count();
            if col > 0 && col + 1 + len > width {
                out.push('\n');
                col = 0;
            } else if col > 0 {
                out.push(' ');
                col += 1;
            }
            out.push_str(word);
            col += len;
        }
        out.push_str(newline);
    }
    out
}

/// `#rrggbb` → components.
fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    if !settings::is_hex_colour(hex) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(1)?, channel(3)?, channel(5)?))
}

// ── Loop ──────────────────────────────────────────────────────────────────────

/// Drive `app` from stdin until `:q` or end of input.
///
/// Returns only fatal errors; everything else has already been reported.
pub(crate) fn run(app: &mut App, buffer: &SharedBuffer, picker: &dyn FilePicker) -> Result<()> {
    let mut view = ConsoleView::new(app.settings());
    let stdin = io::stdin();
    let mut line = String::new();

    println!("{}", view.banner());
    print_status(&view, app, buffer);
    loop {
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if !step(app, buffer, picker, &mut view, parse(line))? {
            return Ok(());
        }
    }
}

/// Execute one command.  `Ok(false)` ends the session.
fn step(
    app: &mut App,
    buffer: &SharedBuffer,
    picker: &dyn FilePicker,
    view: &mut ConsoleView,
    command: Command,
) -> Result<bool> {
    let outcome = match command {
        Command::Quit => return Ok(false),
        Command::Text(text) => {
            let content = buffer.append(&format!("{text}\n"));
            app.notify_edited(&content);
            return Ok(true);
        }
        Command::Close => {
            app.close();
            buffer.set_content("");
            Ok(())
        }
        Command::Clear => {
            buffer.set_content("");
            app.notify_edited("");
            Ok(())
        }
        Command::Show => {
            print!("{}", view.page(&buffer.content()));
            Ok(())
        }
        Command::Count => {
            println!("{} words, {} characters", word_count(&buffer.content()), buffer.char_len());
            Ok(())
        }
        Command::Open(Some(path)) => app.open_document(&path),
        Command::Open(None) => app.open_file_dialog(picker, false),
        Command::SaveAs(Some(path)) => app.save_current_as(&path),
        Command::SaveAs(None) => app.save_as_dialog(picker),
        Command::Set { key, value } => match settings::with_override(app.settings(), &key, &value) {
            Ok(new) => app.apply_settings(new, &mut [&mut *view]),
            Err(e) => {
                eprintln!("{e}");
                Ok(())
            }
        },
        Command::Unknown(raw) => {
            eprintln!("unknown command: {raw}");
            Ok(())
        }
    };

    match outcome {
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            print_status(view, app, buffer);
            Ok(true)
        }
        Ok(()) => {
            print_status(view, app, buffer);
            Ok(true)
        }
    }
}

fn print_status(view: &ConsoleView, app: &App, buffer: &SharedBuffer) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{}", view.status(&status_name(app), &buffer.content()));
    let _ = out.flush();
}

fn status_name(app: &App) -> String {
    match app.phase() {
        Phase::DocumentActive if app.doc().autosave_enabled() => app.doc().display_name(),
        Phase::DocumentActive => format!("{} (autosave off)", app.doc().display_name()),
        Phase::Uninitialized | Phase::NoDocument => "(no document)".to_owned(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
