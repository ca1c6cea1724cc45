use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::ChangelogEntryItem;

#[derive(Debug)]
struct WrappedAtWidth {
    width: usize,
    bodies: HashMap<String, Arc<str>>,
}

/// Memoized word wrapping of changelog bodies.
///
/// Only the most recently requested width is kept: asking for a different
/// width drops every body wrapped at the previous one.
#[derive(Debug, Default)]
pub struct WrapCache {
    current: Mutex<Option<WrappedAtWidth>>,
}

impl WrapCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Body of `item` wrapped to `width` display columns.
    pub fn wrapped(&self, item: &ChangelogEntryItem, width: usize) -> Arc<str> {
        self.wrap(&item.body, width)
    }

    pub fn wrap(&self, text: &str, width: usize) -> Arc<str> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_none_or(|cached| cached.width != width) {
            *current = None;
        }
        let cached = current.get_or_insert_with(|| WrappedAtWidth {
            width,
            bodies: HashMap::new(),
        });
        if let Some(wrapped) = cached.bodies.get(text) {
            return Arc::clone(wrapped);
        }

        let wrapped: Arc<str> = wrap_text(text, width).into();
        cached.bodies.insert(text.to_string(), Arc::clone(&wrapped));
        wrapped
    }

    /// Width the cached bodies were wrapped to.
    #[must_use]
    pub fn width(&self) -> Option<usize> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|cached| cached.width)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |cached| cached.bodies.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Greedy word wrap on display width.
///
/// Line breaks in `text` are kept, including a trailing one. Leading
/// indentation of a line is kept and repeated on its continuation lines while
/// it is narrower than `width`. Runs of whitespace after the indentation
/// collapse to one space and words wider than the remaining room are split.
/// A `width` of zero returns the text unchanged.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + text.len() / width);
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        wrap_line(line.strip_suffix('\r').unwrap_or(line), width, &mut out);
    }
    out
}

fn wrap_line(line: &str, width: usize, out: &mut String) {
    let body = line.trim_start();
    if body.is_empty() {
        return;
    }

    let indent = &line[..line.len() - body.len()];
    let indent_width = UnicodeWidthStr::width(indent);
    let (indent, indent_width) = if indent_width < width {
        (indent, indent_width)
    } else {
        ("", 0)
    };

    let break_line = |out: &mut String| {
        out.push('\n');
        out.push_str(indent);
    };

    out.push_str(indent);
    let mut column = indent_width;
    let mut line_has_text = false;
    for word in body.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);
        if line_has_text {
            if column + 1 + word_width <= width {
                out.push(' ');
                column += 1;
            } else {
                break_line(out);
                column = indent_width;
                line_has_text = false;
            }
        }

        if column + word_width <= width {
            out.push_str(word);
            column += word_width;
            line_has_text = true;
            continue;
        }

        for ch in word.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if line_has_text && column + ch_width > width {
                break_line(out);
                column = indent_width;
            }
            out.push(ch);
            column += ch_width;
            line_has_text = true;
        }
    }
}
