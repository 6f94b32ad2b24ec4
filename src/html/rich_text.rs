// src/html/rich_text.rs
//! Inline markup ↔ rich text runs.

use super::dom::{self, tag};
use super::AnnotationMode;
use crate::types::{Annotations, Color, Link, RichTextItem};
use regex::Regex;
use scraper::{ElementRef, Html};

lazy_static::lazy_static! {
    static ref WHITESPACE_RUN: Regex =
        Regex::new(r"[ \t\r\n\x0C]+").expect("Failed to compile whitespace regex - this is a bug in the code");
}

/// Formatting in effect at one point of the inline walk.
#[derive(Debug, Clone, Default)]
struct InlineState {
    flags: Annotations,
    link: Option<Link>,
    color: Color,
}

impl InlineState {
    /// The state inside `el`, given the state around it.
    fn enter(&self, el: &ElementRef<'_>, mode: AnnotationMode) -> InlineState {
        let name = tag(el);
        let mut next = self.clone();

        if let Some(color) = span_color(el) {
            next.color = color;
        }

        let link = (name == "a")
            .then(|| el.value().attr("href"))
            .flatten()
            .map(|href| Link {
                url: href.to_string(),
            });
        let Some(flags) = emphasis_flags(name, link.is_some()) else {
            return next;
        };

        match mode {
            AnnotationMode::Innermost => {
                next.flags = flags;
                next.link = link;
            }
            AnnotationMode::Accumulate => {
                next.flags = next.flags.merge(flags);
                if link.is_some() {
                    next.link = link;
                }
            }
        }
        next
    }

    fn run(&self, content: String) -> RichTextItem {
        RichTextItem {
            content,
            annotations: self.flags.with_color(self.color),
            link: self.link.clone(),
        }
    }
}

/// Flags contributed by an inline emphasis tag; `None` for anything else.
/// An anchor without an `href` is not emphasis.
fn emphasis_flags(name: &str, is_link: bool) -> Option<Annotations> {
    match name {
        "strong" | "b" => Some(Annotations::bold()),
        "em" | "i" => Some(Annotations::italic()),
        "u" | "ins" => Some(Annotations::underline()),
        "s" | "strike" | "del" => Some(Annotations::strikethrough()),
        "code" | "kbd" => Some(Annotations::code()),
        "a" if is_link => Some(Annotations::default()),
        _ => None,
    }
}

/// Color declared on a `span` (or `mark`) through its inline style.
fn span_color(el: &ElementRef<'_>) -> Option<Color> {
    let name = tag(el);
    if name == "mark" && el.value().attr("style").is_none() {
        return Some(Color::LightYellow);
    }
    if name != "span" && name != "mark" {
        return None;
    }
    let style = el.value().attr("style")?;

    let mut color = None;
    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let resolved = Color::from_css(value);
        if resolved == Color::Default {
            continue;
        }
        match property.trim().to_ascii_lowercase().as_str() {
            "color" => color = Some(resolved),
            "background-color" | "background" => color = Some(resolved.to_background()),
            _ => {}
        }
    }
    color
}

/// Converts the inline content of `element` into rich text runs.
///
/// Whitespace runs collapse to one space, the block's leading and trailing
/// whitespace is dropped, and adjacent runs with identical formatting merge.
pub fn runs_from_element(element: ElementRef<'_>, mode: AnnotationMode) -> Vec<RichTextItem> {
    runs_excluding(element, mode, &|_| false)
}

/// Parses an inline markup fragment and converts it into runs.
pub fn runs_from_markup(markup: &str, mode: AnnotationMode) -> Vec<RichTextItem> {
    let fragment = Html::parse_fragment(markup);
    runs_from_element(fragment.root_element(), mode)
}

/// Like [`runs_from_element`], skipping descendants for which `skip` holds.
pub(crate) fn runs_excluding(
    element: ElementRef<'_>,
    mode: AnnotationMode,
    skip: &dyn Fn(&ElementRef<'_>) -> bool,
) -> Vec<RichTextItem> {
    let mut runs = Vec::new();
    walk(element, &InlineState::default(), mode, skip, &mut runs);
    tidy(runs)
}

fn walk(
    element: ElementRef<'_>,
    state: &InlineState,
    mode: AnnotationMode,
    skip: &dyn Fn(&ElementRef<'_>) -> bool,
    runs: &mut Vec<RichTextItem>,
) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let collapsed = WHITESPACE_RUN.replace_all(text, " ");
            if !collapsed.is_empty() {
                runs.push(state.run(collapsed.into_owned()));
            }
            continue;
        }

        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        let name = tag(&child_el);
        if dom::is_opaque(name) || skip(&child_el) {
            continue;
        }
        if name == "br" {
            runs.push(state.run("\n".to_string()));
            continue;
        }

        let inner = state.enter(&child_el, mode);
        walk(child_el, &inner, mode, skip, runs);
    }
}

/// Trims block-edge whitespace, collapses spaces across run boundaries and
/// merges equally formatted neighbours.
fn tidy(runs: Vec<RichTextItem>) -> Vec<RichTextItem> {
    let mut merged: Vec<RichTextItem> = Vec::with_capacity(runs.len());
    for mut run in runs {
        let previous_ends_blank = merged
            .last()
            .map_or(true, |prev| prev.content.ends_with([' ', '\n']));
        if previous_ends_blank && run.content.starts_with(' ') {
            run.content.remove(0);
        }
        if run.content.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(prev) if prev.same_style(&run) => prev.content.push_str(&run.content),
            _ => merged.push(run),
        }
    }

    while let Some(last) = merged.last_mut() {
        let trimmed = last.content.trim_end_matches(' ').len();
        last.content.truncate(trimmed);
        if last.content.is_empty() {
            merged.pop();
        } else {
            break;
        }
    }
    merged
}

/// Renders runs as inline markup.
///
/// Each run is wrapped innermost-first in `strong`, `em`, `u`, `s`, `code`,
/// then a color `span`, then the anchor. Line breaks become `<br>`.
pub fn markup_from_runs(runs: &[RichTextItem]) -> String {
    let mut out = String::new();
    for run in runs {
        out.push_str(&markup_from_run(run));
    }
    out
}

fn markup_from_run(run: &RichTextItem) -> String {
    let mut html = html_escape::encode_text(&run.content).replace('\n', "<br>");
    let annotations = &run.annotations;

    let wrappers = [
        (annotations.bold, "strong"),
        (annotations.italic, "em"),
        (annotations.underline, "u"),
        (annotations.strikethrough, "s"),
        (annotations.code, "code"),
    ];
    for (enabled, element) in wrappers {
        if enabled {
            html = format!("<{element}>{html}</{element}>");
        }
    }

    if annotations.color != Color::Default {
        let property = if annotations.color.is_background() {
            "background-color"
        } else {
            "color"
        };
        html = format!(
            "<span style=\"{}:{}\">{}</span>",
            property,
            annotations.color.css_name(),
            html
        );
    }

    if let Some(link) = &run.link {
        html = format!(
            "<a href=\"{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(&link.url),
            html
        );
    }
    html
}
