// src/html/dom.rs
//! Small traversal helpers over `scraper`'s element tree.

use crate::constants::{BLOCK_ID_ATTR, BLOCK_TYPE_ATTR, PAGE_LINK_PREFIX};
use crate::model::BlockKind;
use crate::types::{BlockId, PageId};
use scraper::ElementRef;

/// Tag name of an element, lower-cased by the parser.
pub(crate) fn tag<'a>(el: &ElementRef<'a>) -> &'a str {
    el.value().name()
}

pub(crate) fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Direct element children, skipping text and comments.
pub(crate) fn child_elements<'a>(el: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// First descendant element (excluding `el`) matching `predicate`,
/// never entering subtrees rooted at an element for which `prune` holds.
pub(crate) fn find_descendant<'a>(
    el: &ElementRef<'a>,
    predicate: &dyn Fn(&ElementRef<'a>) -> bool,
    prune: &dyn Fn(&ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    for child in child_elements(el) {
        if prune(&child) {
            continue;
        }
        if predicate(&child) {
            return Some(child);
        }
        if let Some(found) = find_descendant(&child, predicate, prune) {
            return Some(found);
        }
    }
    None
}

/// First descendant element with the given tag name.
pub(crate) fn find_tag<'a>(el: &ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    find_descendant(el, &|candidate| tag(candidate) == name, &|_| false)
}

/// All text under an element, verbatim.
pub(crate) fn raw_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

/// The `data-notion-block-type` tag, if present and recognized.
pub(crate) fn declared_kind(el: &ElementRef<'_>) -> Option<Result<BlockKind, String>> {
    el.value().attr(BLOCK_TYPE_ATTR).map(|declared| {
        BlockKind::from_tag(declared).ok_or_else(|| declared.to_string())
    })
}

/// The `data-notion-block-id` attribute, when it holds a valid id.
pub(crate) fn declared_id(el: &ElementRef<'_>) -> Option<BlockId> {
    let raw = el.value().attr(BLOCK_ID_ATTR)?;
    match BlockId::parse(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            log::debug!("Ignoring malformed block id '{}': {}", raw, e);
            None
        }
    }
}

/// Extracts the page id from an in-app page link such as `/page/{id}`.
///
/// Only the trailing path segment matters, so absolute URLs, query strings
/// and trailing slashes are all tolerated.
pub(crate) fn page_id_from_href(href: &str) -> Option<PageId> {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segment = path.rsplit('/').next()?;
    match PageId::parse(segment) {
        Ok(id) => Some(id),
        Err(_) => {
            log::debug!("No page id in link '{}'", href);
            None
        }
    }
}

/// Builds the in-app link for a page.
pub(crate) fn page_href(id: &PageId) -> String {
    format!("{}{}", PAGE_LINK_PREFIX, id.as_str())
}

/// Elements that start a new block rather than continuing inline text.
pub(crate) fn is_block_level(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "ul"
            | "ol"
            | "li"
            | "pre"
            | "table"
            | "figure"
            | "blockquote"
            | "hr"
            | "details"
            | "audio"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
    )
}

pub(crate) fn is_list(name: &str) -> bool {
    matches!(name, "ul" | "ol")
}

/// Elements whose content never contributes text.
pub(crate) fn is_opaque(name: &str) -> bool {
    matches!(
        name,
        "script"
            | "style"
            | "template"
            | "input"
            | "button"
            | "select"
            | "textarea"
            | "audio"
            | "video"
            | "img"
    )
}
