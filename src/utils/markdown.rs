use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::xml::Element;

/// Tags allowed on a metainfo description fragment
const ALLOWED_TAGS: [&str; 6] = ["p", "li", "ul", "ol", "em", "code"];
/// Tags rewritten to an allowed equivalent before the allow-list check
const TAG_MAPPING: [(&str, &str); 1] = [("strong", "em")];

/// Renders Markdown release notes into a `description` element containing only the markup subset allowed on
/// metainfo descriptions.
///
/// The notes are first rendered into a generic element tree and then sanitized: a fixed set of tags is remapped to
/// an allowed equivalent, and every other disallowed node is removed with its whole textual content spliced back at
/// the position it occupied. Empty notes produce an empty `description`.
pub fn render_description(markdown: &str) -> Element {
    let mut description = markdown_to_tree(markdown);
    sanitize(&mut description);
    description
}

/// Renders Markdown into a generic element tree, rooted at a `description` element
fn markdown_to_tree(markdown: &str) -> Element {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);

    let mut stack: Vec<Element> = vec![Element::new("description")];
    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                stack.push(Element::new("pre"));
                stack.push(Element::new("code"));
            }
            Event::End(TagEnd::CodeBlock) => {
                close(&mut stack);
                close(&mut stack);
            }
            Event::Start(tag) => stack.push(start_element(tag)),
            Event::End(_) => close(&mut stack),
            Event::Text(text) => append_text(&mut stack, &text),
            Event::Code(code) => attach(&mut stack, Element::with_text("code", code.as_ref())),
            Event::Html(html) | Event::InlineHtml(html) => append_text(&mut stack, &html),
            Event::FootnoteReference(label) => append_text(&mut stack, &format!("[{label}]")),
            Event::SoftBreak => append_text(&mut stack, "\n"),
            Event::HardBreak => {
                let mut br = Element::new("br");
                br.tail.push('\n');
                attach(&mut stack, br);
            }
            Event::Rule => attach(&mut stack, Element::new("hr")),
            Event::TaskListMarker(checked) => append_text(&mut stack, if checked { "[x] " } else { "[ ] " }),
            _ => (),
        }
    }

    // The parser guarantees balanced events, but fold any unclosed element before returning the root
    while stack.len() > 1 {
        close(&mut stack);
    }
    stack.pop().unwrap_or_else(|| Element::new("description"))
}

/// Builds the element a tag opens
fn start_element(tag: Tag) -> Element {
    match tag {
        Tag::Paragraph => Element::new("p"),
        Tag::Heading { level, .. } => Element::new(match level {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }),
        Tag::BlockQuote(_) => Element::new("blockquote"),
        Tag::List(None) => Element::new("ul"),
        Tag::List(Some(start)) => {
            let mut list = Element::new("ol");
            if start != 1 {
                list.set_attr("start", start.to_string());
            }
            list
        }
        Tag::Item => Element::new("li"),
        Tag::Emphasis => Element::new("em"),
        Tag::Strong => Element::new("strong"),
        Tag::Strikethrough => Element::new("del"),
        Tag::Link { dest_url, title, .. } => {
            let mut link = Element::new("a");
            link.set_attr("href", dest_url.as_ref());
            if !title.is_empty() {
                link.set_attr("title", title.as_ref());
            }
            link
        }
        Tag::Image { dest_url, title, .. } => {
            let mut image = Element::new("img");
            image.set_attr("src", dest_url.as_ref());
            if !title.is_empty() {
                image.set_attr("title", title.as_ref());
            }
            image
        }
        Tag::Table(_) => Element::new("table"),
        Tag::TableHead | Tag::TableRow => Element::new("tr"),
        Tag::TableCell => Element::new("td"),
        // Anything else carries no structure the sanitizer would keep anyway
        _ => Element::new("span"),
    }
}

/// Closes the innermost open element, attaching it to its parent
fn close(stack: &mut Vec<Element>) {
    if stack.len() > 1
        && let Some(element) = stack.pop()
        && let Some(parent) = stack.last_mut()
    {
        parent.children.push(element);
    }
}

/// Attaches a childless element at the current position
fn attach(stack: &mut [Element], element: Element) {
    if let Some(open) = stack.last_mut() {
        open.children.push(element);
    }
}

/// Appends textual content at the current position: either as the text of the innermost open element or as the tail
/// of its last child
fn append_text(stack: &mut [Element], text: &str) {
    if let Some(open) = stack.last_mut() {
        match open.children.last_mut() {
            Some(child) => child.tail.push_str(text),
            None => open.text.push_str(text),
        }
    }
}

/// Restricts the tree to the allowed tags, processing children before their parent.
///
/// Children are folded back one by one: a disallowed node is dropped and its flattened content is spliced into the
/// preceding kept sibling's tail, or into the parent's leading text when no kept sibling precedes it. The root
/// element itself is never removed.
fn sanitize(element: &mut Element) {
    let children = std::mem::take(&mut element.children);
    for mut child in children {
        sanitize(&mut child);
        if let Some((_, mapped)) = TAG_MAPPING.iter().find(|(from, _)| *from == child.tag) {
            child.tag = (*mapped).to_string();
        }
        if ALLOWED_TAGS.contains(&child.tag.as_str()) {
            element.children.push(child);
        } else {
            let content = child.flattened_text();
            match element.children.last_mut() {
                Some(previous) => previous.tail.push_str(&content),
                None => element.text.push_str(&content),
            }
        }
    }
}
