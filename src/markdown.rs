//! Markdown documentation flattened into styled runs of text.
//!
//! Block structure is reduced to line breaks and list bullets; inline
//! emphasis, strong text, code and headings keep their own style so the
//! inspector can colour them.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// How a run of text is emphasised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    Emphasis,
    Strong,
    Code,
    Heading,
}

/// A run of text sharing one style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Parses `markdown` into styled spans. Adjacent runs of the same style are
/// merged.
pub fn to_spans(markdown: &str) -> Vec<Span> {
    let mut builder = SpanBuilder::default();
    for event in Parser::new_ext(markdown, Options::empty()) {
        match event {
            Event::Start(tag) => builder.start_tag(tag),
            Event::End(tag) => builder.end_tag(tag),
            Event::Text(text) => builder.text(&text, builder.style()),
            Event::Code(code) => builder.text(&code, SpanStyle::Code),
            Event::SoftBreak => builder.text(" ", builder.style()),
            Event::HardBreak => builder.text("\n", SpanStyle::Plain),
            Event::Rule => builder.block(),
            _ => {}
        }
    }
    builder.spans
}

#[derive(Default)]
struct SpanBuilder {
    spans: Vec<Span>,
    styles: Vec<SpanStyle>,
    pending_break: bool,
    pending_bullet: bool,
}

impl SpanBuilder {
    fn style(&self) -> SpanStyle {
        self.styles.last().copied().unwrap_or(SpanStyle::Plain)
    }

    /// Starts a new line before the next text, unless nothing came yet.
    fn block(&mut self) {
        if !self.spans.is_empty() && !self.pending_bullet {
            self.pending_break = true;
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph | Tag::List(_) => self.block(),
            Tag::Heading { .. } => {
                self.block();
                self.styles.push(SpanStyle::Heading);
            }
            Tag::CodeBlock(_) => {
                self.block();
                self.styles.push(SpanStyle::Code);
            }
            Tag::Item => {
                self.block();
                self.pending_bullet = true;
            }
            Tag::Emphasis => self.styles.push(SpanStyle::Emphasis),
            Tag::Strong => self.styles.push(SpanStyle::Strong),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::Emphasis | TagEnd::Strong => {
                self.styles.pop();
            }
            TagEnd::CodeBlock => {
                self.styles.pop();
                if let Some(last) = self.spans.last_mut() {
                    let trimmed = last.text.trim_end_matches('\n').len();
                    last.text.truncate(trimmed);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        if std::mem::take(&mut self.pending_break) {
            self.append("\n", SpanStyle::Plain);
        }
        if std::mem::take(&mut self.pending_bullet) {
            self.append("• ", SpanStyle::Plain);
        }
        self.append(text, style);
    }

    fn append(&mut self, text: &str, style: SpanStyle) {
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(Span::new(text, style)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_styles_become_separate_spans() {
        assert_eq!(
            to_spans("Prints **message** at `level`, *once*."),
            [
                Span::new("Prints ", SpanStyle::Plain),
                Span::new("message", SpanStyle::Strong),
                Span::new(" at ", SpanStyle::Plain),
                Span::new("level", SpanStyle::Code),
                Span::new(", ", SpanStyle::Plain),
                Span::new("once", SpanStyle::Emphasis),
                Span::new(".", SpanStyle::Plain),
            ]
        );
    }

    #[test]
    fn blocks_are_separated_by_line_breaks() {
        assert_eq!(
            to_spans("# Usage\nFirst line\nsecond\n\n- a\n- b"),
            [
                Span::new("Usage", SpanStyle::Heading),
                Span::new("\nFirst line second\n• a\n• b", SpanStyle::Plain),
            ]
        );
    }

    #[test]
    fn code_blocks_drop_the_trailing_newline() {
        assert_eq!(
            to_spans("Example:\n\n```\nwait(1)\n```\n"),
            [
                Span::new("Example:\n", SpanStyle::Plain),
                Span::new("wait(1)", SpanStyle::Code),
            ]
        );
    }

    #[test]
    fn blank_input_has_no_spans() {
        assert!(to_spans("").is_empty());
        assert!(to_spans("  \n\n ").is_empty());
    }
}
