//! pulldown-cmark events to tokens.
//!
//! Paragraphs, headings and table cells collect their inline content into one
//! `inline` token. Inline content that arrives directly inside a list item
//! (tight lists) is wrapped in hidden paragraph tokens so the default rule can
//! tell tight items from loose ones.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Parser, Tag, TagEnd};

use crate::engine::EngineOptions;
use crate::token::{Nesting, Token, TokenKind};
use crate::util::{heading_level_to_num, normalize_link, validate_link};

/// Tokenize markdown.
pub(crate) fn tokenize(source: &str, options: &EngineOptions) -> Vec<Token> {
    let mut builder = TokenBuilder::new(options);
    for event in Parser::new_ext(source, options.extensions) {
        builder.handle(event);
    }
    builder.finish()
}

/// Innermost block container of the current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
    /// List item or definition; loose inline content gets a hidden paragraph.
    Item,
    Other,
}

#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    body_open: bool,
    cell: usize,
}

impl TableState {
    fn alignment_style(&self) -> Option<&'static str> {
        match self.alignments.get(self.cell)? {
            Alignment::None => None,
            Alignment::Left => Some("text-align:left"),
            Alignment::Center => Some("text-align:center"),
            Alignment::Right => Some("text-align:right"),
        }
    }
}

struct TokenBuilder<'a> {
    options: &'a EngineOptions,
    tokens: Vec<Token>,
    /// Children of the `inline` token being built.
    inline: Option<Vec<Token>>,
    /// Images being built; their content becomes alt text.
    images: Vec<Token>,
    /// Whether each open link was emitted (unsafe destinations are dropped).
    links: Vec<bool>,
    containers: Vec<Container>,
    hidden_paragraph: bool,
    code: Option<Token>,
    html: Option<String>,
    table: TableState,
    /// Depth inside constructs that produce no output.
    skip_depth: usize,
}

impl<'a> TokenBuilder<'a> {
    fn new(options: &'a EngineOptions) -> Self {
        Self {
            options,
            tokens: Vec::new(),
            inline: None,
            images: Vec::new(),
            links: Vec::new(),
            containers: Vec::new(),
            hidden_paragraph: false,
            code: None,
            html: None,
            table: TableState::default(),
            skip_depth: 0,
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.close_hidden_paragraph();
        self.tokens
    }

    fn handle(&mut self, event: Event<'_>) {
        if self.skip_depth > 0 {
            match event {
                Event::Start(Tag::MetadataBlock(_) | Tag::FootnoteDefinition(_)) => {
                    self.skip_depth += 1;
                }
                Event::End(TagEnd::MetadataBlock(_) | TagEnd::FootnoteDefinition) => {
                    self.skip_depth -= 1;
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.push_inline(
                    Token::new(TokenKind::CODE_INLINE, "code", Nesting::Leaf).with_content(&*code),
                );
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => self.text(&math),
            Event::Html(html) => {
                if let Some(block) = &mut self.html {
                    block.push_str(&html);
                } else {
                    self.inline_html(&html);
                }
            }
            Event::InlineHtml(html) => self.inline_html(&html),
            Event::FootnoteReference(label) => self.text(&format!("[^{label}]")),
            Event::SoftBreak => self.push_inline(Token::new(TokenKind::SOFTBREAK, "br", Nesting::Leaf)),
            Event::HardBreak => self.push_inline(Token::new(TokenKind::HARDBREAK, "br", Nesting::Leaf)),
            Event::Rule => self.push_block(Token::block(TokenKind::HR, "hr", Nesting::Leaf)),
            Event::TaskListMarker(checked) => {
                let mut marker = Token::new(TokenKind::TASK_LIST_MARKER, "input", Nesting::Leaf)
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    marker.set_attr("checked", "");
                }
                self.push_inline(marker);
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.push_block(Token::block(TokenKind::PARAGRAPH_OPEN, "p", Nesting::Open));
                self.inline = Some(Vec::new());
            }
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let tag = format!("h{}", heading_level_to_num(level));
                let mut token = Token::block(TokenKind::HEADING_OPEN, tag, Nesting::Open);
                if let Some(id) = id {
                    token.set_attr("id", &*id);
                }
                for class in &classes {
                    token.add_class(class);
                }
                for (name, value) in &attrs {
                    token.set_attr(&**name, value.as_deref().unwrap_or_default());
                }
                self.push_block(token);
                self.inline = Some(Vec::new());
            }
            Tag::BlockQuote(_) => {
                self.push_block(Token::block(TokenKind::BLOCKQUOTE_OPEN, "blockquote", Nesting::Open));
                self.containers.push(Container::Other);
            }
            Tag::CodeBlock(kind) => {
                self.close_hidden_paragraph();
                self.code = Some(match kind {
                    CodeBlockKind::Fenced(info) => {
                        let mut token = Token::block(TokenKind::FENCE, "code", Nesting::Leaf);
                        token.info = info.trim().to_owned();
                        token
                    }
                    CodeBlockKind::Indented => Token::block(TokenKind::CODE_BLOCK, "code", Nesting::Leaf),
                });
            }
            Tag::HtmlBlock => {
                self.close_hidden_paragraph();
                self.html = Some(String::new());
            }
            Tag::List(Some(start)) => {
                let mut token = Token::block(TokenKind::ORDERED_LIST_OPEN, "ol", Nesting::Open);
                if start != 1 {
                    token.set_attr("start", start.to_string());
                }
                self.push_block(token);
            }
            Tag::List(None) => {
                self.push_block(Token::block(TokenKind::BULLET_LIST_OPEN, "ul", Nesting::Open));
            }
            Tag::Item => {
                self.push_block(Token::block(TokenKind::LIST_ITEM_OPEN, "li", Nesting::Open));
                self.containers.push(Container::Item);
            }
            Tag::DefinitionList => {
                self.push_block(Token::block(TokenKind::DL_OPEN, "dl", Nesting::Open));
            }
            Tag::DefinitionListTitle => {
                self.push_block(Token::block(TokenKind::DT_OPEN, "dt", Nesting::Open));
                self.inline = Some(Vec::new());
            }
            Tag::DefinitionListDefinition => {
                self.push_block(Token::block(TokenKind::DD_OPEN, "dd", Nesting::Open));
                self.containers.push(Container::Item);
            }
            Tag::Table(alignments) => {
                self.push_block(Token::block(TokenKind::TABLE_OPEN, "table", Nesting::Open));
                self.table = TableState {
                    alignments,
                    ..TableState::default()
                };
            }
            Tag::TableHead => {
                self.push_block(Token::block(TokenKind::THEAD_OPEN, "thead", Nesting::Open));
                self.push_block(Token::block(TokenKind::TR_OPEN, "tr", Nesting::Open));
                self.table.in_head = true;
                self.table.cell = 0;
            }
            Tag::TableRow => {
                if !self.table.body_open {
                    self.push_block(Token::block(TokenKind::TBODY_OPEN, "tbody", Nesting::Open));
                    self.table.body_open = true;
                }
                self.push_block(Token::block(TokenKind::TR_OPEN, "tr", Nesting::Open));
                self.table.cell = 0;
            }
            Tag::TableCell => {
                let (kind, tag) = if self.table.in_head {
                    (TokenKind::TH_OPEN, "th")
                } else {
                    (TokenKind::TD_OPEN, "td")
                };
                let mut token = Token::block(kind, tag, Nesting::Open);
                if let Some(style) = self.table.alignment_style() {
                    token.set_attr("style", style);
                }
                self.push_block(token);
                self.containers.push(Container::Other);
                self.inline = Some(Vec::new());
            }
            Tag::Emphasis => self.push_inline(Token::new(TokenKind::EM_OPEN, "em", Nesting::Open)),
            Tag::Strong => self.push_inline(Token::new(TokenKind::STRONG_OPEN, "strong", Nesting::Open)),
            Tag::Strikethrough => self.push_inline(Token::new(TokenKind::S_OPEN, "s", Nesting::Open)),
            Tag::Superscript => self.push_inline(Token::new(TokenKind::SUP_OPEN, "sup", Nesting::Open)),
            Tag::Subscript => self.push_inline(Token::new(TokenKind::SUB_OPEN, "sub", Nesting::Open)),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = if link_type == LinkType::Email && !dest_url.starts_with("mailto:") {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.into_string()
                };
                let safe = validate_link(&href);
                if safe {
                    let mut token =
                        Token::new(TokenKind::LINK_OPEN, "a", Nesting::Open).with_attr("href", normalize_link(&href));
                    if !title.is_empty() {
                        token.set_attr("title", &*title);
                    }
                    self.push_inline(token);
                }
                self.links.push(safe);
            }
            Tag::Image { dest_url, title, .. } => {
                // Open the surrounding inline context before the image takes
                // over inline content.
                self.inline_mut();
                let mut token = Token::new(TokenKind::IMAGE, "img", Nesting::Leaf)
                    .with_attr("src", normalize_link(&dest_url))
                    .with_attr("alt", "");
                if !title.is_empty() {
                    token.set_attr("title", &*title);
                }
                self.images.push(token);
            }
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {
                self.skip_depth = 1;
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_inline();
                self.tokens
                    .push(Token::block(TokenKind::PARAGRAPH_CLOSE, "p", Nesting::Close));
            }
            TagEnd::Heading(level) => {
                self.flush_inline();
                let tag = format!("h{}", heading_level_to_num(level));
                self.tokens
                    .push(Token::block(TokenKind::HEADING_CLOSE, tag, Nesting::Close));
            }
            TagEnd::BlockQuote(_) => {
                self.close_hidden_paragraph();
                self.containers.pop();
                self.tokens
                    .push(Token::block(TokenKind::BLOCKQUOTE_CLOSE, "blockquote", Nesting::Close));
            }
            TagEnd::CodeBlock => {
                if let Some(token) = self.code.take() {
                    self.tokens.push(token);
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html.take() {
                    self.html_block(html);
                }
            }
            TagEnd::List(ordered) => {
                self.close_hidden_paragraph();
                let token = if ordered {
                    Token::block(TokenKind::ORDERED_LIST_CLOSE, "ol", Nesting::Close)
                } else {
                    Token::block(TokenKind::BULLET_LIST_CLOSE, "ul", Nesting::Close)
                };
                self.tokens.push(token);
            }
            TagEnd::Item => {
                self.close_hidden_paragraph();
                self.containers.pop();
                self.tokens
                    .push(Token::block(TokenKind::LIST_ITEM_CLOSE, "li", Nesting::Close));
            }
            TagEnd::DefinitionList => {
                self.close_hidden_paragraph();
                self.tokens.push(Token::block(TokenKind::DL_CLOSE, "dl", Nesting::Close));
            }
            TagEnd::DefinitionListTitle => {
                self.flush_inline();
                self.tokens.push(Token::block(TokenKind::DT_CLOSE, "dt", Nesting::Close));
            }
            TagEnd::DefinitionListDefinition => {
                self.close_hidden_paragraph();
                self.containers.pop();
                self.tokens.push(Token::block(TokenKind::DD_CLOSE, "dd", Nesting::Close));
            }
            TagEnd::Table => {
                if self.table.body_open {
                    self.tokens
                        .push(Token::block(TokenKind::TBODY_CLOSE, "tbody", Nesting::Close));
                }
                self.tokens
                    .push(Token::block(TokenKind::TABLE_CLOSE, "table", Nesting::Close));
                self.table = TableState::default();
            }
            TagEnd::TableHead => {
                self.tokens.push(Token::block(TokenKind::TR_CLOSE, "tr", Nesting::Close));
                self.tokens
                    .push(Token::block(TokenKind::THEAD_CLOSE, "thead", Nesting::Close));
                self.table.in_head = false;
            }
            TagEnd::TableRow => {
                self.tokens.push(Token::block(TokenKind::TR_CLOSE, "tr", Nesting::Close));
            }
            TagEnd::TableCell => {
                self.flush_inline();
                self.containers.pop();
                let token = if self.table.in_head {
                    Token::block(TokenKind::TH_CLOSE, "th", Nesting::Close)
                } else {
                    Token::block(TokenKind::TD_CLOSE, "td", Nesting::Close)
                };
                self.tokens.push(token);
                self.table.cell += 1;
            }
            TagEnd::Emphasis => self.push_inline(Token::new(TokenKind::EM_CLOSE, "em", Nesting::Close)),
            TagEnd::Strong => self.push_inline(Token::new(TokenKind::STRONG_CLOSE, "strong", Nesting::Close)),
            TagEnd::Strikethrough => self.push_inline(Token::new(TokenKind::S_CLOSE, "s", Nesting::Close)),
            TagEnd::Superscript => self.push_inline(Token::new(TokenKind::SUP_CLOSE, "sup", Nesting::Close)),
            TagEnd::Subscript => self.push_inline(Token::new(TokenKind::SUB_CLOSE, "sub", Nesting::Close)),
            TagEnd::Link => {
                if self.links.pop() == Some(true) {
                    self.push_inline(Token::new(TokenKind::LINK_CLOSE, "a", Nesting::Close));
                }
            }
            TagEnd::Image => {
                if let Some(mut image) = self.images.pop() {
                    if validate_link(image.attr("src").unwrap_or_default()) {
                        let alt = image.children_text();
                        image.set_attr("alt", alt);
                        self.push_inline(image);
                    } else {
                        for child in std::mem::take(&mut image.children) {
                            self.push_inline(child);
                        }
                    }
                }
            }
            TagEnd::FootnoteDefinition | TagEnd::MetadataBlock(_) => {}
        }
    }

    /// Push a block token, closing a pending hidden paragraph first.
    fn push_block(&mut self, token: Token) {
        self.close_hidden_paragraph();
        self.tokens.push(token);
    }

    fn push_inline(&mut self, token: Token) {
        self.inline_mut().push(token);
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = &mut self.code {
            code.content.push_str(text);
            return;
        }
        if let Some(html) = &mut self.html {
            html.push_str(text);
            return;
        }

        let inline = self.inline_mut();
        match inline.last_mut() {
            Some(last) if last.kind == TokenKind::TEXT => last.content.push_str(text),
            _ => inline.push(Token::text(text)),
        }
    }

    fn inline_html(&mut self, html: &str) {
        if self.options.html {
            self.push_inline(Token::new(TokenKind::HTML_INLINE, "", Nesting::Leaf).with_content(html));
        } else {
            self.text(html);
        }
    }

    fn html_block(&mut self, mut html: String) {
        if self.options.html {
            if !html.ends_with('\n') {
                html.push('\n');
            }
            let mut token = Token::block(TokenKind::HTML_BLOCK, "", Nesting::Leaf);
            token.content = html;
            self.tokens.push(token);
            return;
        }

        // Without raw HTML the block reads as a paragraph of literal text.
        self.tokens
            .push(Token::block(TokenKind::PARAGRAPH_OPEN, "p", Nesting::Open));
        let mut inline = Token::block(TokenKind::INLINE, "", Nesting::Leaf);
        inline.children.push(Token::text(html.trim_end_matches('\n')));
        self.tokens.push(inline);
        self.tokens
            .push(Token::block(TokenKind::PARAGRAPH_CLOSE, "p", Nesting::Close));
    }

    /// Children list that inline content goes to, opening one if needed.
    fn inline_mut(&mut self) -> &mut Vec<Token> {
        if !self.images.is_empty() {
            let top = self.images.len() - 1;
            return &mut self.images[top].children;
        }
        if self.inline.is_none() {
            if self.containers.last() == Some(&Container::Item) && !self.hidden_paragraph {
                let mut open = Token::block(TokenKind::PARAGRAPH_OPEN, "p", Nesting::Open);
                open.hidden = true;
                self.tokens.push(open);
                self.hidden_paragraph = true;
            }
            self.inline = Some(Vec::new());
        }
        self.inline.get_or_insert_with(Vec::new)
    }

    fn flush_inline(&mut self) {
        if let Some(children) = self.inline.take() {
            let mut token = Token::block(TokenKind::INLINE, "", Nesting::Leaf);
            token.children = children;
            self.tokens.push(token);
        }
    }

    fn close_hidden_paragraph(&mut self) {
        self.flush_inline();
        if self.hidden_paragraph {
            let mut close = Token::block(TokenKind::PARAGRAPH_CLOSE, "p", Nesting::Close);
            close.hidden = true;
            self.tokens.push(close);
            self.hidden_paragraph = false;
        }
    }
}
