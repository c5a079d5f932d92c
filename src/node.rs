use std::fmt;

/// Grammar productions that can appear in a shortcode parse tree.
///
/// `as_str` returns the literal tag the external parser prints for the
/// production, so the expected encoding can be compared byte-for-byte
/// against the parser's serialized tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, enum_iterator::Sequence)]
pub enum NodeKind {
    /// A live shortcode, `{{< … >}}`.
    Shortcode,
    /// An inert shortcode with an extra brace layer, `{{{< … >}}}`.
    ShortcodeEscaped,
    Delimiter,
    Name,
    NakedString,
    Boolean,
    Number,
    QuotedString,
    KeywordParam,
    /// The embedding context the document grammar wraps inline content in.
    Inline,
}

impl NodeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shortcode => "shortcode",
            Self::ShortcodeEscaped => "shortcode_escaped",
            Self::Delimiter => "shortcode_delimiter",
            Self::Name => "shortcode_name",
            Self::NakedString => "shortcode_naked_string",
            Self::Boolean => "shortcode_boolean",
            Self::Number => "shortcode_number",
            Self::QuotedString => "shortcode_string",
            Self::KeywordParam => "shortcode_keyword_param",
            Self::Inline => "inline",
        }
    }

    /// Every production tag, in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        enum_iterator::all::<Self>()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated span of shortcode source, paired with the parse tree a
/// correct grammar implementation must produce for it.
///
/// `text` is the literal surface form. `sexp` is the fully-parenthesized
/// prefix encoding of the node kinds, `(tag child…)` with `(tag)` leaves.
/// Both sides are built by the same sequence of generator calls, so the
/// nesting and ordering of tags in `sexp` mirrors generation order exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub sexp: String,
}

impl Token {
    pub(crate) fn leaf(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sexp: format!("({})", kind.as_str()),
        }
    }

    /// Interior node: `text` is the already-concatenated surface form,
    /// `children` contribute their encodings in order.
    pub(crate) fn branch<'a>(
        kind: NodeKind,
        text: String,
        children: impl IntoIterator<Item = &'a Token>,
    ) -> Self {
        let mut sexp = format!("({}", kind.as_str());
        for child in children {
            sexp.push_str(&child.sexp);
        }
        sexp.push(')');
        Self { text, sexp }
    }
}
