//! Randomized production rules for the shortcode grammar.
//!
//! Every generator draws from a caller-supplied [`Unstructured`] and returns
//! a [`Token`] carrying the surface text together with the parse tree the
//! grammar must produce for it. The two are appended in lockstep, which is
//! the oracle's core correctness invariant: the tag encoding is a function
//! of the sequence of generator calls, never of the literal text.

use arbitrary::{Arbitrary, Unstructured};

use crate::node::{NodeKind, Token};

/// Probability that an argument loop emits one more argument.
///
/// Continuation draws are single [`bool::arbitrary`] bits, so argument
/// counts follow a geometric distribution with this parameter and the
/// expected nesting depth of recursive shortcode arguments is finite.
/// `Unstructured` yields zeroed data once its buffer drains, which turns
/// every further draw into `false`: generation is additionally bounded by
/// the entropy budget, and the bound only truncates instances deeper than
/// the budget allows, leaving shallow instances undisturbed.
pub const CONTINUE_PROBABILITY: f64 = 0.5;

/// One in ten generated instances uses the escaped delimiter variant.
pub const ESCAPED_RATIO: (u32, u32) = (1, 10);

const OPEN_PLAIN: &str = "{{< ";
const CLOSE_PLAIN: &str = " >}}";
const OPEN_ESCAPED: &str = "{{{< ";
const CLOSE_ESCAPED: &str = " >}}}";

/// Shortcode name.
// TODO: vary the identifier length and alphabet once the grammar's name
// lexing has dedicated corpus coverage.
pub fn name() -> Token {
    Token::leaf(NodeKind::Name, "call")
}

/// Unquoted string content. The brackets are characters that would require
/// quoting in other contexts, which is the edge the grammar must lex past.
pub fn naked_string() -> Token {
    Token::leaf(NodeKind::NakedString, "val[]ue")
}

/// `true` or `false`, uniformly.
pub fn boolean(u: &mut Unstructured<'_>) -> arbitrary::Result<Token> {
    let text = if bool::arbitrary(u)? { "true" } else { "false" };
    Ok(Token::leaf(NodeKind::Boolean, text))
}

/// A signed integer or a two-decimal float, 50/50, each in a small range.
/// The grammar only has to accept the form, not a minimal one.
pub fn number(u: &mut Unstructured<'_>) -> arbitrary::Result<Token> {
    let text = if bool::arbitrary(u)? {
        let n: i32 = u.int_in_range(-100..=100)?;
        itoa::Buffer::new().format(n).to_string()
    } else {
        let centi: i32 = u.int_in_range(-9_999..=9_999)?;
        ryu::Buffer::new().format(f64::from(centi) / 100.0).to_string()
    };
    Ok(Token::leaf(NodeKind::Number, text))
}

/// Naked-string content wrapped in a uniformly chosen `"` or `'`.
// TODO: embed the chosen quote and escape sequences in the content once the
// grammar documents its escaping rules for string literals.
pub fn quoted_string(u: &mut Unstructured<'_>) -> arbitrary::Result<Token> {
    let quote = if bool::arbitrary(u)? { '"' } else { '\'' };
    let inner = naked_string();
    let text = format!("{quote}{}{quote}", inner.text);
    Ok(Token::leaf(NodeKind::QuotedString, text))
}

/// One positional argument value: a uniform choice over the primitive
/// producers and a nested plain shortcode.
pub fn argument(u: &mut Unstructured<'_>) -> arbitrary::Result<Token> {
    match u.int_in_range(0u8..=4)? {
        0 => Ok(naked_string()),
        1 => boolean(u),
        2 => number(u),
        3 => quoted_string(u),
        _ => shortcode(u, false),
    }
}

/// `key = value` with zero to two spaces on either side of the operator.
/// Spacing is insignificant to the grammar at this level, so only the key
/// and value tags appear in the encoding.
pub fn keyed_argument(u: &mut Unstructured<'_>) -> arbitrary::Result<Token> {
    let key = name();
    let pre = spaces(u)?;
    let post = spaces(u)?;
    let value = argument(u)?;
    let text = format!("{}{pre}={post}{}", key.text, value.text);
    Ok(Token::branch(NodeKind::KeywordParam, text, [&key, &value]))
}

/// A full shortcode instance: delimiters, mandatory name, then two
/// independent 50%-continuation argument loops (positional, then keyed).
/// `escaped` selects the triple-brace delimiter pair on both ends.
pub fn shortcode(u: &mut Unstructured<'_>, escaped: bool) -> arbitrary::Result<Token> {
    let (open, close, kind) = if escaped {
        (OPEN_ESCAPED, CLOSE_ESCAPED, NodeKind::ShortcodeEscaped)
    } else {
        (OPEN_PLAIN, CLOSE_PLAIN, NodeKind::Shortcode)
    };

    let mut text = String::from(open);
    let mut children = vec![Token::leaf(NodeKind::Delimiter, open)];

    let name = name();
    text.push_str(&name.text);
    children.push(name);

    while continues(u)? {
        let arg = argument(u)?;
        text.push(' ');
        text.push_str(&arg.text);
        children.push(arg);
    }
    while continues(u)? {
        let arg = keyed_argument(u)?;
        text.push(' ');
        text.push_str(&arg.text);
        children.push(arg);
    }

    text.push_str(close);
    children.push(Token::leaf(NodeKind::Delimiter, close));

    Ok(Token::branch(kind, text, &children))
}

/// One continuation draw for the argument loops. See [`CONTINUE_PROBABILITY`].
fn continues(u: &mut Unstructured<'_>) -> arbitrary::Result<bool> {
    bool::arbitrary(u)
}

fn spaces(u: &mut Unstructured<'_>) -> arbitrary::Result<&'static str> {
    Ok(match u.int_in_range(0u8..=2)? {
        0 => "",
        1 => " ",
        _ => "  ",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    fn rand_u<'a>(rng: &mut StdRng, buf: &'a mut [u8]) -> Unstructured<'a> {
        rng.fill_bytes(buf);
        Unstructured::new(buf)
    }

    #[test]
    fn zero_entropy_is_the_minimal_plain_shortcode() {
        // An empty buffer fails every continuation draw, which forces the
        // zero-positional, zero-keyed instance.
        let mut u = Unstructured::new(&[]);
        let token = shortcode(&mut u, false).unwrap();
        assert_eq!(token.text, "{{< call >}}");
        assert_eq!(
            token.sexp,
            "(shortcode(shortcode_delimiter)(shortcode_name)(shortcode_delimiter))"
        );
    }

    #[test]
    fn zero_entropy_escaped_variant() {
        let mut u = Unstructured::new(&[]);
        let token = shortcode(&mut u, true).unwrap();
        assert_eq!(token.text, "{{{< call >}}}");
        assert_eq!(
            token.sexp,
            "(shortcode_escaped(shortcode_delimiter)(shortcode_name)(shortcode_delimiter))"
        );
    }

    #[test]
    fn delimiters_never_cross_match() {
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..200 {
            let mut buf = [0u8; 512];
            let mut u = rand_u(&mut rng, &mut buf);
            let escaped = i % 2 == 0;
            let token = shortcode(&mut u, escaped).unwrap();
            if escaped {
                assert!(token.text.starts_with("{{{< "));
                assert!(token.text.ends_with(" >}}}"));
                assert!(token.sexp.starts_with("(shortcode_escaped("));
            } else {
                assert!(token.text.starts_with("{{< "));
                assert!(!token.text.starts_with("{{{"));
                assert!(token.text.ends_with(" >}}"));
                assert!(!token.text.ends_with("}}}"));
                assert!(token.sexp.starts_with("(shortcode("));
            }
        }
    }

    #[test]
    fn name_follows_opening_delimiter_exactly_once() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut buf = [0u8; 512];
            let mut u = rand_u(&mut rng, &mut buf);
            let token = shortcode(&mut u, false).unwrap();
            assert!(token
                .sexp
                .starts_with("(shortcode(shortcode_delimiter)(shortcode_name)"));
            assert!(token.sexp.ends_with("(shortcode_delimiter))"));
        }
    }

    #[test]
    fn boolean_is_exactly_true_or_false() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..100 {
            let mut buf = [0u8; 8];
            let mut u = rand_u(&mut rng, &mut buf);
            let token = boolean(&mut u).unwrap();
            assert!(token.text == "true" || token.text == "false");
            assert_eq!(token.sexp, "(shortcode_boolean)");
        }
    }

    #[test]
    fn number_is_within_generated_bounds() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let mut buf = [0u8; 16];
            let mut u = rand_u(&mut rng, &mut buf);
            let token = number(&mut u).unwrap();
            let value: f64 = token.text.parse().unwrap();
            assert!((-100.0..=100.0).contains(&value), "{}", token.text);
            assert_eq!(token.sexp, "(shortcode_number)");
        }
    }

    #[test]
    fn quoted_string_uses_matching_quotes() {
        let mut rng = StdRng::seed_from_u64(19);
        for _ in 0..100 {
            let mut buf = [0u8; 8];
            let mut u = rand_u(&mut rng, &mut buf);
            let token = quoted_string(&mut u).unwrap();
            let first = token.text.chars().next().unwrap();
            assert!(first == '"' || first == '\'');
            assert!(token.text.ends_with(first));
            assert_eq!(&token.text[1..token.text.len() - 1], "val[]ue");
        }
    }

    #[test]
    fn keyed_argument_encodes_key_then_value() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..200 {
            let mut buf = [0u8; 256];
            let mut u = rand_u(&mut rng, &mut buf);
            let token = keyed_argument(&mut u).unwrap();
            assert!(token.text.contains('='));
            assert!(token
                .sexp
                .starts_with("(shortcode_keyword_param(shortcode_name)"));
            assert!(token.sexp.ends_with(')'));
            // spacing around '=' is at most two spaces per side
            let eq = token.text.find('=').unwrap();
            let before = token.text[..eq].chars().rev().take_while(|c| *c == ' ').count();
            let after = token.text[eq + 1..].chars().take_while(|c| *c == ' ').count();
            assert!(before <= 2 && after <= 2);
        }
    }

    #[test]
    fn continuation_frequency_matches_constant() {
        let mut rng = StdRng::seed_from_u64(29);
        let mut buf = [0u8; 10_000];
        rng.fill_bytes(&mut buf);
        let mut u = Unstructured::new(&buf);
        let mut hits = 0usize;
        let total = 10_000;
        for _ in 0..total {
            hits += usize::from(continues(&mut u).unwrap());
        }
        let freq = hits as f64 / total as f64;
        assert!((freq - CONTINUE_PROBABILITY).abs() < 0.05, "freq {freq}");
    }

    #[test]
    fn generation_is_deterministic_for_a_fixed_buffer() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut buf = [0u8; 1024];
        rng.fill_bytes(&mut buf);
        let first = shortcode(&mut Unstructured::new(&buf), false).unwrap();
        for _ in 0..50 {
            let again = shortcode(&mut Unstructured::new(&buf), false).unwrap();
            assert_eq!(first, again);
        }
    }
}
