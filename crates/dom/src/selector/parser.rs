//! Selector string parser
//!
//! The grammar is a pragmatic subset of CSS: comma groups, the descendant
//! (` `), child (`>`) and previous-sibling (`~`) combinators, compound
//! selectors made of a tag, `#id`, `.class`, `[attribute]` predicates and a
//! handful of structural pseudo-classes. Parsing never fails; unsupported
//! fragments degrade to `Selector::False`.

use super::{AttributeOperator, NthPattern, Selector, SelectorId, SelectorList};

/// Parse a selector string into a `SelectorList`
pub fn parse(input: &str) -> SelectorList {
    let mut builder = SelectorBuilder::default();
    let root = builder.parse_list(input);
    tracing::trace!(
        "parsed selector {:?} into {} nodes",
        input,
        builder.nodes.len()
    );
    SelectorList::from_parts(builder.nodes, root)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    PreviousSibling,
}

#[derive(Default)]
struct SelectorBuilder {
    nodes: Vec<Selector>,
}

impl SelectorBuilder {
    fn push(&mut self, selector: Selector) -> SelectorId {
        let id = self.nodes.len() as SelectorId;
        self.nodes.push(selector);
        id
    }

    /// Comma groups, always wrapped in an `Or`
    fn parse_list(&mut self, input: &str) -> SelectorId {
        let mut groups = Vec::new();
        for group in split_top_level(input, b',') {
            let group = group.trim().to_ascii_lowercase();
            if let Some(id) = self.parse_group(&group) {
                groups.push(id);
            }
        }
        self.push(Selector::Or(groups))
    }

    /// One comma-free group; `None` when blank
    fn parse_group(&mut self, group: &str) -> Option<SelectorId> {
        let group = group.trim();
        if group.is_empty() {
            return None;
        }

        let Some((index, combinator)) = find_last_combinator(group) else {
            return Some(self.parse_compound(group));
        };

        let left = self.parse_side(&group[..index]);
        let local = self.parse_side(&group[index + 1..]);
        let selector = match combinator {
            Combinator::Descendant => Selector::AncestorAndLocal {
                ancestor: left,
                local,
            },
            Combinator::Child => Selector::ParentAndLocal {
                parent: left,
                local,
            },
            Combinator::PreviousSibling => Selector::PreviousSiblingAndLocal {
                sibling: left,
                local,
            },
        };
        Some(self.push(selector))
    }

    fn parse_side(&mut self, side: &str) -> SelectorId {
        match self.parse_group(side) {
            Some(id) => id,
            None => {
                tracing::debug!("dangling combinator in selector, never matches");
                self.push(Selector::False)
            }
        }
    }

    /// Compound selector such as `a.foo#bar[x=1]:first-child`
    fn parse_compound(&mut self, compound: &str) -> SelectorId {
        let mut parts = Vec::new();
        for fragment in split_compound(compound) {
            if let Some(selector) = parse_simple(fragment) {
                parts.push(self.push(selector));
            }
        }

        match parts.len() {
            // Only always-true predicates, e.g. `:nth-child(n)`
            0 => self.push(Selector::Tag("*".to_string())),
            1 => parts[0],
            _ => self.push(Selector::And(parts)),
        }
    }
}

/// A single simple selector; `None` for predicates that hold everywhere
fn parse_simple(fragment: &str) -> Option<Selector> {
    let selector = match fragment.as_bytes()[0] {
        b'.' => non_empty(&fragment[1..]).map_or(Selector::False, |c| Selector::Class(c.into())),
        b'#' => non_empty(&fragment[1..]).map_or(Selector::False, |i| Selector::Id(i.into())),
        b'[' => parse_attribute(fragment),
        b':' => return parse_pseudo_class(fragment),
        _ => Selector::Tag(fragment.to_string()),
    };
    Some(selector)
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// `[name]`, `[name=value]`, `[name^="value"]`, ...
fn parse_attribute(fragment: &str) -> Selector {
    let Some(inner) = fragment
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        tracing::debug!("unterminated attribute selector {:?}", fragment);
        return Selector::False;
    };

    let Some(eq) = inner.find('=') else {
        let name = inner.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Selector::False;
        }
        return Selector::HasAttribute(name);
    };
    if eq == 0 {
        tracing::debug!("attribute selector {:?} has no name", fragment);
        return Selector::False;
    }

    let (mut name, raw_value) = (&inner[..eq], &inner[eq + 1..]);
    let operator = match name.as_bytes()[name.len() - 1] {
        b'^' => AttributeOperator::StartsWith,
        b'$' => AttributeOperator::EndsWith,
        b'*' => AttributeOperator::Contains,
        b'~' => AttributeOperator::ContainsWord,
        b'|' => AttributeOperator::ContainsPrefix,
        _ => AttributeOperator::Equals,
    };
    if operator != AttributeOperator::Equals {
        name = &name[..name.len() - 1];
    }

    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        tracing::debug!("attribute selector {:?} has no name", fragment);
        return Selector::False;
    }

    Selector::Attribute {
        name,
        operator,
        value: unquote(raw_value.trim()),
    }
}

/// Strip matching quotes, then drop backslash escapes
fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    let quoted = bytes.len() >= 2
        && matches!(bytes[0], b'"' | b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
        && !is_escaped(bytes, bytes.len() - 1);
    let body = if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_pseudo_class(fragment: &str) -> Option<Selector> {
    let selector = match fragment {
        ":root" => Selector::Root,
        ":empty" => Selector::Empty,
        ":only-child" => Selector::OnlyChild,
        ":only-of-type" => Selector::OnlyOfType,
        ":first-child" => Selector::NthChild(NthPattern::new(0, 1, false)),
        ":last-child" => Selector::NthChild(NthPattern::new(0, 1, true)),
        ":first-of-type" => Selector::NthOfType(NthPattern::new(0, 1, false)),
        ":last-of-type" => Selector::NthOfType(NthPattern::new(0, 1, true)),
        _ => return parse_nth(fragment),
    };
    Some(selector)
}

/// `:nth-child(...)` and friends
fn parse_nth(fragment: &str) -> Option<Selector> {
    let unsupported = || {
        tracing::debug!("unsupported pseudo-class {:?}, never matches", fragment);
        Some(Selector::False)
    };

    let Some(open) = fragment.find('(') else {
        return unsupported();
    };
    let Some(argument) = fragment[open + 1..].strip_suffix(')') else {
        return unsupported();
    };

    let (of_type, reverse) = match &fragment[..open] {
        ":nth-child" => (false, false),
        ":nth-last-child" => (false, true),
        ":nth-of-type" => (true, false),
        ":nth-last-of-type" => (true, true),
        _ => return unsupported(),
    };
    let Some((factor, offset)) = parse_an_plus_b(argument) else {
        return unsupported();
    };

    let pattern = NthPattern::new(factor, offset, reverse);
    if pattern.matches_all() {
        return None;
    }
    Some(if of_type {
        Selector::NthOfType(pattern)
    } else {
        Selector::NthChild(pattern)
    })
}

/// Parse `odd`, `even`, `b` or `an+b` into `(a, b)`
pub(crate) fn parse_an_plus_b(argument: &str) -> Option<(i64, i64)> {
    let expr: String = argument.chars().filter(|c| !c.is_whitespace()).collect();
    match expr.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        "" => return None,
        _ => {}
    }

    let Some(n) = expr.find('n') else {
        return Some((0, parse_offset(&expr)?));
    };

    let factor = match &expr[..n] {
        "" | "+" => 1,
        "-" => -1,
        f => f.parse().ok()?,
    };
    let rest = &expr[n + 1..];
    let offset = if rest.is_empty() {
        0
    } else {
        parse_offset(rest)?
    };
    Some((factor, offset))
}

/// Integer with an optional sign; an explicit `+` may not precede a
/// negative number
fn parse_offset(s: &str) -> Option<i64> {
    match s.strip_prefix('+') {
        Some(unsigned) => {
            let value: i64 = unsigned.parse().ok()?;
            (value >= 0).then_some(value)
        }
        None => s.parse().ok(),
    }
}

/// Bracket, parenthesis and quote tracking for the scanners below
#[derive(Default)]
struct Nesting {
    brackets: usize,
    parens: usize,
    quote: Option<u8>,
}

impl Nesting {
    fn is_top_level(&self) -> bool {
        self.brackets == 0 && self.parens == 0 && self.quote.is_none()
    }

    /// Account for `bytes[i]`. `backwards` swaps opening and closing
    /// delimiters for right-to-left scans.
    fn feed(&mut self, bytes: &[u8], i: usize, backwards: bool) {
        let c = bytes[i];
        if let Some(quote) = self.quote {
            if c == quote && !is_escaped(bytes, i) {
                self.quote = None;
            }
            return;
        }

        let (open_bracket, close_bracket, open_paren, close_paren) = if backwards {
            (b']', b'[', b')', b'(')
        } else {
            (b'[', b']', b'(', b')')
        };
        if (c == b'"' || c == b'\'') && self.brackets > 0 && !is_escaped(bytes, i) {
            self.quote = Some(c);
        } else if c == open_bracket {
            self.brackets += 1;
        } else if c == close_bracket {
            self.brackets = self.brackets.saturating_sub(1);
        } else if c == open_paren {
            self.parens += 1;
        } else if c == close_paren {
            self.parens = self.parens.saturating_sub(1);
        }
    }
}

/// Odd number of backslashes right before `i`
fn is_escaped(bytes: &[u8], i: usize) -> bool {
    bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1
}

/// Split on `separator` outside brackets, parentheses and quotes
fn split_top_level(input: &str, separator: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut nesting = Nesting::default();
    let mut parts = Vec::new();
    let mut start = 0;
    for i in 0..bytes.len() {
        if bytes[i] == separator && nesting.is_top_level() {
            parts.push(&input[start..i]);
            start = i + 1;
        }
        nesting.feed(bytes, i, false);
    }
    parts.push(&input[start..]);
    parts
}

/// Rightmost combinator outside brackets, parentheses and quotes.
/// Whitespace next to `>` or `~` belongs to that combinator.
fn find_last_combinator(group: &str) -> Option<(usize, Combinator)> {
    let bytes = group.as_bytes();
    let mut nesting = Nesting::default();
    for i in (0..bytes.len()).rev() {
        let c = bytes[i];
        if nesting.is_top_level() {
            match c {
                b'>' => return Some((i, Combinator::Child)),
                b'~' => return Some((i, Combinator::PreviousSibling)),
                c if c.is_ascii_whitespace() => {
                    let before = bytes[..i].iter().rev().find(|b| !b.is_ascii_whitespace());
                    if !matches!(before, Some(b'>') | Some(b'~')) {
                        return Some((i, Combinator::Descendant));
                    }
                }
                _ => {}
            }
        }
        nesting.feed(bytes, i, true);
    }
    None
}

/// Split a compound selector before each `.`, `#`, `[` and `:`
fn split_compound(compound: &str) -> Vec<&str> {
    let bytes = compound.as_bytes();
    let mut nesting = Nesting::default();
    let mut fragments = Vec::new();
    let mut start = 0;
    for i in 0..bytes.len() {
        if i > start
            && nesting.is_top_level()
            && matches!(bytes[i], b'.' | b'#' | b'[' | b':')
        {
            fragments.push(&compound[start..i]);
            start = i;
        }
        nesting.feed(bytes, i, false);
    }
    if start < bytes.len() {
        fragments.push(&compound[start..]);
    }
    fragments
}
