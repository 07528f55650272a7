//! Naming-convention parser.
//!
//! Turns a data-access method identifier into a [`Query`] intent.
//!
//! # Shape
//!
//! ```text
//! FindUsersByBirthdayGTEAndNameLike
//! ─┬── ──┬─ ┬ ────┬───── ┬─ ──┬───
//!  │     │  │     │      │    └── field `Name`, operator LIKE
//!  │     │  │     │      └── connective
//!  │     │  │     └── field `Birthday`, operator GTE
//!  │     │  └── clause separator
//!  │     └── ignored
//!  └── subject verb
//! ```
//!
//! Words come from capitalization runs (`URLPath` is `URL` + `Path`) or from
//! underscores, so `find_by_birthday_gte` reads the same as `FindByBirthdayGTE`.

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{digit0, digit1, satisfy},
    combinator::{not, recognize},
    multi::many1,
    sequence::{pair, terminated},
    IResult,
};

use crate::ast::*;
use crate::error::{MsqlError, MsqlResult};

/// Recognized comparison suffixes as word sequences, longest first.
const SUFFIXES: &[(&[&str], Operator)] = &[
    (&["greater", "than", "equal"], Operator::Gte),
    (&["less", "than", "equal"], Operator::Lte),
    (&["is", "not", "null"], Operator::IsNotNull),
    (&["greater", "than"], Operator::Gt),
    (&["less", "than"], Operator::Lt),
    (&["is", "null"], Operator::IsNull),
    (&["not", "null"], Operator::IsNotNull),
    (&["not", "like"], Operator::NotLike),
    (&["not", "in"], Operator::NotIn),
    (&["is", "not"], Operator::Neq),
    (&["gte"], Operator::Gte),
    (&["gt"], Operator::Gt),
    (&["after"], Operator::Gt),
    (&["lte"], Operator::Lte),
    (&["lt"], Operator::Lt),
    (&["before"], Operator::Lt),
    (&["neq"], Operator::Neq),
    (&["not"], Operator::Neq),
    (&["eq"], Operator::Eq),
    (&["is"], Operator::Eq),
    (&["equals"], Operator::Eq),
    (&["like"], Operator::Like),
    (&["in"], Operator::In),
    (&["between"], Operator::Between),
    (&["null"], Operator::IsNull),
];

/// One word of an identifier with its byte span.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

impl Word<'_> {
    fn is(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Read the subject verb of `identifier`.
pub fn parse_subject(identifier: &str) -> MsqlResult<Subject> {
    let words = split_words(identifier)?;
    words
        .first()
        .and_then(subject_of)
        .ok_or_else(|| MsqlError::UnrecognizedSubject(identifier.to_string()))
}

/// Parse `identifier` into a query intent.
///
/// `Ok(None)` means no query is derivable (the verb is not a known subject) and the
/// caller may fall back to another source. A known verb with a malformed clause is an error.
pub fn parse(identifier: &str) -> MsqlResult<Option<Query>> {
    let words = split_words(identifier)?;
    let Some(subject) = words.first().and_then(subject_of) else {
        return Ok(None);
    };

    let query = Query::new(subject);
    let Some(by) = words.iter().skip(1).position(|w| w.is("by")) else {
        return Ok(Some(query));
    };

    let clause = &words[by + 2..];
    let group = parse_clause(identifier, clause)?;
    Ok(Some(query.with_filter_group(group)))
}

fn subject_of(word: &Word<'_>) -> Option<Subject> {
    match word.text.to_ascii_lowercase().as_str() {
        "find" => Some(Subject::Find),
        "count" => Some(Subject::Count),
        "exists" => Some(Subject::Exists),
        "delete" => Some(Subject::Delete),
        _ => None,
    }
}

/// Split the predicate clause on `And`/`Or` and parse each segment.
fn parse_clause(identifier: &str, clause: &[Word<'_>]) -> MsqlResult<FilterGroup> {
    if clause.is_empty() {
        return Err(MsqlError::parse(identifier, "empty predicate clause after 'By'"));
    }

    let mut segments: Vec<(Option<Connective>, &[Word<'_>])> = Vec::new();
    let mut pending: Option<Connective> = None;
    let mut start = 0;
    for (i, word) in clause.iter().enumerate() {
        let connective = if word.is("and") {
            Connective::And
        } else if word.is("or") {
            Connective::Or
        } else {
            continue;
        };
        segments.push((pending, &clause[start..i]));
        pending = Some(connective);
        start = i + 1;
    }
    segments.push((pending, &clause[start..]));

    let mut group: Option<FilterGroup> = None;
    for (connective, segment) in segments {
        let predicate = parse_segment(identifier, segment, connective)?;
        group = Some(match (group, connective) {
            (None, _) => FilterGroup::new(predicate),
            (Some(g), Some(c)) => chain(g, c, predicate),
            (Some(g), None) => g.and(predicate),
        });
    }
    group.ok_or_else(|| MsqlError::parse(identifier, "empty predicate clause after 'By'"))
}

/// Append left-associatively: a change of connective closes everything so far
/// into a sub-group, so `A Or B And C` reads `(A OR B) AND C`.
fn chain(group: FilterGroup, connective: Connective, predicate: FilterPredicate) -> FilterGroup {
    match group.connectives().last() {
        Some(last) if *last != connective => FilterGroup::new(group).push(connective, predicate),
        _ => group.push(connective, predicate),
    }
}

/// Parse `<field words><suffix words>` into a predicate.
fn parse_segment(
    identifier: &str,
    segment: &[Word<'_>],
    before: Option<Connective>,
) -> MsqlResult<FilterPredicate> {
    let (field_words, op) = strip_suffix(segment);
    let (Some(first), Some(last)) = (field_words.first(), field_words.last()) else {
        let position = match before {
            Some(c) => format!("after '{:?}'", c),
            None => "at the start of the clause".to_string(),
        };
        return Err(MsqlError::parse(
            identifier,
            format!("empty field segment {}", position),
        ));
    };
    let field = identifier[first.start..last.end].trim_matches('_');
    Ok(FilterPredicate::new(field, op))
}

fn strip_suffix<'s, 'a>(segment: &'s [Word<'a>]) -> (&'s [Word<'a>], Operator) {
    for (suffix, op) in SUFFIXES {
        if segment.len() < suffix.len() {
            continue;
        }
        let split = segment.len() - suffix.len();
        let tail = &segment[split..];
        if tail.iter().zip(suffix.iter()).all(|(w, s)| w.is(s)) {
            return (&segment[..split], *op);
        }
    }
    (segment, Operator::Eq)
}

/// Tokenize an identifier into words.
fn split_words(identifier: &str) -> MsqlResult<Vec<Word<'_>>> {
    let mut words = Vec::new();
    let mut rest = identifier;
    loop {
        let (after_sep, _) = separators(rest).map_err(|_| tokenize_error(identifier, rest))?;
        rest = after_sep;
        if rest.is_empty() {
            break;
        }
        let (remaining, text) = word(rest).map_err(|_| tokenize_error(identifier, rest))?;
        let start = identifier.len() - rest.len();
        words.push(Word {
            text,
            start,
            end: start + text.len(),
        });
        rest = remaining;
    }
    if words.is_empty() {
        return Err(MsqlError::parse(identifier, "empty identifier"));
    }
    Ok(words)
}

fn tokenize_error(identifier: &str, rest: &str) -> MsqlError {
    MsqlError::parse(
        identifier,
        format!(
            "unexpected character at position {}",
            identifier.len() - rest.len()
        ),
    )
}

fn separators(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c == '_')(input)
}

/// A single word: an acronym run, a capitalized word, a lowercase run, or digits.
fn word(input: &str) -> IResult<&str, &str> {
    alt((acronym, capitalized, lowercase, digit1))(input)
}

/// Uppercase run that stops before an `Upper` + `lower` pair (`URL` in `URLPath`).
fn acronym(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        many1(terminated(
            satisfy(|c| c.is_ascii_uppercase()),
            not(satisfy(|c| c.is_ascii_lowercase())),
        )),
        digit0,
    ))(input)
}

fn capitalized(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_uppercase()),
        take_while(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()),
    ))(input)
}

fn lowercase(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_lowercase()),
        take_while(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()),
    ))(input)
}
