//! Named-parameter compiler.
//!
//! Rewrites `:name` placeholders into the dialect's positional bind syntax and
//! records the names in occurrence order. Quoted literals, quoted identifiers
//! and comments pass through untouched, as does the `::` cast operator. `#`
//! starts a line comment only under MySQL; elsewhere it is an operator.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_till1, take_until, take_while1},
    character::complete::{anychar, char},
    combinator::{cut, map, opt, recognize},
    multi::many0_count,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{MsqlError, MsqlResult};

/// SQL in positional form plus the placeholder names, one per occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundQuery {
    pub sql: String,
    pub names: Vec<String>,
}

impl BoundQuery {
    /// Compile against a dialect given by name.
    pub fn compile(dialect: &str, sql: &str) -> MsqlResult<Self> {
        compile_named_query(sql, Dialect::from_name(dialect)?)
    }

    pub fn has_placeholders(&self) -> bool {
        !self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fragment<'a> {
    Text(&'a str),
    Param(&'a str),
}

/// Compile `sql` for `dialect`. Names are not de-duplicated.
pub fn compile_named_query(sql: &str, dialect: Dialect) -> MsqlResult<BoundQuery> {
    let style = dialect.bind_style();
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut rest = sql;

    while !rest.is_empty() {
        let (next, frag) = fragment(rest, dialect).map_err(|_| {
            let at = sql.len() - rest.len();
            MsqlError::parse(sql, format!("unterminated quoted literal at position {}", at))
        })?;
        match frag {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Param(name) => {
                names.push(name.to_string());
                out.push_str(&style.placeholder(names.len()));
            }
        }
        rest = next;
    }

    tracing::trace!("compiled {} placeholder(s) for {}: {}", names.len(), dialect, out);
    Ok(BoundQuery { sql: out, names })
}

fn fragment(input: &str, dialect: Dialect) -> IResult<&str, Fragment<'_>> {
    if dialect == Dialect::MySql {
        if let Ok((rest, comment)) = hash_comment(input) {
            return Ok((rest, Fragment::Text(comment)));
        }
    }
    alt((
        map(
            alt((
                quoted('\''),
                quoted('"'),
                quoted('`'),
                line_comment,
                block_comment,
                tag("::"),
            )),
            Fragment::Text,
        ),
        map(param, Fragment::Param),
        map(take_till1(is_special), Fragment::Text),
        map(recognize(anychar), Fragment::Text),
    ))(input)
}

fn is_special(c: char) -> bool {
    matches!(c, '\'' | '"' | '`' | ':' | '-' | '/' | '#')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// `:name`
fn param(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(is_name_char))(input)
}

/// A literal delimited by `quote`, honouring backslash escapes and doubled quotes.
/// Once the opening quote is seen, a missing close is a hard failure.
fn quoted(quote: char) -> impl FnMut(&str) -> IResult<&str, &str> {
    move |input| {
        let stop: &str = match quote {
            '\'' => "'\\",
            '"' => "\"\\",
            _ => "`\\",
        };
        recognize(preceded(
            char(quote),
            cut(terminated(
                many0_count(alt((
                    is_not(stop),
                    recognize(pair(char('\\'), anychar)),
                    recognize(pair(char(quote), char(quote))),
                ))),
                char(quote),
            )),
        ))(input)
    }
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("--"), opt(is_not("\n"))))(input)
}

fn hash_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('#'), opt(is_not("\n"))))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}
