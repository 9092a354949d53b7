//! Lexer for the path mini-language.
//!
//! ```text
//! token      := command | number
//! command    := one ASCII letter, case encodes absolute/relative
//! number     := '-'? ( digits ('.' digits*)? | '.' digits+ )
//! separator  := (whitespace | ',')+   -- elided, not emitted
//! ```
//!
//! Adjacent tokens need no separator: a command letter can run straight
//! into a number, and two numbers may be split only by the second one's
//! leading `-` or `.`. There is no exponent form.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, multispace1, satisfy},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::many0,
    sequence::{pair, preceded, terminated},
    Finish, IResult,
};

use crate::Error;

/// A single lexical item of path data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// One ASCII letter; uppercase means absolute coordinates.
    Command(char),
    /// A signed decimal number.
    Number(f64),
}

fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(pair(
            opt(char('-')),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
        )),
        |s: &str| s.parse::<f64>(),
    )(input)
}

fn command(input: &str) -> IResult<&str, char> {
    satisfy(|c| c.is_ascii_alphabetic())(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((map(command, Token::Command), map(number, Token::Number)))(input)
}

fn separator(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((multispace1, tag(",")))))(input)
}

/// Lexes a whole path-data string into an ordered token sequence.
///
/// The scan is whole-input and fail-fast: every byte must belong to a
/// token or a separator, and any uncovered byte voids the entire result
/// (no partial token list), reporting the offset of the first byte that
/// could not be matched.
pub fn tokenize(path: &str) -> Result<Vec<Token>, Error> {
    all_consuming(terminated(many0(preceded(separator, token)), separator))(path)
        .finish()
        .map(|(_, tokens)| tokens)
        .map_err(|err: nom::error::Error<&str>| Error::MalformedPath(path.len() - err.input.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: f64) -> Token {
        Token::Number(value)
    }

    #[test]
    fn commands_and_numbers() {
        assert_eq!(
            tokenize("M10,10"),
            Ok(vec![Token::Command('M'), n(10.0), n(10.0)])
        );
    }

    #[test]
    fn adjacent_tokens_need_no_separator() {
        assert_eq!(
            tokenize("l10-5.5.5"),
            Ok(vec![Token::Command('l'), n(10.0), n(-5.5), n(0.5)])
        );
    }

    #[test]
    fn separators_are_elided() {
        assert_eq!(
            tokenize("  M 10 , -20 ,.5  "),
            Ok(vec![Token::Command('M'), n(10.0), n(-20.0), n(0.5)])
        );
    }

    #[test]
    fn trailing_dot_binds_to_the_number() {
        assert_eq!(tokenize("10. .5"), Ok(vec![n(10.0), n(0.5)]));
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(tokenize(""), Ok(vec![]));
    }

    #[test]
    fn exponents_split_into_three_tokens() {
        // The grammar has no exponent form; 'e' lexes as a command letter.
        assert_eq!(
            tokenize("1e3"),
            Ok(vec![n(1.0), Token::Command('e'), n(3.0)])
        );
    }

    #[test]
    fn uncovered_byte_voids_the_whole_input() {
        assert_eq!(tokenize("M10,#20"), Err(Error::MalformedPath(4)));
        assert_eq!(tokenize("-"), Err(Error::MalformedPath(0)));
    }
}
