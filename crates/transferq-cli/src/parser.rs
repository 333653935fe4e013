//! Argument parsing for the `add` command

use thiserror::Error;

/// Why a line of `add` arguments was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A quoted argument is never closed
    #[error("unbalanced quotes")]
    UnbalancedQuotes,
    /// A bare word contains a quote
    #[error("quote inside an unquoted argument")]
    QuoteInWord,
    /// Text follows a closing quote without whitespace
    #[error("unexpected text after closing quote")]
    TextAfterQuote,
    /// A quoted argument is empty
    #[error("empty argument")]
    EmptyArgument,
    /// Not exactly a source and a destination
    #[error("expected 2 arguments, found {0}")]
    ArgumentCount(usize),
}

/// Split the text after the `add` keyword into (source, destination)
///
/// Each argument is either a bare word with no `"` in it, or a
/// `"`-delimited string that may contain spaces. Quotes are removed.
pub fn parse_add_command(arguments: &str) -> Result<(String, String), ParseError> {
    let mut args = Vec::new();
    let mut chars = arguments.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };

        let mut arg = String::new();
        if first == '"' {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(c) => arg.push(c),
                    None => return Err(ParseError::UnbalancedQuotes),
                }
            }
            if chars.peek().is_some_and(|c| !c.is_whitespace()) {
                return Err(ParseError::TextAfterQuote);
            }
            if arg.is_empty() {
                return Err(ParseError::EmptyArgument);
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                if c == '"' {
                    return Err(ParseError::QuoteInWord);
                }
                arg.push(c);
            }
        }
        args.push(arg);
    }

    match <[String; 2]>::try_from(args) {
        Ok([source, destination]) => Ok((source, destination)),
        Err(args) => Err(ParseError::ArgumentCount(args.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/src /dst", "/src", "/dst")]
    #[case("  /src\t/dst  ", "/src", "/dst")]
    #[case(r#""/my src" /dst"#, "/my src", "/dst")]
    #[case(r#"/src "/my dst""#, "/src", "/my dst")]
    #[case(r#""C:\My Files" "D:\Backup Dir""#, r"C:\My Files", r"D:\Backup Dir")]
    fn test_accepts(#[case] input: &str, #[case] source: &str, #[case] destination: &str) {
        assert_eq!(
            parse_add_command(input),
            Ok((source.to_string(), destination.to_string()))
        );
    }

    #[rstest]
    #[case(r#""/src /dst"#, ParseError::UnbalancedQuotes)]
    #[case(r#"/src /dst""#, ParseError::QuoteInWord)]
    #[case(r#"/s"rc /dst"#, ParseError::QuoteInWord)]
    #[case(r#""/src"x /dst"#, ParseError::TextAfterQuote)]
    #[case(r#""/src""/dst""#, ParseError::TextAfterQuote)]
    #[case(r#""" /dst"#, ParseError::EmptyArgument)]
    #[case("", ParseError::ArgumentCount(0))]
    #[case("/src", ParseError::ArgumentCount(1))]
    #[case("/a /b /c", ParseError::ArgumentCount(3))]
    fn test_rejects(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(parse_add_command(input), Err(expected));
    }
}
