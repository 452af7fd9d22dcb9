use crate::{
    error::{Error, Result},
    syntax::{
        command::{Command, CommandError},
        program::{Function, Program},
    },
};

/// Everything after this character on a line is a comment.
pub const COMMENT_DELIMITER: char = ';';

/// A non-empty source line split into its command name and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the source text.
    pub number: usize,
    pub name: &'a str,
    pub params: Vec<&'a str>,
}

/// Splits program text into tokenized lines, dropping comments and blanks.
pub fn tokenize(source: &str) -> Vec<Line<'_>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let code = match raw.find(COMMENT_DELIMITER) {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let mut tokens = code.split_whitespace();
            let name = tokens.next()?;
            Some(Line {
                number: idx + 1,
                name,
                params: tokens.collect(),
            })
        })
        .collect()
}

/// Builds a [`Program`] from source text.
///
/// Blocks open with `start <name>` and close with `finish`; everything
/// between them is decoded into the open function.
pub struct Parser<'a> {
    lines: Vec<Line<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: tokenize(source),
        }
    }

    pub fn parse_program(self) -> Result<Program> {
        let mut program = Program::new();
        let mut current: Option<(usize, Function)> = None;

        for line in self.lines {
            match line.name {
                "start" => {
                    if let Some((opened_at, open)) = &current {
                        return Err(malformed(
                            line.number,
                            format!(
                                "`start` inside function `{}` opened at line {}",
                                open.name, opened_at
                            ),
                        ));
                    }
                    let name = match line.params.as_slice() {
                        [name] => *name,
                        _ => {
                            return Err(malformed(
                                line.number,
                                "`start` expects exactly one function name",
                            ));
                        }
                    };
                    current = Some((line.number, Function::new(name)));
                }
                "finish" => {
                    if !line.params.is_empty() {
                        return Err(malformed(line.number, "`finish` takes no parameters"));
                    }
                    let Some((_, function)) = current.take() else {
                        return Err(malformed(line.number, "`finish` without a matching `start`"));
                    };
                    if let Err(duplicate) = program.insert(function) {
                        return Err(malformed(
                            line.number,
                            format!("function `{}` is defined twice", duplicate.name),
                        ));
                    }
                }
                name => {
                    let command = Command::parse(name, &line.params).map_err(|err| match err {
                        CommandError::Unknown => Error::UnknownCommand {
                            line: line.number,
                            name: name.to_string(),
                        },
                        other => malformed(line.number, format!("`{}`: {}", name, other)),
                    })?;
                    let Some((_, function)) = current.as_mut() else {
                        return Err(malformed(
                            line.number,
                            format!("`{}` outside of any function", command),
                        ));
                    };
                    function.commands.push(command);
                }
            }
        }

        if let Some((opened_at, function)) = current {
            return Err(malformed(
                opened_at,
                format!("function `{}` is never finished", function.name),
            ));
        }

        Ok(program)
    }
}

fn malformed(line: usize, reason: impl Into<String>) -> Error {
    Error::MalformedProgram {
        line,
        reason: reason.into(),
    }
}

/// Parses program text in one call.
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source).parse_program()
}
