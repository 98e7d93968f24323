//! Parser for listing tokens → instructions.
//!
//! Names, arities and symbolic arguments all come from the instruction set
//! the listing is assembled against.

use evocpu_common::{Arg, InstSet, Instruction, INST_ARGS};

use crate::error::AsmError;
use crate::lexer::Token;

/// Parse the tokens of one line into an instruction.
///
/// Returns `Ok(None)` for blank lines (empty token list). Unused argument
/// slots are zero.
pub(crate) fn parse_line<S: InstSet + ?Sized>(
    tokens: &[Token],
    line_num: usize,
    set: &S,
) -> Result<Option<Instruction>, AsmError> {
    let Some(first) = tokens.first() else {
        return Ok(None);
    };

    let name = match first {
        Token::Ident(s) => s.as_str(),
        Token::Number(n) => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: n.to_string(),
            })
        }
    };

    let id = set.id_of(name).ok_or_else(|| AsmError::UnknownInstruction {
        line: line_num,
        token: name.to_string(),
    })?;
    let expected = set.num_args(id).unwrap_or(0).min(INST_ARGS);
    let args = &tokens[1..];

    let mut inst = Instruction {
        id,
        ..Instruction::default()
    };
    for (slot, value) in inst.args.iter_mut().enumerate().take(expected) {
        let token = args.get(slot).ok_or_else(|| AsmError::MissingArgument {
            line: line_num,
            name: name.to_string(),
            expected,
        })?;
        *value = parse_arg(token, line_num, set)?;
    }
    expect_end(&args[expected.min(args.len())..], line_num)?;

    Ok(Some(inst))
}

fn parse_arg<S: InstSet + ?Sized>(token: &Token, line_num: usize, set: &S) -> Result<Arg, AsmError> {
    match token {
        Token::Number(n) => Arg::try_from(*n).map_err(|_| AsmError::InvalidNumber {
            line: line_num,
            token: n.to_string(),
        }),
        Token::Ident(s) => set.arg_value(s).ok_or_else(|| AsmError::UnexpectedToken {
            line: line_num,
            token: s.clone(),
        }),
    }
}

fn expect_end(rest: &[Token], line_num: usize) -> Result<(), AsmError> {
    match rest.first() {
        None => Ok(()),
        Some(Token::Ident(s)) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: s.clone(),
        }),
        Some(Token::Number(n)) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: n.to_string(),
        }),
    }
}
