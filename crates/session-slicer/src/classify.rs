//! G-code line classification.
//!
//! Every predicate is case-insensitive and looks at a single raw line. A
//! linear move is any line whose command token is `G0` or `G1` (leading zeros
//! such as `G01` are accepted); its parameters are everything after the
//! command token up to an inline `;` comment. Parameter markers may appear in
//! any order.

use crate::error::{Result, SessionError};

/// Command token that marks the end of nozzle pre-heating.
pub const HEAT_WAIT_COMMAND: &str = "M109";

/// Split a linear move into its parameter text.
///
/// Returns `None` if the line is not a `G0`/`G1` command.
fn linear_move_params(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let rest = line.strip_prefix(['G', 'g'])?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    match rest[..digits].parse::<u32>() {
        Ok(0) | Ok(1) => {}
        _ => return None,
    }
    let params = &rest[digits..];
    Some(match params.find(';') {
        Some(comment) => &params[..comment],
        None => params,
    })
}

fn has_marker(params: &str, axis: char) -> bool {
    params.chars().any(|c| c.eq_ignore_ascii_case(&axis))
}

/// Linear move with X, Y and Z parameters.
pub fn moves_with_xyz(line: &str) -> bool {
    linear_move_params(line)
        .is_some_and(|p| has_marker(p, 'X') && has_marker(p, 'Y') && has_marker(p, 'Z'))
}

/// Linear move with X and Y parameters (Z may or may not be present).
pub fn moves_with_xy(line: &str) -> bool {
    linear_move_params(line).is_some_and(|p| has_marker(p, 'X') && has_marker(p, 'Y'))
}

/// Linear move with a Z parameter.
pub fn moves_with_z(line: &str) -> bool {
    linear_move_params(line).is_some_and(|p| has_marker(p, 'Z'))
}

/// Linear move that sets a feed rate.
pub fn has_feed_rate(line: &str) -> bool {
    linear_move_params(line).is_some_and(|p| has_marker(p, 'F'))
}

/// Full-line comment, ignoring leading whitespace.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(';')
}

/// `M109` (set hotend temperature and wait).
pub fn is_heat_wait(line: &str) -> bool {
    let line = line.trim_start();
    let Some(head) = line.get(..HEAT_WAIT_COMMAND.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(HEAT_WAIT_COMMAND)
        && !line[HEAT_WAIT_COMMAND.len()..]
            .bytes()
            .next()
            .is_some_and(|b| b.is_ascii_digit())
}

/// Raw Z token of a move: the text after the `Z` marker up to the next
/// whitespace.
pub fn height_token(line: &str) -> Option<&str> {
    let params = linear_move_params(line)?;
    let start = params.find(['Z', 'z'])? + 1;
    let token = &params[start..];
    let end = token.find(char::is_whitespace).unwrap_or(token.len());
    Some(&token[..end])
}

/// Parse the Z height of the move on line `index`.
pub fn parse_height(line: &str, index: usize) -> Result<f64> {
    let token = height_token(line).unwrap_or_default();
    token
        .parse::<f64>()
        .map_err(|_| SessionError::InvalidHeight {
            line: index,
            token: token.to_string(),
        })
}
