//! Interprets tokenized path data and re-expresses it under a transform.
//!
//! Commands flow through a typed [`CommandGroup`] pipeline — grouping,
//! h/v desugaring, cursor resolution, matrix mapping — and only the final
//! emission step flattens groups into the output string. Output is always
//! absolutized: one uppercase letter per command group, with the letter
//! and every number space-joined as separate tokens.

use crate::matrix::Matrix;
use crate::tokenize::{tokenize, Token};
use crate::Error;

/// One opcode plus the flat parameters of all its repetition units.
#[derive(Debug, Clone, PartialEq)]
struct CommandGroup {
    /// Opcode letter, lowercased.
    op: char,
    /// Whether the source letter was uppercase (absolute coordinates).
    absolute: bool,
    params: Vec<f64>,
}

impl CommandGroup {
    /// The letter as it appeared in the source, for error reporting.
    fn source_letter(&self) -> char {
        if self.absolute {
            self.op.to_ascii_uppercase()
        } else {
            self.op
        }
    }
}

/// Leading non-coordinate parameters (`skip`) and total parameters
/// (`unit`) for one repetition unit of each opcode. Arc units carry five
/// scalars (radii, rotation, flags) ahead of their single endpoint pair.
fn param_layout(op: char) -> Option<(usize, usize)> {
    match op {
        'm' | 'l' | 'q' | 't' => Some((0, 2)),
        'z' => Some((0, 0)),
        'c' => Some((0, 6)),
        's' => Some((0, 4)),
        'a' => Some((5, 7)),
        _ => None,
    }
}

fn group_commands(tokens: Vec<Token>) -> Result<Vec<CommandGroup>, Error> {
    let mut groups: Vec<CommandGroup> = Vec::new();
    for token in tokens {
        match token {
            Token::Command(letter) => groups.push(CommandGroup {
                op: letter.to_ascii_lowercase(),
                absolute: letter.is_ascii_uppercase(),
                params: Vec::new(),
            }),
            Token::Number(value) => match groups.last_mut() {
                Some(group) => group.params.push(value),
                None => return Err(Error::StrayParameter),
            },
        }
    }
    Ok(groups)
}

/// Rewrites the scalar-only `h` and `v` opcodes as `l` with synthetic
/// coordinate pairs, so the layout table only ever sees pair-bearing
/// opcodes.
fn desugar(group: CommandGroup) -> CommandGroup {
    let pair: fn(f64) -> [f64; 2] = match group.op {
        'h' => |d| [d, 0.0],
        'v' => |d| [0.0, d],
        _ => return group,
    };
    CommandGroup {
        op: 'l',
        absolute: group.absolute,
        params: group.params.iter().flat_map(|&d| pair(d)).collect(),
    }
}

/// Resolves one group in place: relative coordinates become absolute and
/// every coordinate pair is mapped through `matrix`. Returns the cursor
/// after the group.
///
/// Each unit is resolved against the cursor left by the unit before it,
/// and every pair in a unit - intermediate control points included - is
/// offset by that same pre-unit cursor. The unit's trailing pair (after
/// offsetting, before the matrix) becomes the next cursor.
fn resolve_group(
    group: &mut CommandGroup,
    matrix: &Matrix,
    cursor: (f64, f64),
) -> Result<(f64, f64), Error> {
    let (skip, unit) = match param_layout(group.op) {
        Some(layout) => layout,
        None => return Err(Error::UnknownOpcode(group.source_letter())),
    };
    if unit == 0 {
        // Close-path takes no parameters and leaves the cursor where the
        // last drawing unit put it.
        if !group.params.is_empty() {
            return Err(Error::ParameterCount {
                op: group.source_letter(),
                unit,
                found: group.params.len(),
            });
        }
        group.absolute = true;
        return Ok(cursor);
    }
    if group.params.is_empty() || group.params.len() % unit != 0 {
        return Err(Error::ParameterCount {
            op: group.source_letter(),
            unit,
            found: group.params.len(),
        });
    }

    let mut cursor = cursor;
    for unit_params in group.params.chunks_mut(unit) {
        if !group.absolute {
            for k in (skip..unit).step_by(2) {
                unit_params[k] += cursor.0;
                unit_params[k + 1] += cursor.1;
            }
        }
        cursor = (unit_params[unit - 2], unit_params[unit - 1]);
        for k in (skip..unit).step_by(2) {
            let image = matrix.transform([unit_params[k], unit_params[k + 1], 0.0])?;
            unit_params[k] = image[0];
            unit_params[k + 1] = image[1];
        }
    }
    group.absolute = true;
    Ok(cursor)
}

fn emit(groups: &[CommandGroup]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for group in groups {
        parts.push(group.op.to_ascii_uppercase().to_string());
        parts.extend(group.params.iter().map(|&v| {
            // Canonicalize -0 so sign flips never leak into the output.
            let v = if v == 0.0 { 0.0 } else { v };
            v.to_string()
        }));
    }
    parts.join(" ")
}

/// Re-expresses path data under `matrix`.
///
/// Tokenizes `d`, resolves relative coordinates against the running
/// cursor (initially the origin), maps every coordinate pair through the
/// transform with z = 0, and emits the absolutized, space-joined result.
/// Any failure — malformed input, an opcode outside the fixed table, a
/// bad parameter count, or a point with zero homogeneous weight — aborts
/// the whole operation with no partial output.
pub fn transform_path(d: &str, matrix: &Matrix) -> Result<String, Error> {
    let tokens = tokenize(d)?;
    let groups = group_commands(tokens)?;
    let mut resolved = Vec::with_capacity(groups.len());
    let mut cursor = (0.0, 0.0);
    for group in groups {
        let mut group = desugar(group);
        cursor = resolve_group(&mut group, matrix, cursor)?;
        resolved.push(group);
    }
    Ok(emit(&resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::TransformStack;
    use pretty_assertions::assert_eq;

    fn identity() -> Matrix {
        Matrix::identity()
    }

    #[test]
    fn absolutizes_and_uppercases() {
        assert_eq!(
            transform_path("m0,0l10,0l0,10z", &identity()).unwrap(),
            "M 0 0 L 10 0 L 10 10 Z"
        );
    }

    #[test]
    fn horizontal_and_vertical_desugar_to_lines() {
        let expanded = transform_path("l10,0l0,-5", &identity()).unwrap();
        assert_eq!(transform_path("h10v-5", &identity()).unwrap(), expanded);
        assert_eq!(expanded, "L 10 0 L 10 -5");
    }

    #[test]
    fn repeated_units_share_one_letter_and_chain_the_cursor() {
        assert_eq!(
            transform_path("l10,0 20,0 30,0", &identity()).unwrap(),
            "L 10 0 30 0 60 0"
        );
    }

    #[test]
    fn repeated_units_then_relative_continuation() {
        // The cursor after the repeated group sits at the last resolved
        // destination.
        assert_eq!(
            transform_path("l10,0 20,0v5", &identity()).unwrap(),
            "L 10 0 30 0 L 30 5"
        );
    }

    #[test]
    fn relative_curves_offset_every_control_point() {
        assert_eq!(
            transform_path("m10,10c1,2 3,4 5,6", &identity()).unwrap(),
            "M 10 10 C 11 12 13 14 15 16"
        );
    }

    #[test]
    fn arcs_offset_only_their_endpoint_pair() {
        assert_eq!(
            transform_path("m10,10a5,5 0 0 1 5,5", &identity()).unwrap(),
            "M 10 10 A 5 5 0 0 1 15 15"
        );
    }

    #[test]
    fn relative_offsets_happen_before_the_transform() {
        let shift = Matrix::translation(5.0, 5.0, 0.0);
        assert_eq!(transform_path("l10,0", &shift).unwrap(), "L 15 5");
        // Cursor tracking stays in source space: the next relative unit
        // resolves against (10, 0), not its image.
        assert_eq!(
            transform_path("l10,0l0,1", &shift).unwrap(),
            "L 15 5 L 15 6"
        );
    }

    #[test]
    fn glyph_style_transform_flips_y() {
        let matrix = TransformStack::new()
            .translate(0.0, 100.0, 0.0)
            .scale(0.1, -0.1, 1.0)
            .build();
        assert_eq!(
            transform_path("M0,0L100,200", &matrix).unwrap(),
            "M 0 100 L 10 80"
        );
    }

    #[test]
    fn emission_space_joins_opcodes_and_parameters() {
        // The opcode is its own token, never fused to its first number,
        // and repeated units flatten under a single letter.
        assert_eq!(
            transform_path("M2,3l1,0 2,0q1,1 2,2z", &identity()).unwrap(),
            "M 2 3 L 3 3 5 3 Q 6 4 7 5 Z"
        );
    }

    #[test]
    fn unknown_opcode_fails() {
        assert_eq!(
            transform_path("M10,10X", &identity()),
            Err(Error::UnknownOpcode('X'))
        );
    }

    #[test]
    fn malformed_input_fails_with_the_byte_offset() {
        assert_eq!(
            transform_path("M10,10%", &identity()),
            Err(Error::MalformedPath(6))
        );
    }

    #[test]
    fn leading_parameter_fails() {
        assert_eq!(
            transform_path("10 20", &identity()),
            Err(Error::StrayParameter)
        );
    }

    #[test]
    fn ragged_parameter_count_fails() {
        assert_eq!(
            transform_path("l10,0 5", &identity()),
            Err(Error::ParameterCount {
                op: 'l',
                unit: 2,
                found: 3
            })
        );
        assert_eq!(
            transform_path("M", &identity()),
            Err(Error::ParameterCount {
                op: 'M',
                unit: 2,
                found: 0
            })
        );
        assert_eq!(
            transform_path("z5", &identity()),
            Err(Error::ParameterCount {
                op: 'z',
                unit: 0,
                found: 1
            })
        );
    }

    #[test]
    fn close_path_keeps_the_cursor() {
        assert_eq!(
            transform_path("m5,5l10,0zl0,1", &identity()).unwrap(),
            "M 5 5 L 15 5 Z L 15 6"
        );
    }

    #[test]
    fn zero_weight_point_aborts_the_whole_path() {
        // Pure perspective sends the whole z = 0 plane to infinity.
        let m = Matrix::perspective(90.0, 1.0, 1.0, 10.0).unwrap();
        assert_eq!(
            transform_path("M1,2", &m),
            Err(Error::UndefinedMapping { x: 1.0, y: 2.0 })
        );
    }
}
