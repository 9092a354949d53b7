//! Geometric path engine: a tokenizer for the SVG path mini-language, a
//! 4x4 matrix algebra module with an analytic planar-homography solver,
//! and an interpreter that re-expresses path data under an arbitrary
//! projective transform.

pub mod matrix;
pub mod path;
pub mod tokenize;

pub use matrix::{Matrix, TransformStack};
pub use path::transform_path;
pub use tokenize::{tokenize, Token};

use thiserror::Error;

/// Failure of any core operation. Errors are never downgraded to default
/// or sentinel values; a failing call produces no partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The path data does not match the token grammar; holds the offset
    /// of the first byte not covered by a token or separator.
    #[error("path data has unrecognized input at byte {0}")]
    MalformedPath(usize),

    /// A numeric parameter appeared before any command letter.
    #[error("numeric parameter appears before any command")]
    StrayParameter,

    /// A command letter outside the fixed opcode table.
    #[error("unknown path command '{0}'")]
    UnknownOpcode(char),

    /// A command group whose parameter count is not a non-empty multiple
    /// of the opcode's unit length.
    #[error("command '{op}' takes parameters in units of {unit}, found {found}")]
    ParameterCount { op: char, unit: usize, found: usize },

    /// A transformed point has zero homogeneous weight (it maps to
    /// infinity), so the mapping is undefined.
    #[error("point ({x}, {y}) has zero homogeneous weight under this transform")]
    UndefinedMapping { x: f64, y: f64 },

    /// A linear solve (inverse point-mapping or homography) hit a zero
    /// determinant.
    #[error("linear system is singular")]
    SingularSystem,

    /// Projection constructor parameters describe a degenerate frustum.
    #[error("degenerate projection: {0}")]
    DegenerateProjection(&'static str),
}
