#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: &'static str },

    #[error("circles were already normalized; supply fresh unscaled targets and radii")]
    AlreadyNormalized,

    #[error("no valid tangent placement for circle {index}")]
    NoValidPlacement { index: usize },

    #[error("circle {index} has a non-finite target or radius")]
    NonFiniteInput { index: usize },

    #[error("invalid option `{name}`: {value}")]
    InvalidOption { name: &'static str, value: f64 },

    #[error("candidate budget of {limit} tangent placements exhausted")]
    BudgetExhausted { limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
