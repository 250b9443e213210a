mod disposition;
mod engine;
mod expense;
mod fields;
mod normalize;
mod trajectory;
mod tvm;
mod types;
mod validate;

pub use engine::compute;
pub use fields::{FieldIssue, check_fields};
pub use normalize::{parse_age, parse_amount, parse_rate, resolve};
pub use types::{
    Breakdown, CalculatorInputs, CalculatorOutputs, EnteredAges, RealEstateMode, ResolvedInputs,
    ValuationBasis, YearlySnapshot,
};
pub use validate::{InputError, validate};
