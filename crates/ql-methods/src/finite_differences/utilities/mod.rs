//! Helpers shared by the operators, meshers and step conditions
//! (translates `ql/methods/finitedifferences/utilities/`).

pub mod escrowed;
pub mod inner_value;
pub mod quanto;

pub use escrowed::EscrowedDividendAdjustment;
pub use inner_value::{
    FdmCellAveragingInnerValue, FdmEscrowedLogInnerValue, FdmInnerValueCalculator,
    FdmLogInnerValue, FdmZeroInnerValue,
};
pub use quanto::FdmQuantoHelper;
