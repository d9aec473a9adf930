//! Cell-related types: addresses, ranges, values and sparse storage

mod address;
mod storage;
mod value;

pub use address::{column_index, column_letters, row_index, CellAddress, CellRange};
pub use storage::{CellData, CellStorage};
pub use value::CellValue;
