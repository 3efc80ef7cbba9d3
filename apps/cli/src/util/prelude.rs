pub use crate::{execute, print_output};
