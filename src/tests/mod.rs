pub mod common;
pub mod relay_end_to_end;
