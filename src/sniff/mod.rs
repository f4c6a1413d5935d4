pub mod delimiter;
pub mod header;
pub mod lines;

pub use delimiter::detect_delimiter;
pub use header::{looks_like_header, HeaderGate};
pub use lines::split_lines;
