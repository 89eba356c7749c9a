pub mod errors;
pub mod aligner;
pub mod text;
pub mod io;
