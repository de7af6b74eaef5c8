pub mod colors;
pub mod text;
pub mod tokens;
