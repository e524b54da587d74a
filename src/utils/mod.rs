pub mod text;
pub mod transcript;
