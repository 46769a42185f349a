pub mod assets;
pub mod folders;
pub mod media;
