pub mod media;

pub use media::MediaService;
