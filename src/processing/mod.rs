pub mod chunker;
pub mod decoder;
pub mod pcm;
pub mod wav;
