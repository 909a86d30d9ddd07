pub mod batch;
pub mod compare;
pub mod init;
pub mod normalize;
pub mod score;
pub mod transcribe;
pub mod validate;
pub mod xp;
