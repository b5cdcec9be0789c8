pub mod key;
pub mod manifest;
pub mod upload;
