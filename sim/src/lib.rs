pub mod bake;
pub mod init;
pub mod scenario;
