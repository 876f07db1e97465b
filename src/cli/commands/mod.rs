pub mod token;
pub mod whoami;
