mod compare;
mod init;

pub use self::compare::{CompareArgs, compare};
pub use self::init::init;
