/// Catalog inspection command.
pub mod check;
/// Unmarshal-then-marshal comparison command.
pub mod roundtrip;
/// Unmarshal and print command.
pub mod unmarshal;

pub(crate) mod util;
