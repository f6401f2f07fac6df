pub mod protocol;
pub mod receipts;

pub(crate) mod handle;
pub(crate) mod worklet;
