//! CLI command implementations.

pub(crate) mod blocks;
pub(crate) mod convert;

pub(crate) use blocks::BlocksArgs;
pub(crate) use convert::ConvertArgs;
