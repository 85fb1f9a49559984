//! Per-verb execution, one module per primitive.

pub(crate) mod assert;
pub(crate) mod click;
pub(crate) mod expect_url;
pub(crate) mod navigate;
pub(crate) mod select;
pub(crate) mod submit;
pub(crate) mod type_text;
pub(crate) mod upload;
