//! Small client utilities shared by the session store and page models.

pub mod storage;
pub mod uuid;
