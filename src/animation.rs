pub(crate) mod cascade;
pub(crate) mod ease;
pub(crate) mod sync;
pub(crate) mod track;
pub(crate) mod value;
