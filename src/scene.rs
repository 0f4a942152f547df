pub(crate) mod context;
pub(crate) mod definition;
pub(crate) mod layers;
pub(crate) mod model;
