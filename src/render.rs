pub(crate) mod backend;
pub(crate) mod dispatch;
pub(crate) mod loading_bar;
