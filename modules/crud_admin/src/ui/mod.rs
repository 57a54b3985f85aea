pub mod components;
pub mod composer;
pub mod shell;

pub use components::PageDescription;
pub use composer::{PageComposer, View, ViewKind};
pub use shell::prebuilt_html;
