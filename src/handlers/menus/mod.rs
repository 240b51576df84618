mod delete;
mod reorder;
mod save;
mod sidebar;
mod tree;

pub use delete::menu_delete;
pub use reorder::reorder_patch;
pub use save::{menu_post, menu_put, MenuPayload};
pub use sidebar::sidebar_get;
pub use tree::tree_get;
