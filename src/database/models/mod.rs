pub mod menu;
pub mod role;

pub use menu::{Menu, MenuTreeNode, ReorderEntry, SaveMenuData};
pub use role::Role;
