pub mod menu_service;
pub mod menu_tree;
pub mod role_service;
