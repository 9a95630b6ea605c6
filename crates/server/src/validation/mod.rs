pub mod input;
pub mod slug;
