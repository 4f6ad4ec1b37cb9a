mod user_detail;
mod user_edit;
mod user_list;

pub use user_detail::UserDetailView;
pub use user_edit::UserEditView;
pub use user_list::UserListView;
