//! User domain activities

mod review_queue;
mod update_status;

pub use review_queue::get_user_review_prs;
pub use update_status::set_user_active_status;
