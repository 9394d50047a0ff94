pub mod data_url;
pub mod valid_user_id;
