pub mod apsystems;
pub mod http;
