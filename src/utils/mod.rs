pub mod encoding;

pub use encoding::{config_lines, decode_gzip_base64};
