mod gray;

pub use gray::{bgr_from_gray, gray3_from_bgr_u8, gray_from_bgr_u8};
