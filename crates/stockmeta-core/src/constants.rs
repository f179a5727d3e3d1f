//! Application-wide constants.

/// Keyword ceilings per marketplace
pub const ADOBE_MAX_KEYWORDS: usize = 49;
pub const SHUTTERSTOCK_MAX_KEYWORDS: usize = 50;
pub const ISTOCK_MAX_KEYWORDS: usize = 50;

/// Folder list thumbnail size
pub const THUMB_WIDTH: u32 = 244;
pub const THUMB_HEIGHT: u32 = 152;

/// Selected-asset preview size
pub const PREVIEW_WIDTH: u32 = 262;
pub const PREVIEW_HEIGHT: u32 = 164;

/// Canvas fill behind letterboxed thumbnails (#0e1117)
pub const CANVAS_BACKGROUND: [u8; 3] = [0x0e, 0x11, 0x17];

/// Longest side of the frame sent to the vision model
pub const MODEL_INPUT_MAX_DIM: u32 = 768;
pub const MODEL_INPUT_JPEG_QUALITY: u8 = 82;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "m4v", "wmv"];

/// Per-folder record table file name
pub const RECORD_TABLE_FILE: &str = "_metadata.csv";

/// Network timeouts
pub const VISION_TIMEOUT_SECS: u64 = 60;
pub const TEXT_TIMEOUT_SECS: u64 = 30;
pub const TAGGING_TIMEOUT_SECS: u64 = 30;

/// Token budgets per request kind
pub const METADATA_MAX_TOKENS: u32 = 600;
pub const KEYWORDS_MAX_TOKENS: u32 = 450;
pub const TRANSLATION_MAX_TOKENS: u32 = 350;

/// Words per translation request
pub const TRANSLATION_BATCH_LIMIT: usize = 50;

/// Tagging service query parameters
pub const TAGGING_NUM_KEYWORDS: u32 = 50;
pub const TAGGING_THRESHOLD: f32 = 0.2;

/// Delay between consecutive thumbnails of a folder listing
pub const THUMBNAIL_THROTTLE_MS: u64 = 30;

/// Delay before the best-effort save that follows a successful run
pub const AUTOSAVE_DELAY_MS: u64 = 600;

/// Record timestamp format (minute precision)
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";
