// Helpers shared by every provider adapter
//
// Tool-result flattening, lenient content-block parsing and timestamp
// normalization live here so adapters stay focused on their own schema.

pub mod content;
pub mod timing;
pub mod tool_result;

pub use content::{parse_content_block, parse_message_content};
pub use timing::{duration_ms, normalize_timestamp};
pub use tool_result::{flatten_tool_result, or_placeholder};
