pub mod markdown;
pub mod text;

// Re-export commonly used utilities
pub use markdown::{code_fence, inline_code, longest_backtick_run};
pub use text::expand_tabs;
