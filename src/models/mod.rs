pub mod product;
pub mod view;

pub use product::*;
pub use view::*;

// Display constants used by the terminal table
pub const EMOJI_IN_STOCK: &str = "✅";
pub const EMOJI_OUT_OF_STOCK: &str = "❌";
pub const EMOJI_LINK: &str = "🔗";
pub const EMOJI_REMOVE: &str = "🗑️";
pub const EMOJI_ASCENDING: &str = "⬆️";
pub const EMOJI_DESCENDING: &str = "⬇️";
pub const YEN: &str = "¥";
